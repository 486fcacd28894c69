use anyhow::{bail, Result};
use serde::Deserialize;

/// One keyword → reply rule
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ResponseRule {
    pub keyword: String,
    pub reply: String,
}

impl ResponseRule {
    fn new(keyword: &str, reply: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            reply: reply.to_string(),
        }
    }
}

const COVID_REPLY: &str = "COVID-19 is a respiratory disease caused by the SARS-CoV-2 virus. \
Key symptoms include fever, cough, and difficulty breathing. Prevention measures include \
vaccination, wearing masks, and maintaining social distance. Would you like more specific information?";

const DIABETES_REPLY: &str = "Diabetes is a chronic condition that affects how your body processes \
blood sugar. Type 1 diabetes is usually diagnosed in children, while Type 2 is more common in adults. \
Management includes diet control, regular exercise, and medication. What aspect would you like to know more about?";

const HEADACHE_REPLY: &str = "Headaches can have various causes including tension, dehydration, or \
underlying conditions. For persistent or severe headaches, it's important to consult a healthcare \
provider. Common remedies include rest, hydration, and over-the-counter pain relievers. Is this a recurring issue?";

const FEVER_REPLY: &str = "Fever is your body's natural response to infection. If temperature exceeds \
103°F (39.4°C) or persists for more than 3 days, seek medical attention. Stay hydrated and rest. \
Are you experiencing any other symptoms?";

pub const DEFAULT_REPLY: &str = "I understand you're looking for health information. While I can \
provide general guidance, please remember that for specific medical concerns, it's important to \
consult with a healthcare professional. Could you tell me more about what you'd like to know?";

/// Ordered keyword table used to pick a canned reply.
///
/// Keywords are stored lower-cased and matched as substrings of the
/// lower-cased input. The first rule in table order wins.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    rules: Vec<ResponseRule>,
    default_reply: String,
}

#[allow(dead_code)]
impl ResponseTable {
    /// Build a table from custom rules. Keywords and replies must be non-empty.
    pub fn new(rules: Vec<ResponseRule>, default_reply: impl Into<String>) -> Result<Self> {
        let default_reply = default_reply.into();
        if default_reply.trim().is_empty() {
            bail!("Default reply must not be empty");
        }

        let mut normalized = Vec::with_capacity(rules.len());
        for (index, rule) in rules.into_iter().enumerate() {
            let keyword = rule.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                bail!("Response rule #{} has an empty keyword", index + 1);
            }
            if rule.reply.trim().is_empty() {
                bail!("Response rule '{}' has an empty reply", keyword);
            }
            normalized.push(ResponseRule {
                keyword,
                reply: rule.reply,
            });
        }

        Ok(Self {
            rules: normalized,
            default_reply,
        })
    }

    /// The assistant's stock health replies
    pub fn builtin() -> Self {
        Self {
            rules: vec![
                ResponseRule::new("covid", COVID_REPLY),
                ResponseRule::new("diabetes", DIABETES_REPLY),
                ResponseRule::new("headache", HEADACHE_REPLY),
                ResponseRule::new("fever", FEVER_REPLY),
            ],
            default_reply: DEFAULT_REPLY.to_string(),
        }
    }

    /// Pick the reply for `input`. Never fails: unmatched (or empty) input
    /// gets the default reply.
    pub fn match_reply(&self, input: &str) -> &str {
        let lowered = input.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lowered.contains(rule.keyword.as_str()))
            .map(|rule| rule.reply.as_str())
            .unwrap_or(&self.default_reply)
    }

    pub fn default_reply(&self) -> &str {
        &self.default_reply
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fever_keyword() {
        let table = ResponseTable::builtin();
        assert_eq!(table.match_reply("I have a fever"), FEVER_REPLY);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let table = ResponseTable::builtin();
        assert_eq!(table.match_reply("What about COVID?"), COVID_REPLY);
        assert_eq!(table.match_reply("DiAbEtEs"), DIABETES_REPLY);
    }

    #[test]
    fn test_keyword_matches_as_substring() {
        let table = ResponseTable::builtin();
        assert_eq!(table.match_reply("terrible headaches lately"), HEADACHE_REPLY);
    }

    #[test]
    fn test_no_keyword_returns_default() {
        let table = ResponseTable::builtin();
        assert_eq!(
            table.match_reply("random text with no keywords"),
            DEFAULT_REPLY
        );
    }

    #[test]
    fn test_empty_input_returns_default() {
        let table = ResponseTable::builtin();
        assert_eq!(table.match_reply(""), DEFAULT_REPLY);
        assert_eq!(table.match_reply("   "), DEFAULT_REPLY);
    }

    #[test]
    fn test_first_rule_in_table_order_wins() {
        let table = ResponseTable::builtin();
        // "covid" precedes "fever" regardless of position in the input
        assert_eq!(table.match_reply("fever after covid"), COVID_REPLY);
        assert_eq!(table.match_reply("headache and fever"), HEADACHE_REPLY);
    }

    #[test]
    fn test_custom_table_lowercases_keywords() {
        let table = ResponseTable::new(
            vec![ResponseRule::new("  Flu ", "Flu reply")],
            "fallback",
        )
        .unwrap();

        assert_eq!(table.rules()[0].keyword, "flu");
        assert_eq!(table.match_reply("is this the FLU?"), "Flu reply");
        assert_eq!(table.match_reply("nothing"), "fallback");
    }

    #[test]
    fn test_custom_table_rejects_empty_keyword() {
        let err = ResponseTable::new(vec![ResponseRule::new(" ", "reply")], "fallback")
            .unwrap_err();
        assert!(err.to_string().contains("empty keyword"));
    }

    #[test]
    fn test_custom_table_rejects_empty_reply() {
        assert!(ResponseTable::new(vec![ResponseRule::new("flu", "")], "fallback").is_err());
    }

    #[test]
    fn test_custom_table_rejects_empty_default() {
        assert!(ResponseTable::new(Vec::new(), "  ").is_err());
    }

    #[test]
    fn test_table_without_rules_always_defaults() {
        let table = ResponseTable::new(Vec::new(), "only this").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.match_reply("fever"), "only this");
    }

    #[test]
    fn test_builtin_table_shape() {
        let table = ResponseTable::builtin();
        let keywords: Vec<&str> = table.rules().iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["covid", "diabetes", "headache", "fever"]);
        assert_eq!(table.default_reply(), DEFAULT_REPLY);
    }
}
