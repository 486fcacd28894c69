pub mod terminal;

/// A line of input from the chat front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Text to send to the assistant
    Chat(String),
    Help,
    /// Start a fresh conversation
    New,
    Quit,
    /// Slash command we don't know
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Input::Chat(line.to_string());
        }

        let command = trimmed.split_whitespace().next().unwrap_or(trimmed);
        match command.to_lowercase().as_str() {
            "/help" | "/start" => Input::Help,
            "/new" | "/clear" => Input::New,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Unknown(command.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            Input::parse("I have a headache"),
            Input::Chat("I have a headache".to_string())
        );
    }

    #[test]
    fn test_chat_text_is_not_trimmed() {
        assert_eq!(Input::parse("  hi "), Input::Chat("  hi ".to_string()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Input::parse("/help"), Input::Help);
        assert_eq!(Input::parse("/NEW"), Input::New);
        assert_eq!(Input::parse("/clear"), Input::New);
        assert_eq!(Input::parse(" /quit "), Input::Quit);
        assert_eq!(Input::parse("/exit now"), Input::Quit);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(Input::parse("/dance"), Input::Unknown("/dance".to_string()));
    }
}
