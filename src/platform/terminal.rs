use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::agent::{ChatSession, SessionOptions, Submission};
use crate::memory::{Message, MessageId, Sender};
use crate::platform::Input;
use crate::responses::ResponseTable;
use crate::scheduler::DelayScheduler;

const DISCLAIMER: &str = "This AI provides general health information only. \
For medical emergencies, call emergency services.";

const HELP: &str = "Type your health question and press Enter.\n\
Commands:\n  /help  Show this message\n  /new   Start a new conversation\n  /quit  Leave the chat";

/// Break text into lines of at most `max_width` characters, preferring
/// whitespace. Words longer than a line are split.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            // Oversized words get hard-split on char boundaries
            while word.len() > max_width {
                if current_width > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                let rest = word.split_off(max_width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if word.is_empty() {
                continue;
            }

            let needed = if current_width == 0 {
                word.len()
            } else {
                current_width + 1 + word.len()
            };
            if needed > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current_width += word.len();
            current.extend(word);
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Interactive chat front end over any line reader and writer
pub struct Terminal {
    responses: Arc<ResponseTable>,
    scheduler: Arc<dyn DelayScheduler>,
    options: SessionOptions,
    assistant_name: String,
    wrap_width: usize,
}

impl Terminal {
    pub fn new(
        responses: Arc<ResponseTable>,
        scheduler: Arc<dyn DelayScheduler>,
        options: SessionOptions,
        assistant_name: String,
        wrap_width: usize,
    ) -> Self {
        Self {
            responses,
            scheduler,
            options,
            assistant_name,
            wrap_width,
        }
    }

    fn new_session(&self) -> ChatSession {
        let session = ChatSession::new(
            Arc::clone(&self.responses),
            Arc::clone(&self.scheduler),
            self.options.clone(),
        );
        info!("New conversation {}", session.id());
        session
    }

    fn format_message(&self, message: &Message) -> String {
        let who = match message.sender() {
            Sender::User => "You",
            Sender::Bot => self.assistant_name.as_str(),
        };
        let time = message.timestamp().with_timezone(&Local).format("%H:%M");

        let mut out = format!("[{}] {}:\n", time, who);
        // Leave room for the two-space indent
        for line in wrap_text(message.text(), self.wrap_width.saturating_sub(2)) {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    async fn show_new<W>(
        &self,
        out: &mut W,
        session: &ChatSession,
        last_shown: &mut Option<MessageId>,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        for message in session.messages_since(*last_shown) {
            out.write_all(self.format_message(&message).as_bytes())
                .await?;
            *last_shown = Some(message.id());
        }
        Ok(())
    }

    async fn banner<W>(&self, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let banner = format!(
            "{}\nAlways here to help. Type /help for commands.\n\n",
            self.assistant_name
        );
        out.write_all(banner.as_bytes()).await?;
        Ok(())
    }

    /// Run the chat until /quit or end of input
    pub async fn run<R, W>(&self, reader: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut session = self.new_session();
        let mut last_shown = None;

        self.banner(&mut out).await?;
        self.show_new(&mut out, &session, &mut last_shown).await?;

        loop {
            out.write_all(b"> ").await?;
            out.flush().await?;

            let line = match lines.next_line().await.context("Failed to read input")? {
                Some(line) => line,
                None => break,
            };

            match Input::parse(&line) {
                Input::Chat(text) => match session.submit(&text) {
                    Submission::Accepted(_) => {
                        self.show_new(&mut out, &session, &mut last_shown).await?;
                        if session.is_composing() {
                            out.write_all(b"Typing...\n").await?;
                            out.flush().await?;
                        }
                        session.wait_idle().await;
                        self.show_new(&mut out, &session, &mut last_shown).await?;
                        out.write_all(format!("\n{}\n", DISCLAIMER).as_bytes())
                            .await?;
                    }
                    Submission::Blank => {}
                    Submission::Busy => {
                        out.write_all(b"Still typing, please wait.\n").await?;
                    }
                },
                Input::Help => {
                    out.write_all(format!("{}\n", HELP).as_bytes()).await?;
                }
                Input::New => {
                    session = self.new_session();
                    last_shown = None;
                    self.show_new(&mut out, &session, &mut last_shown).await?;
                }
                Input::Quit => break,
                Input::Unknown(command) => {
                    debug!("Unknown command: {}", command);
                    out.write_all(
                        format!("Unknown command {}. Type /help for commands.\n", command)
                            .as_bytes(),
                    )
                    .await?;
                }
            }
        }

        out.write_all(b"\nTake care!\n").await?;
        out.flush().await?;
        Ok(())
    }
}
