use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{
    command::Command,
    error::{CourierError, CourierResult},
};

/// Reads whitespace separated commands, the form people type:
///
/// ```text
/// insert 0 Hello
/// space -1
/// print
/// ```
///
/// The arguments of one command may continue on later lines.
pub struct TextReader<R> {
    input: R,
    tokens: VecDeque<String>,
}

impl<R: AsyncBufRead + Unpin> TextReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            tokens: VecDeque::new(),
        }
    }

    /// Reads the next command. `Ok(None)` means the input ended before a new
    /// command started. Errors for which [`CourierError::is_recoverable`]
    /// holds leave the reader positioned after the offending token.
    pub async fn read_command(&mut self) -> CourierResult<Option<Command>> {
        let Some(token) = self.next_token().await? else {
            return Ok(None);
        };

        let command = match token.as_str() {
            "insert" => Command::Insert {
                position: self.number("insert").await?,
                text: self.argument("insert").await?.into_bytes(),
            },
            "delete" => Command::Delete {
                from: self.number("delete").await?,
                to: self.number("delete").await?,
            },
            "space" => Command::Space {
                position: self.number("space").await?,
            },
            "newline" => Command::Newline {
                position: self.number("newline").await?,
            },
            "print" => Command::Print,
            _ => return Err(CourierError::UnknownCommand(token)),
        };

        Ok(Some(command))
    }

    async fn next_token(&mut self) -> CourierResult<Option<String>> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return Ok(Some(token));
            }

            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                return Ok(None);
            }

            self.tokens.extend(line.split_whitespace().map(str::to_owned));
        }
    }

    async fn argument(&mut self, command: &'static str) -> CourierResult<String> {
        self.next_token()
            .await?
            .ok_or(CourierError::MissingArgument(command))
    }

    async fn number(&mut self, command: &'static str) -> CourierResult<i32> {
        let token = self.argument(command).await?;
        token.parse().map_err(|_| CourierError::InvalidNumber(token))
    }
}
