//! `/command args...` parsing: [`IsCommand`] decides whether a
//! `message_created` update is a given command, and
//! [`crate::middlewares::ProvideCommandArgs`] injects the parsed argument
//! list into the request [`crate::context::Context`] for handlers to pull
//! out with an extractor.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::{event::Request, types::UpdateKind};

use super::Filter;

/// Splits `text` into `(mentioned_bot_username, command, args)`, or
/// `None` if it doesn't look like `[@bot] <prefix><command> [args...]`.
#[must_use]
pub fn parse_command(text: &str, prefix: &str) -> Option<(Option<&str>, &str, Vec<&str>)> {
    let mut parts = text.splitn(3, char::is_whitespace);

    let first = parts.next()?;

    if let Some(command) = first.strip_prefix(prefix).map(|_| first) {
        let rest = parts.next().unwrap_or("");
        let args = rest.split_whitespace().collect();
        return Some((None, command, args));
    }

    if let Some(mention) = first.strip_prefix('@').map(|_| first) {
        let second = parts.next()?;
        if second.starts_with(prefix) {
            let rest = parts.next().unwrap_or("");
            let args = rest.split_whitespace().collect();
            return Some((Some(mention), second, args));
        }
    }

    None
}

/// Matches `message_created` updates whose text is one of `commands`
/// (compared without the prefix).
pub struct IsCommand {
    commands: HashSet<String>,
    prefix: String,
    check_case: bool,
    only_with_bot_username: bool,
}

impl IsCommand {
    #[must_use]
    pub fn new<I, T>(commands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            prefix: "/".to_owned(),
            check_case: false,
            only_with_bot_username: false,
        }
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn check_case(mut self, check_case: bool) -> Self {
        self.check_case = check_case;
        self
    }

    #[must_use]
    pub fn only_with_bot_username(mut self, only: bool) -> Self {
        self.only_with_bot_username = only;
        self
    }
}

#[async_trait]
impl<S: Send + Sync> Filter<S> for IsCommand {
    async fn check(&self, request: &Request<S>) -> bool {
        let UpdateKind::MessageCreated(created) = &request.update.kind else {
            return false;
        };
        let Some(text) = created.message.body.text.as_deref() else {
            return false;
        };

        let Some((mention, command, _args)) = parse_command(text.trim(), &self.prefix) else {
            return false;
        };

        if self.only_with_bot_username && mention.is_none() {
            return false;
        }

        let Some(bare) = command.strip_prefix(self.prefix.as_str()) else {
            return false;
        };

        if self.check_case {
            self.commands.contains(bare)
        } else {
            self.commands.iter().any(|c| c.eq_ignore_ascii_case(bare))
        }
    }
}

/// Builds the `(filter, middleware)` pair for matching one or more
/// commands and exposing their parsed arguments to the handler.
#[must_use]
pub fn command(commands: &[&str]) -> (IsCommand, crate::middlewares::ProvideCommandArgs) {
    (
        IsCommand::new(commands.iter().map(|c| (*c).to_owned())),
        crate::middlewares::ProvideCommandArgs::new("/"),
    )
}

/// Shorthand for `command(&["start"])`.
#[must_use]
pub fn command_start() -> (IsCommand, crate::middlewares::ProvideCommandArgs) {
    command(&["start"])
}

/// Metadata about a registered command, for building a bot's `/help` text
/// or its platform-registered command list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandsInfo {
    pub commands: Vec<String>,
    pub info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_command() {
        assert_eq!(
            parse_command("/start hello world", "/"),
            Some((None, "/start", vec!["hello", "world"]))
        );
    }

    #[test]
    fn parses_command_with_no_args() {
        assert_eq!(parse_command("/start", "/"), Some((None, "/start", vec![])));
    }

    #[test]
    fn parses_mentioned_command() {
        assert_eq!(
            parse_command("@mybot /start hello", "/"),
            Some((Some("@mybot"), "/start", vec!["hello"]))
        );
    }

    #[test]
    fn rejects_non_command_text() {
        assert_eq!(parse_command("hello world", "/"), None);
    }

    #[test]
    fn rejects_mention_without_command() {
        assert_eq!(parse_command("@mybot hello", "/"), None);
    }
}
