//! # kb-proto
//!
//! Message grammar for karmabot.
//!
//! Chat lines reach the bot as free text. This crate turns a line into the two
//! things the bot cares about:
//!
//! - an optional administrative [`Command`] (`kb get karma pizza`)
//! - a lazy stream of [`KarmaToken`]s (`pizza++`, `<@u042> --`)
//!
//! Everything here is pure: no I/O, no logging, no allocation beyond the
//! argument tail of a command.
//!
//! ```rust
//! use kb_proto::{normalize, parse_command, karma_tokens, Group, Modifier, Operation};
//!
//! let line = normalize("  KB get karma Pizza ");
//! let cmd = parse_command(&line, "kb").expect("command");
//! assert_eq!(cmd.operation, Operation::Get);
//! assert_eq!(cmd.group, Group::Karma);
//! assert_eq!(cmd.args, "pizza");
//!
//! let tokens: Vec<_> = karma_tokens("pizza++ and rust+++").collect();
//! assert_eq!(tokens[0].candidate, "pizza");
//! assert_eq!(tokens[1].modifier, Modifier::Inc2);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod mention;
pub mod token;

pub use self::command::{parse_command, Command, Group, Operation, DEFAULT_PREFIX};
pub use self::error::{ProtoError, Result};
pub use self::mention::{
    format_mention, is_user_mention, mention_key, parse_mention, parse_user_mention, Mention, HERE,
};
pub use self::token::{karma_tokens, scan_word, KarmaToken, Modifier, Tokens};

/// Normalize a raw chat line before matching: trim and lower-case.
///
/// Both the command grammar and the token scanner expect normalized input.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
