//! Administrative command grammar.
//!
//! ```text
//! <prefix> <set|get|del|delete|rank> <karma|globalkarma|admin|setting|alias|help> [args...]
//! ```
//!
//! The grammar is anchored at the start of the (normalized) line. The group
//! keyword must be followed by whitespace or the end of the line, so
//! `kb get karmapoints` is not a command.

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult,
    bytes::complete::{tag, take_till1},
    character::complete::space1,
    combinator::{map_res, rest},
};

use crate::error::ProtoError;

/// Invocation prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "kb";

/// Command operation keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `set`
    Set,
    /// `get`
    Get,
    /// `del` or `delete`
    Delete,
    /// `rank`
    Rank,
}

impl Operation {
    /// Canonical keyword for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::Delete => "del",
            Self::Rank => "rank",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(Self::Set),
            "get" => Ok(Self::Get),
            "del" | "delete" => Ok(Self::Delete),
            "rank" => Ok(Self::Rank),
            other => Err(ProtoError::UnknownOperation(other.to_string())),
        }
    }
}

/// Command group keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Per-channel karma.
    Karma,
    /// Karma summed across channels.
    GlobalKarma,
    /// Channel administrators.
    Admin,
    /// Channel settings.
    Setting,
    /// Word aliases.
    Alias,
    /// Usage text.
    Help,
}

impl Group {
    /// Keyword for this group.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Karma => "karma",
            Self::GlobalKarma => "globalkarma",
            Self::Admin => "admin",
            Self::Setting => "setting",
            Self::Alias => "alias",
            Self::Help => "help",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "karma" => Ok(Self::Karma),
            "globalkarma" => Ok(Self::GlobalKarma),
            "admin" => Ok(Self::Admin),
            "setting" => Ok(Self::Setting),
            "alias" => Ok(Self::Alias),
            "help" => Ok(Self::Help),
            other => Err(ProtoError::UnknownGroup(other.to_string())),
        }
    }
}

/// A parsed administrative command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// What to do.
    pub operation: Operation,
    /// What to do it to.
    pub group: Group,
    /// Free-text argument tail, trimmed.
    pub args: String,
}

impl Command {
    /// Whitespace-separated argument fields.
    pub fn fields(&self) -> std::str::SplitWhitespace<'_> {
        self.args.split_whitespace()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{} {}", self.operation, self.group)
        } else {
            write!(f, "{} {} {}", self.operation, self.group, self.args)
        }
    }
}

/// A keyword runs up to the next whitespace or the end of the line.
fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

fn operation(input: &str) -> IResult<&str, Operation> {
    map_res(keyword, str::parse::<Operation>)(input)
}

fn group(input: &str) -> IResult<&str, Group> {
    map_res(keyword, str::parse::<Group>)(input)
}

fn command_line<'a>(prefix: &'a str, input: &'a str) -> IResult<&'a str, Command> {
    let (input, _) = tag(prefix)(input)?;
    let (input, _) = space1(input)?;
    let (input, operation) = operation(input)?;
    let (input, _) = space1(input)?;
    let (input, group) = group(input)?;
    let (input, args) = rest(input)?;

    Ok((
        input,
        Command {
            operation,
            group,
            args: args.trim().to_string(),
        },
    ))
}

/// Match `line` against the command grammar.
///
/// `line` should already be normalized (see [`crate::normalize`]); `prefix`
/// is the invocation keyword (usually [`DEFAULT_PREFIX`]).
pub fn parse_command(line: &str, prefix: &str) -> Option<Command> {
    if prefix.is_empty() {
        return None;
    }
    command_line(prefix, line).ok().map(|(_, command)| command)
}
