//! Karma token scanning.
//!
//! A karma token is a word immediately followed by a run of `+` or `-`:
//!
//! | run   | delta |
//! |-------|-------|
//! | `++`  | +1    |
//! | `--`  | -1    |
//! | `+++` | +2    |
//! | `---` | -2    |
//!
//! Any other run (a single sign, mixed signs, four or more) yields nothing.
//! Scanning is lazy: [`karma_tokens`] walks the line word by word.

use std::iter::Peekable;
use std::str::SplitWhitespace;

use crate::mention::{is_user_mention, HERE};

/// Score modifier carried by a karma token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `++`
    Inc,
    /// `--`
    Dec,
    /// `+++`
    Inc2,
    /// `---`
    Dec2,
}

impl Modifier {
    /// Map a trailing sign run to a modifier.
    pub fn from_run(run: &str) -> Option<Self> {
        match run {
            "++" => Some(Self::Inc),
            "--" => Some(Self::Dec),
            "+++" => Some(Self::Inc2),
            "---" => Some(Self::Dec2),
            _ => None,
        }
    }

    /// Signed score change.
    pub fn delta(&self) -> i64 {
        match self {
            Self::Inc => 1,
            Self::Dec => -1,
            Self::Inc2 => 2,
            Self::Dec2 => -2,
        }
    }

    /// Sign run as typed by the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Inc2 => "+++",
            Self::Dec2 => "---",
        }
    }
}

/// A candidate word (or mention) and the modifier applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KarmaToken<'a> {
    /// The word, mention markup or `<!here>`, without the sign run.
    pub candidate: &'a str,
    /// The parsed sign run.
    pub modifier: Modifier,
}

/// Characters allowed in the word part of a token.
#[inline]
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '<' | '>' | '@')
}

/// Strip code-block fences and diff markers glued to the front of a word.
fn strip_noise(word: &str) -> &str {
    word.trim_start_matches('`')
        .trim_start_matches('+')
        .trim_start_matches('-')
}

/// Scan a single whitespace-free word for a karma token.
pub fn scan_word(word: &str) -> Option<KarmaToken<'_>> {
    let word = strip_noise(word);
    let body = word.trim_end_matches(['+', '-']);
    let run = &word[body.len()..];

    if body.is_empty() {
        return None;
    }
    let modifier = Modifier::from_run(run)?;
    // Mentions may carry a `|label`, which is not a token character
    if body != HERE && !is_user_mention(body) && !body.chars().all(is_token_char) {
        return None;
    }

    Some(KarmaToken {
        candidate: body,
        modifier,
    })
}

/// Lazy iterator over the karma tokens of a line. See [`karma_tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    words: Peekable<SplitWhitespace<'a>>,
    code: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = KarmaToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.code {
            return None;
        }

        loop {
            let word = self.words.next()?;

            // Autocomplete inserts a space after a mention: "<@u1> ++"
            if is_user_mention(word)
                && let Some(modifier) = self.words.peek().and_then(|next| Modifier::from_run(next))
            {
                self.words.next();
                return Some(KarmaToken {
                    candidate: word,
                    modifier,
                });
            }

            if let Some(token) = scan_word(word) {
                return Some(token);
            }
        }
    }
}

/// Scan a normalized line for karma tokens.
///
/// Lines containing a backtick are treated as code and yield nothing.
pub fn karma_tokens(line: &str) -> Tokens<'_> {
    Tokens {
        words: line.split_whitespace().peekable(),
        code: line.contains('`'),
    }
}
