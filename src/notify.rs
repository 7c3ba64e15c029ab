//! Karma change notices.
//!
//! Decides whether an applied delta is announced and renders the text.

use crate::db::{ChannelSettings, KarmaUpdate};

/// Render the notice for an applied delta, or `None` when the channel's
/// notify threshold was not hit.
///
/// `global` is the word's alias-resolved score summed over every channel;
/// it is only mentioned when the word has karma outside this channel.
pub fn karma_notice(
    word: &str,
    delta: i64,
    update: KarmaUpdate,
    settings: &ChannelSettings,
    global: i64,
) -> Option<String> {
    if !update.notify {
        return None;
    }

    let mut notice = format!("`{}` has `{}` karma points!", word, update.score);

    if global != update.score && global != 0 {
        notice.push_str(&format!(" (`{}` points across channels)", global));
    }

    if settings.use_emojis {
        notice.push_str(if delta < 0 { " :thumbsdown:" } else { " :thumbsup:" });
    }

    Some(notice)
}
