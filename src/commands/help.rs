//! `get help` text.

/// Usage summary for every command, rendered with `prefix`.
pub fn help_text(prefix: &str) -> String {
    let p = prefix;
    [
        "*Karma Commands*:".to_string(),
        format!("- Add/Remove karma to the word's current karma: `{p} set karma <word> <+karma|-karma>`"),
        format!("- Get current karma for a given word: `{p} get karma <word>`"),
        format!("- Get karma for a given word across channels: `{p} get globalkarma <word>`"),
        format!("- Get current karma ranking for the channel: `{p} rank karma [all]`"),
        "*Admin Commands*:".to_string(),
        format!("- Set admin on current channel: `{p} set admin @user`"),
        format!("- Get admins on current channel: `{p} get admin`"),
        format!("- Remove admin on current channel: `{p} del admin @user`"),
        "*Settings Commands*:".to_string(),
        format!("- Set setting on current channel: `{p} set setting <setting_name> <setting_value>`"),
        format!("- Get setting value on current channel: `{p} get setting <setting_name>`"),
        "- Available settings: `notify_karma` (notify every N points, default 1), `use_karma_emojis` (0 or 1, default 0)".to_string(),
        "*Alias Commands*:".to_string(),
        format!("- Set alias for a given word on current channel: `{p} set alias <word> <alias>`"),
        format!("- Get aliases for a word on current channel: `{p} get alias <word>`"),
        format!("- Remove alias for a word: `{p} del alias <word> <alias>`"),
        "*Rank Commands*:".to_string(),
        format!("- Get top 10 words on current channel: `{p} rank karma`"),
        format!("- Get full rank of words on current channel: `{p} rank karma all`"),
        format!("- Get top 10 words rank of words across channels: `{p} rank globalkarma`"),
        format!("- Get full rank of words across channels: `{p} rank globalkarma all`"),
    ]
    .join("\n")
}
