//! Setting commands: SET/GET of per-channel settings.

use super::CommandProcessor;
use crate::db::Setting;
use crate::error::{CommandError, CommandResult};
use kb_proto::format_mention;
use tracing::info;

impl CommandProcessor {
    /// `set setting <name> <value>`
    pub(super) async fn handle_setting_set(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        self.require_admin(channel, requester, "set settings on this channel")
            .await?;

        let usage = || CommandError::Usage(self.usage("set setting setting_name integer_setting_value"));
        let [name, raw] = args else {
            return Err(usage());
        };

        let setting =
            Setting::from_key(name).ok_or_else(|| CommandError::UnknownSetting(name.to_string()))?;
        let value: i64 = raw.parse().map_err(|_| usage())?;
        if !setting.accepts(value) {
            return Err(CommandError::InvalidSettingValue {
                setting: setting.key().to_string(),
                value: raw.to_string(),
            });
        }

        self.db.settings().set(channel, setting, value).await?;

        info!(%setting, value, requester = %requester, "setting configured");
        Ok(format!(
            "User {} configured setting `{}` to `{}` on this channel :white_check_mark:",
            format_mention(requester),
            setting,
            value
        ))
    }

    /// `get setting <name>...`
    pub(super) async fn handle_setting_get(&self, channel: &str, args: &[&str]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage(self.usage("get setting setting_name")));
        }

        let mut reply = String::new();
        for name in args {
            let value = match Setting::from_key(name) {
                Some(setting) => self.db.settings().get(channel, setting).await?,
                None => None,
            };

            match value {
                Some(value) => reply.push_str(&format!(
                    "Setting `{}` is configured to `{}`\n",
                    name, value
                )),
                None => reply.push_str(&format!("Setting `{}` is not configured\n", name)),
            }
        }
        Ok(reply)
    }
}
