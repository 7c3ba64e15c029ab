//! Alias commands: SET/GET/DEL of word aliases.

use super::CommandProcessor;
use crate::db::AliasOutcome;
use crate::error::{CommandError, CommandResult};
use kb_proto::format_mention;
use tracing::info;

impl CommandProcessor {
    /// Split `<word> <alias>`, rejecting a word aliased to itself.
    fn alias_pair<'a>(&self, args: &[&'a str], usage: &str) -> Result<(&'a str, &'a str), CommandError> {
        let [word, alias] = args else {
            return Err(CommandError::Usage(self.usage(usage)));
        };
        if word == alias {
            return Err(CommandError::InvalidAlias {
                word: word.to_string(),
                alias: alias.to_string(),
            });
        }
        Ok((*word, *alias))
    }

    /// `set alias <word> <alias>`: karma given to `word` lands on `alias`.
    pub(super) async fn handle_alias_set(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        self.require_admin(channel, requester, "set alias on this channel")
            .await?;
        let (word, alias) = self.alias_pair(args, "set alias word alias")?;

        match self.db.aliases().set(channel, word, alias, &requester.to_lowercase()).await? {
            AliasOutcome::Created => {
                info!(word = %word, alias = %alias, "alias configured");
                Ok(format!(
                    "User {} configured alias `{}` for word `{}` on this channel :white_check_mark:",
                    format_mention(requester),
                    alias,
                    word
                ))
            }
            AliasOutcome::Exists { target } => Err(CommandError::AliasExists {
                word: word.to_string(),
                alias: target,
            }),
            AliasOutcome::Rejected { conflict } => {
                Err(CommandError::AliasCycle { word: conflict })
            }
        }
    }

    /// `get alias <word>...`
    pub(super) async fn handle_alias_get(&self, channel: &str, args: &[&str]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage(self.usage("get alias word")));
        }

        let mut reply = String::new();
        for word in args {
            match self.db.aliases().get(channel, word).await? {
                Some(alias) => reply.push_str(&format!(
                    "Word `{}` has alias `{}` configured\n",
                    word, alias
                )),
                None => {
                    let sources = self.db.aliases().sources_for(channel, word).await?;
                    if sources.is_empty() {
                        reply.push_str(&format!("Word `{}` has no alias configured\n", word));
                    } else {
                        let sources: Vec<String> =
                            sources.iter().map(|s| format!("`{}`", s)).collect();
                        reply.push_str(&format!(
                            "Word `{}` is the alias of {}\n",
                            word,
                            sources.join(", ")
                        ));
                    }
                }
            }
        }
        Ok(reply)
    }

    /// `del alias <word> <alias>`
    pub(super) async fn handle_alias_delete(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        self.require_admin(channel, requester, "delete alias on this channel")
            .await?;
        let (word, alias) = self.alias_pair(args, "del alias word alias")?;

        if !self.db.aliases().delete(channel, word, alias).await? {
            return Ok(format!(
                "Word `{}` has no alias `{}` configured on this channel :warning:",
                word, alias
            ));
        }

        info!(word = %word, alias = %alias, "alias deleted");
        Ok(format!(
            "User {} deleted alias `{}` for word `{}` on this channel :white_check_mark:",
            format_mention(requester),
            alias,
            word
        ))
    }
}
