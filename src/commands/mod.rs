//! Administrative command handlers.
//!
//! Commands arrive already parsed by `kb_proto::parse_command`. Each
//! (group, operation) pair maps to one handler, organized into submodules
//! by group. Handlers return `CommandResult`; every error is rendered into
//! a chat reply here, so callers always get text back.

mod admin;
mod alias;
mod help;
mod karma;
mod settings;

pub use help::help_text;

use crate::db::Database;
use crate::error::{CommandError, CommandResult};
use crate::metrics;
use crate::telemetry::{CommandTimer, spans};
use kb_proto::{Command, Group, Operation};
use tracing::{Instrument, debug, info, warn};

/// Interprets administrative commands against the ledger store.
#[derive(Clone)]
pub struct CommandProcessor {
    pub(crate) db: Database,
    prefix: String,
    rank_limit: u32,
}

impl CommandProcessor {
    /// Create a processor. `prefix` only appears in usage hints.
    pub fn new(db: Database, prefix: impl Into<String>, rank_limit: u32) -> Self {
        Self {
            db,
            prefix: prefix.into(),
            rank_limit,
        }
    }

    /// Run a command for `requester` in `channel` and return the reply.
    ///
    /// An empty reply means the command is not supported and nothing
    /// should be posted.
    pub async fn process(&self, channel: &str, requester: &str, command: &Command) -> String {
        let group = command.group.as_str();
        let operation = command.operation.as_str();
        let span = spans::command(group, operation, channel);

        async {
            let _timer = CommandTimer::new(command.group, command.operation);
            debug!(requester = %requester, args = %command.args, "processing command");

            match self.dispatch(channel, requester, command).await {
                Ok(reply) => reply,
                Err(e) => {
                    if let CommandError::Store(ref db_err) = e {
                        warn!(error = ?db_err, "command failed on store error");
                    } else {
                        debug!(code = e.error_code(), error = %e, "command rejected");
                    }
                    metrics::record_command_error(group, e.error_code());
                    e.reply()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, channel: &str, requester: &str, command: &Command) -> CommandResult {
        let args: Vec<&str> = command.fields().collect();

        match (command.group, command.operation) {
            (Group::Karma, Operation::Set) => self.handle_karma_set(channel, requester, &args).await,
            (Group::Karma, Operation::Get) => self.handle_karma_get(channel, &args).await,
            (Group::Karma, Operation::Rank) => self.handle_karma_rank(channel, &args).await,

            (Group::GlobalKarma, Operation::Get) => self.handle_global_get(&args).await,
            (Group::GlobalKarma, Operation::Rank) => self.handle_global_rank(&args).await,

            (Group::Admin, Operation::Set) => self.handle_admin_set(channel, requester, &args).await,
            (Group::Admin, Operation::Get) => self.handle_admin_get(channel).await,
            (Group::Admin, Operation::Delete) => {
                self.handle_admin_delete(channel, requester, &args).await
            }

            (Group::Setting, Operation::Set) => {
                self.handle_setting_set(channel, requester, &args).await
            }
            (Group::Setting, Operation::Get) => self.handle_setting_get(channel, &args).await,

            (Group::Alias, Operation::Set) => self.handle_alias_set(channel, requester, &args).await,
            (Group::Alias, Operation::Get) => self.handle_alias_get(channel, &args).await,
            (Group::Alias, Operation::Delete) => {
                self.handle_alias_delete(channel, requester, &args).await
            }

            (Group::Help, Operation::Get) => Ok(help_text(&self.prefix)),

            (group, operation) => {
                info!(%group, %operation, "unsupported command combination, ignoring");
                Ok(String::new())
            }
        }
    }

    /// Fail with `PermissionDenied` unless `requester` administers `channel`.
    ///
    /// A channel without admins denies everything here; the first admin
    /// comes from `set admin` bootstrapping.
    pub(crate) async fn require_admin(
        &self,
        channel: &str,
        requester: &str,
        action: &'static str,
    ) -> Result<(), CommandError> {
        if self.db.admins().is_admin(channel, requester).await? {
            Ok(())
        } else {
            info!(requester = %requester, channel = %channel, action, "requester is not admin");
            Err(CommandError::PermissionDenied {
                who: requester.to_string(),
                action,
            })
        }
    }

    /// Usage hint with the configured prefix, e.g. `kb get karma word`.
    pub(crate) fn usage(&self, tail: &str) -> String {
        format!("{} {}", self.prefix, tail)
    }

    pub(crate) fn rank_limit(&self, args: &[&str]) -> Option<u32> {
        if args.first() == Some(&"all") {
            None
        } else {
            Some(self.rank_limit)
        }
    }
}

/// Current unix time for audit columns.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub async fn processor() -> CommandProcessor {
        let db = Database::new(":memory:").await.unwrap();
        CommandProcessor::new(db, "kb", 10)
    }

    pub async fn run(processor: &CommandProcessor, requester: &str, line: &str) -> String {
        let command = kb_proto::parse_command(&kb_proto::normalize(line), "kb").unwrap();
        processor.process("general", requester, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;

    #[tokio::test]
    async fn test_unsupported_pair_is_silent() {
        let p = processor().await;
        assert_eq!(run(&p, "U1", "kb rank admin").await, "");
        assert_eq!(run(&p, "U1", "kb del setting notify_karma").await, "");
        assert_eq!(run(&p, "U1", "kb set help").await, "");
    }

    #[tokio::test]
    async fn test_help() {
        let p = processor().await;
        let help = run(&p, "U1", "kb get help").await;
        assert!(help.contains("`kb set karma <word> <+karma|-karma>`"));
        assert!(help.contains("`kb rank globalkarma all`"));
    }
}
