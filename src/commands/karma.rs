//! Karma commands: SET/GET/RANK on the channel ledger, GET/RANK across channels.

use super::{CommandProcessor, now};
use crate::db::RankEntry;
use crate::error::{CommandError, CommandResult};
use kb_proto::format_mention;
use tracing::info;

fn render_rank(title: &str, entries: &[RankEntry]) -> String {
    let mut reply = format!(":trophy: {} :trophy: \n", title);
    for entry in entries {
        reply.push_str(&format!("  `{} ({})`\n", entry.word, entry.score));
    }
    reply
}

impl CommandProcessor {
    /// `set karma <word> <value>`: add `value` to the word's score.
    pub(super) async fn handle_karma_set(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        self.require_admin(channel, requester, "set karma on this channel")
            .await?;

        let usage = || CommandError::Usage(self.usage("set karma word integer"));
        let [word, value] = args else {
            return Err(usage());
        };
        let value: i64 = value.parse().map_err(|_| usage())?;

        let word = self.db.aliases().resolve(channel, word).await?;
        let update = self
            .db
            .karma()
            .apply_delta(channel, &word, value, &requester.to_lowercase(), now())
            .await?;

        info!(word = %word, delta = value, score = update.score, "karma set by admin");
        Ok(format!(
            "User {} set karma for word `{}` to `{}` on this channel :white_check_mark:",
            format_mention(requester),
            word,
            update.score
        ))
    }

    /// `get karma <word>...`
    pub(super) async fn handle_karma_get(&self, channel: &str, args: &[&str]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage(self.usage("get karma word")));
        }

        let mut reply = String::new();
        for word in args {
            let word = self.db.aliases().resolve(channel, word).await?;
            let score = self.db.karma().current_score(channel, &word).await?.unwrap_or(0);
            reply.push_str(&format!("`{}` has `{}` karma points!\n", word, score));
        }
        Ok(reply)
    }

    /// `rank karma [all]`
    pub(super) async fn handle_karma_rank(&self, channel: &str, args: &[&str]) -> CommandResult {
        let entries = self.db.karma().rank(channel, self.rank_limit(args)).await?;
        Ok(render_rank("Karma Rank", &entries))
    }

    /// `get globalkarma <word>...`
    pub(super) async fn handle_global_get(&self, args: &[&str]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage(self.usage("get globalkarma word")));
        }

        let mut reply = String::new();
        for word in args {
            let score = self.db.karma().global_score(word).await?;
            reply.push_str(&format!(
                "`{}` has `{}` karma points across channels!\n",
                word, score
            ));
        }
        Ok(reply)
    }

    /// `rank globalkarma [all]`
    pub(super) async fn handle_global_rank(&self, args: &[&str]) -> CommandResult {
        let entries = self.db.karma().global_rank(self.rank_limit(args)).await?;
        Ok(render_rank("Global Karma Rank", &entries))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[tokio::test]
    async fn test_set_requires_admin() {
        let p = processor().await;
        assert_eq!(
            run(&p, "U1", "kb set karma pizza 5").await,
            "User <@U1> has no permissions to set karma on this channel :no_entry_sign:"
        );
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let p = processor().await;
        run(&p, "U1", "kb set admin <@U1>").await;

        assert_eq!(
            run(&p, "U1", "kb set karma pizza 5").await,
            "User <@U1> set karma for word `pizza` to `5` on this channel :white_check_mark:"
        );
        assert_eq!(run(&p, "U2", "kb get karma pizza").await, "`pizza` has `5` karma points!\n");

        // The value is a delta on top of the existing score
        run(&p, "U1", "kb set karma pizza -2").await;
        assert_eq!(run(&p, "U2", "kb get karma pizza").await, "`pizza` has `3` karma points!\n");
    }

    #[tokio::test]
    async fn test_set_usage() {
        let p = processor().await;
        run(&p, "U1", "kb set admin <@U1>").await;

        let usage = "Incorrect parameters. Usage kb set karma word integer :warning:";
        assert_eq!(run(&p, "U1", "kb set karma pizza").await, usage);
        assert_eq!(run(&p, "U1", "kb set karma pizza lots").await, usage);
        assert_eq!(run(&p, "U1", "kb set karma pizza 5 6").await, usage);
    }

    #[tokio::test]
    async fn test_get_unknown_word_is_zero_and_resolves_alias() {
        let p = processor().await;
        run(&p, "U1", "kb set admin <@U1>").await;
        run(&p, "U1", "kb set alias js javascript").await;
        run(&p, "U1", "kb set karma js 4").await;

        assert_eq!(
            run(&p, "U2", "kb get karma js sushi").await,
            "`javascript` has `4` karma points!\n`sushi` has `0` karma points!\n"
        );
    }

    #[tokio::test]
    async fn test_rank() {
        let p = processor().await;
        run(&p, "U1", "kb set admin <@U1>").await;
        run(&p, "U1", "kb set karma a 3").await;
        run(&p, "U1", "kb set karma b 7").await;
        run(&p, "U1", "kb set karma c 1").await;

        assert_eq!(
            run(&p, "U2", "kb rank karma").await,
            ":trophy: Karma Rank :trophy: \n  `b (7)`\n  `a (3)`\n  `c (1)`\n"
        );
    }

    #[tokio::test]
    async fn test_rank_limit_and_all() {
        let p = processor().await;
        for i in 0..12 {
            p.db.karma()
                .apply_delta("general", &format!("w{:02}", i), i, "u1", 0)
                .await
                .unwrap();
        }

        let top = run(&p, "U2", "kb rank karma").await;
        assert_eq!(top.lines().count(), 11);
        assert!(top.contains("`w11 (11)`"));
        assert!(!top.contains("`w01 (1)`"));

        let all = run(&p, "U2", "kb rank karma all").await;
        assert_eq!(all.lines().count(), 13);
    }

    #[tokio::test]
    async fn test_global_karma() {
        let p = processor().await;
        p.db.karma().apply_delta("general", "rust", 3, "u1", 0).await.unwrap();
        p.db.karma().apply_delta("random", "rust", 4, "u1", 0).await.unwrap();

        assert_eq!(
            run(&p, "U2", "kb get globalkarma rust").await,
            "`rust` has `7` karma points across channels!\n"
        );
        assert_eq!(
            run(&p, "U2", "kb rank globalkarma").await,
            ":trophy: Global Karma Rank :trophy: \n  `rust (7)`\n"
        );
    }
}
