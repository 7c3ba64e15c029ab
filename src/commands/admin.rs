//! Admin commands: SET/GET/DEL of channel administrators.

use super::CommandProcessor;
use crate::error::{CommandError, CommandResult};
use kb_proto::{format_mention, parse_user_mention};
use tracing::info;

impl CommandProcessor {
    /// Extract the target user id from the first argument.
    fn target_user<'a>(&self, args: &[&'a str], usage: &str) -> Result<&'a str, CommandError> {
        args.first()
            .copied()
            .and_then(|arg| parse_user_mention(arg).ok())
            .ok_or_else(|| CommandError::NoUserDetected(self.usage(usage)))
    }

    /// `set admin <@user>`
    ///
    /// The first admin of a channel may be added by anyone.
    pub(super) async fn handle_admin_set(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        let target = self.target_user(args, "set admin @user")?;

        if self.db.admins().bootstrap(channel, target, requester).await? {
            info!(user = %target, requester = %requester, "first admin configured");
            return Ok(format!(
                "User {} configured as admin :white_check_mark:",
                format_mention(target)
            ));
        }

        self.require_admin(channel, requester, "configure admins for this channel")
            .await?;

        if !self.db.admins().add(channel, target, requester).await? {
            return Err(CommandError::AlreadyAdmin(target.to_string()));
        }

        info!(user = %target, requester = %requester, "admin configured");
        Ok(format!(
            "User {} configured as admin for this channel :white_check_mark:",
            format_mention(target)
        ))
    }

    /// `get admin`
    pub(super) async fn handle_admin_get(&self, channel: &str) -> CommandResult {
        let admins = self.db.admins().list(channel).await?;
        if admins.is_empty() {
            return Ok("No admins configured for this channel yet".to_string());
        }

        let mut reply = "Admins configured in this channel:\n".to_string();
        for admin in &admins {
            reply.push_str(&format!("* {}\n", format_mention(&admin.user_id)));
        }
        Ok(reply)
    }

    /// `del admin <@user>`
    pub(super) async fn handle_admin_delete(
        &self,
        channel: &str,
        requester: &str,
        args: &[&str],
    ) -> CommandResult {
        let target = self.target_user(args, "del admin @user")?;

        if self.db.admins().count(channel).await? == 0 {
            return Err(CommandError::NoAdmins);
        }

        self.require_admin(channel, requester, "delete admins from this channel")
            .await?;

        if !self.db.admins().remove(channel, target).await? {
            return Err(CommandError::NotAdmin(target.to_string()));
        }

        info!(user = %target, requester = %requester, "admin removed");
        Ok(format!(
            "User {} deleted from admins for this channel :white_check_mark:",
            format_mention(target)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[tokio::test]
    async fn test_bootstrap_any_requester() {
        let p = processor().await;
        // Requester need not be the target
        assert_eq!(
            run(&p, "U9", "kb set admin <@U1>").await,
            "User <@U1> configured as admin :white_check_mark:"
        );
        assert!(p.db.admins().is_admin("general", "U1").await.unwrap());
        assert!(!p.db.admins().is_admin("general", "U9").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_add_once_bootstrapped() {
        let p = processor().await;
        run(&p, "U1", "kb set admin <@U1>").await;

        assert_eq!(
            run(&p, "U2", "kb set admin <@U2>").await,
            "User <@U2> has no permissions to configure admins for this channel :no_entry_sign:"
        );
        assert_eq!(
            run(&p, "U1", "kb set admin <@U2>").await,
            "User <@U2> configured as admin for this channel :white_check_mark:"
        );
        assert_eq!(
            run(&p, "U2", "kb set admin <@U1>").await,
            "User <@U1> is already an admin for this channel :warning:"
        );
    }

    #[tokio::test]
    async fn test_no_user_detected() {
        let p = processor().await;
        assert_eq!(
            run(&p, "U1", "kb set admin bob").await,
            "No user detected. Usage kb set admin @user :warning:"
        );
        assert_eq!(
            run(&p, "U1", "kb del admin").await,
            "No user detected. Usage kb del admin @user :warning:"
        );
        assert_eq!(
            run(&p, "U1", "kb set admin <!here>").await,
            "No user detected. Usage kb set admin @user :warning:"
        );
    }

    #[tokio::test]
    async fn test_get_admins() {
        let p = processor().await;
        assert_eq!(
            run(&p, "U1", "kb get admin").await,
            "No admins configured for this channel yet"
        );

        run(&p, "U1", "kb set admin <@U1>").await;
        assert_eq!(
            run(&p, "U1", "kb get admin").await,
            "Admins configured in this channel:\n* <@U1>\n"
        );
    }

    #[tokio::test]
    async fn test_delete_admin() {
        let p = processor().await;
        assert_eq!(
            run(&p, "U1", "kb del admin <@U1>").await,
            "Channel has no admins configured. Deletion canceled. :warning:"
        );

        run(&p, "U1", "kb set admin <@U1>").await;
        run(&p, "U1", "kb set admin <@U2>").await;

        assert_eq!(
            run(&p, "U3", "kb del admin <@U2>").await,
            "User <@U3> has no permissions to delete admins from this channel :no_entry_sign:"
        );
        assert_eq!(
            run(&p, "U1", "kb del admin <@U3>").await,
            "User <@U3> is not admin for this channel. Deletion canceled. :warning:"
        );
        assert_eq!(
            run(&p, "U1", "kb delete admin <@U2>").await,
            "User <@U2> deleted from admins for this channel :white_check_mark:"
        );
        assert!(!p.db.admins().is_admin("general", "U2").await.unwrap());
    }
}
