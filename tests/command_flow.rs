//! Integration tests for commands arriving as chat messages.

mod common;

use common::{GENERAL, TestBot};

#[tokio::test]
async fn test_set_karma_then_get() {
    let t = TestBot::new().await;
    t.say("U1", "kb set admin <@U1>").await;

    let reply = t.reply("U1", "kb set karma pizza 5").await;
    assert!(reply.contains("`5`"), "unexpected reply: {reply}");

    assert_eq!(
        t.reply("U2", "kb get karma pizza").await,
        "`pizza` has `5` karma points!\n"
    );
}

#[tokio::test]
async fn test_set_karma_requires_admin() {
    let t = TestBot::new().await;

    let reply = t.reply("U1", "kb set karma pizza 5").await;

    assert!(reply.contains(":no_entry_sign:"), "unexpected reply: {reply}");
    assert_eq!(t.score("pizza").await, None);
}

#[tokio::test]
async fn test_rank_orders_by_score() {
    let t = TestBot::new().await;
    t.say("U1", "kb set admin <@U1>").await;
    t.say("U1", "kb set karma a 3").await;
    t.say("U1", "kb set karma b 7").await;
    t.say("U1", "kb set karma c 1").await;

    assert_eq!(
        t.reply("U2", "kb rank karma").await,
        ":trophy: Karma Rank :trophy: \n  `b (7)`\n  `a (3)`\n  `c (1)`\n"
    );
}

#[tokio::test]
async fn test_admin_bootstrap() {
    let t = TestBot::new().await;

    assert_eq!(
        t.reply("U1", "kb set admin <@U2>").await,
        "User <@U2> configured as admin :white_check_mark:"
    );
    assert_eq!(
        t.reply("U3", "kb set admin <@U3>").await,
        "User <@U3> has no permissions to configure admins for this channel :no_entry_sign:"
    );
    assert_eq!(
        t.reply("U2", "kb set admin <@U3>").await,
        "User <@U3> configured as admin for this channel :white_check_mark:"
    );
}

#[tokio::test]
async fn test_command_reply_threading() {
    let t = TestBot::new().await;

    let sent = t.say("U1", "kb get karma pizza").await;
    assert_eq!(sent[0].channel, GENERAL);
    assert_eq!(sent[0].thread_ts, None);

    let sent = t
        .say_in(GENERAL, "U1", "kb get karma pizza", Some("1699999999.000001"))
        .await;
    assert_eq!(sent[0].thread_ts.as_deref(), Some("1699999999.000001"));
}

#[tokio::test]
async fn test_command_is_not_scanned_for_tokens() {
    let t = TestBot::new().await;

    let sent = t.say("U1", "kb get karma pizza++").await;

    assert_eq!(sent.len(), 1);
    assert_eq!(t.score("pizza").await, None);
}

#[tokio::test]
async fn test_unsupported_command_is_silent() {
    let t = TestBot::new().await;

    assert!(t.say("U1", "kb rank admin").await.is_empty());
}

#[tokio::test]
async fn test_help() {
    let t = TestBot::new().await;

    let reply = t.reply("U1", "kb get help").await;

    assert!(reply.contains("*Karma Commands*:"));
    assert!(reply.contains("`kb rank globalkarma all`"));
}
