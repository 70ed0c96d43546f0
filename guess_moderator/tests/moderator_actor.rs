//! Moderator actor driven over its handle, with the Tokio clock paused so
//! the stop delay runs instantly.

use guess_moderator::{
    BotCommand, GuessError, ModeratorActor, ModeratorConfig, ModeratorHandle, Outbound,
    SessionState,
    moderator::{ModeratorMessage, ModeratorResponse},
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

fn spawn_moderator(config: ModeratorConfig) -> (ModeratorHandle, mpsc::Receiver<Outbound>) {
    let (outbox, outbox_rx) = mpsc::channel(64);
    let (actor, handle) = ModeratorActor::new(config, outbox);
    tokio::spawn(actor.run());
    (handle, outbox_rx)
}

fn drain(outbox: &mut mpsc::Receiver<Outbound>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(message) = outbox.try_recv() {
        lines.push(message.to_string());
    }
    lines
}

#[tokio::test(start_paused = true)]
async fn test_full_round() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig::default());

    handle.command("host", BotCommand::StartGuessing).await.unwrap();
    for (name, raw) in [("ann", "10"), ("bo", "14 i think"), ("cy", "20")] {
        let response = handle.submit_guess(name, raw).await.unwrap();
        assert!(response.is_success());
    }

    let response = handle.command("host", BotCommand::StopGuessing).await.unwrap();
    assert!(matches!(response, ModeratorResponse::Stopped(summary) if summary.count == 3));

    let response = handle
        .command("host", BotCommand::Score { target: 15.0 })
        .await
        .unwrap();
    match response {
        ModeratorResponse::Scored(result) => assert_eq!(result.winner_names, vec!["bo"]),
        other => panic!("Expected score, got {other:?}"),
    }

    let lines = drain(&mut outbox);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "3 guesses received, ranging from 10 to 20");
    assert_eq!(lines[3], "Target 15. Winner with 14: bo");
}

#[tokio::test(start_paused = true)]
async fn test_guess_during_stop_delay_is_rejected() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig {
        stopguess_delay: 10,
        ..ModeratorConfig::default()
    });
    handle.command("host", BotCommand::StartGuessing).await.unwrap();
    handle.submit_guess("early", "5").await.unwrap();

    // Queue the stop without waiting on the delay
    let (response, stopped) = oneshot::channel();
    handle
        .send(ModeratorMessage::Command {
            invoker: "host".to_string(),
            command: BotCommand::StopGuessing,
            response,
        })
        .await
        .unwrap();

    assert_eq!(handle.state().await.unwrap(), SessionState::Closing);
    let late = handle.submit_guess("late", "6").await.unwrap();
    assert!(matches!(
        late,
        ModeratorResponse::Rejected(GuessError::WrongState {
            state: SessionState::Closing,
            ..
        })
    ));

    // Scoring is not open yet either
    let early_score = handle
        .command("host", BotCommand::Score { target: 5.0 })
        .await
        .unwrap();
    assert!(!early_score.is_success());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let summary = match stopped.await.unwrap() {
        ModeratorResponse::Stopped(summary) => summary,
        other => panic!("Expected stop summary, got {other:?}"),
    };
    assert_eq!(summary.count, 1);
    assert_eq!(handle.state().await.unwrap(), SessionState::HoldingForScore);

    let lines = drain(&mut outbox);
    assert!(lines.iter().any(|line| line.starts_with("@host Can't score")));
    assert_eq!(lines.last().unwrap(), "1 guess received, ranging from 5 to 5");
}

#[tokio::test(start_paused = true)]
async fn test_add_guess_overrides_first_wins() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig {
        use_latest_reply: false,
        ..ModeratorConfig::default()
    });
    handle.command("host", BotCommand::StartGuessing).await.unwrap();

    assert_eq!(
        handle.submit_guess("viewer", "3").await.unwrap(),
        ModeratorResponse::GuessAccepted(3)
    );
    assert_eq!(
        handle.submit_guess("viewer", "9").await.unwrap(),
        ModeratorResponse::GuessAccepted(3)
    );

    let response = handle
        .command(
            "host",
            BotCommand::AddGuess {
                value: 9,
                participant: Some("viewer".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        response,
        ModeratorResponse::GuessAdded {
            participant: "viewer".to_string(),
            value: 9,
            replaced: Some(3),
        }
    );

    let response = handle
        .command(
            "host",
            BotCommand::AddGuess {
                value: 1,
                participant: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(response, ModeratorResponse::GuessAdded { participant, .. } if participant == "host"));

    let lines = drain(&mut outbox);
    assert!(lines.contains(&"@host Added guess 9 for viewer".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_stats_reply_and_empty_ledger() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig::default());
    handle.command("host", BotCommand::StartGuessing).await.unwrap();

    let response = handle.command("host", BotCommand::Stats).await.unwrap();
    assert_eq!(response, ModeratorResponse::Rejected(GuessError::EmptyLedger));

    handle.submit_guess("ann", "4").await.unwrap();
    handle.submit_guess("bo", "8").await.unwrap();
    let response = handle.command("host", BotCommand::Stats).await.unwrap();
    assert!(matches!(response, ModeratorResponse::Stats(stats) if stats.mean == 6.0));

    let lines = drain(&mut outbox);
    assert_eq!(lines[1], "@host No guesses yet");
    assert!(lines[2].starts_with("2 guesses | min 4 | max 8 | mean 6.00"));
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_scoring() {
    let (handle, _outbox) = spawn_moderator(ModeratorConfig {
        stopguess_delay: 0,
        ..ModeratorConfig::default()
    });

    handle.command("host", BotCommand::StartGuessing).await.unwrap();
    handle.submit_guess("ann", "4").await.unwrap();
    handle.command("host", BotCommand::StopGuessing).await.unwrap();

    let response = handle.command("host", BotCommand::StartGuessing).await.unwrap();
    assert_eq!(response, ModeratorResponse::Started);

    let response = handle.command("host", BotCommand::Stats).await.unwrap();
    assert_eq!(response, ModeratorResponse::Rejected(GuessError::EmptyLedger));
}

/// Issue a stop without waiting out its delay
async fn queue_stop(handle: &ModeratorHandle) -> oneshot::Receiver<ModeratorResponse> {
    let (response, stopped) = oneshot::channel();
    handle
        .send(ModeratorMessage::Command {
            invoker: "host".to_string(),
            command: BotCommand::StopGuessing,
            response,
        })
        .await
        .unwrap();
    stopped
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_open_round() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig::default());
    handle.command("host", BotCommand::StartGuessing).await.unwrap();
    handle.submit_guess("ann", "4").await.unwrap();
    handle.submit_guess("bo", "9").await.unwrap();

    let response = handle.command("host", BotCommand::ResetGuessing).await.unwrap();
    assert_eq!(response, ModeratorResponse::Reset { discarded: 2 });
    assert_eq!(handle.state().await.unwrap(), SessionState::Collecting);

    let response = handle.command("host", BotCommand::Stats).await.unwrap();
    assert_eq!(response, ModeratorResponse::Rejected(GuessError::EmptyLedger));

    let lines = drain(&mut outbox);
    assert!(lines[1].starts_with("Guessing reset!"));
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_stop_delay_cancels_the_stop() {
    let (handle, mut outbox) = spawn_moderator(ModeratorConfig::default());
    handle.command("host", BotCommand::StartGuessing).await.unwrap();
    handle.submit_guess("ann", "4").await.unwrap();

    let first_stop = queue_stop(&handle).await;
    assert_eq!(handle.state().await.unwrap(), SessionState::Closing);

    let response = handle.command("host", BotCommand::ResetGuessing).await.unwrap();
    assert_eq!(response, ModeratorResponse::Reset { discarded: 1 });
    handle.submit_guess("bo", "6").await.unwrap();

    // A second stop issued 3s in; the first stop's delay ends 2s later
    tokio::time::sleep(Duration::from_secs(3)).await;
    let second_stop = queue_stop(&handle).await;

    assert!(matches!(
        first_stop.await.unwrap(),
        ModeratorResponse::Rejected(GuessError::WrongState {
            state: SessionState::Closing,
            ..
        })
    ));
    assert_eq!(handle.state().await.unwrap(), SessionState::Closing);

    let summary = match second_stop.await.unwrap() {
        ModeratorResponse::Stopped(summary) => summary,
        other => panic!("Expected stop summary, got {other:?}"),
    };
    assert_eq!(summary.count, 1);
    assert_eq!(summary.min, Some(6));

    let lines = drain(&mut outbox);
    assert_eq!(
        lines,
        vec![
            "Guessing is open! Post a positive whole number to guess",
            "Guessing window closed",
            "Guessing reset! Earlier guesses are gone, post a positive whole number to guess",
            "Guessing window closed",
            "1 guess received, ranging from 6 to 6",
        ]
    );
}
