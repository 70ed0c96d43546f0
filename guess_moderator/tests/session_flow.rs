//! Full guessing rounds driven through the public session API.

use guess_moderator::{GuessError, Session, SessionState};
use std::collections::BTreeSet;

/// Ten participants, three of them tied on 7.
fn sample_session(closest_without_going_over: bool) -> Session {
    let mut session = Session::new(true, closest_without_going_over);
    session.start().unwrap();
    for (name, raw) in [
        ("a", "1"),
        ("b", "2"),
        ("c", "3"),
        ("d", "4"),
        ("e", "5"),
        ("f", "6"),
        ("g", "7"),
        ("g2", "7"),
        ("g3", "7"),
        ("h", "8"),
    ] {
        session.submit_guess(name, raw).unwrap();
    }
    session.begin_stop().unwrap();
    session.finish_stop().unwrap();
    session
}

fn winners(session: &Session, target: f64, capped: bool) -> (Vec<String>, BTreeSet<u64>) {
    let result = session.score_with(target, capped).unwrap();
    (result.winner_names, result.winner_values)
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_sample_stats() {
    let session = sample_session(false);
    let stats = session.stats().unwrap();

    assert_eq!(stats.count, 10);
    assert_eq!(stats.min, 1);
    assert_eq!(stats.max, 8);
    assert_eq!(stats.mean, 5.0);
    assert_eq!(stats.median, 5.5);
    assert_eq!(stats.multimode, vec![7]);
    assert_eq!(stats.quartiles, [2.75, 5.5, 7.0]);
}

#[test]
fn test_sample_scores_closest() {
    let session = sample_session(false);

    assert_eq!(winners(&session, 4.0, false), (names(&["d"]), BTreeSet::from([4])));
    assert_eq!(
        winners(&session, 7.0, false),
        (names(&["g", "g2", "g3"]), BTreeSet::from([7]))
    );
    // Equidistant values either side of the target both win
    assert_eq!(
        winners(&session, 3.5, false),
        (names(&["c", "d"]), BTreeSet::from([3, 4]))
    );
    assert_eq!(winners(&session, 5.75, false), (names(&["f"]), BTreeSet::from([6])));
}

#[test]
fn test_sample_scores_without_going_over() {
    let session = sample_session(true);

    assert_eq!(winners(&session, 3.5, true), (names(&["c"]), BTreeSet::from([3])));
    assert_eq!(winners(&session, 5.75, true), (names(&["e"]), BTreeSet::from([5])));

    // Configured mode is what `score` uses
    let result = session.score(5.75).unwrap();
    assert_eq!(result.winner_names, names(&["e"]));
}

#[test]
fn test_everyone_over_falls_back_to_closest() {
    let session = sample_session(true);
    assert_eq!(winners(&session, 0.5, true), (names(&["a"]), BTreeSet::from([1])));
}

#[test]
fn test_stats_and_score_are_idempotent() {
    let session = sample_session(false);

    assert_eq!(session.stats(), session.stats());
    assert_eq!(session.score(7.0), session.score(7.0));
    assert_eq!(session.state(), SessionState::HoldingForScore);
}

#[test]
fn test_start_resets_ledger() {
    let mut session = sample_session(false);
    session.start().unwrap();

    assert!(session.ledger().is_empty());
    assert_eq!(session.stats(), Err(GuessError::EmptyLedger));

    session.submit_guess("late", "12").unwrap();
    session.begin_stop().unwrap();
    session.finish_stop().unwrap();
    assert_eq!(session.score(1.0).unwrap().winner_names, names(&["late"]));
}

#[test]
fn test_reset_reopens_from_any_state() {
    // Holding the sample round for scoring
    let mut session = sample_session(false);
    assert_eq!(session.reset(), 10);
    assert!(session.can_accept_guesses());
    assert!(matches!(
        session.score(4.0),
        Err(GuessError::WrongState {
            state: SessionState::Collecting,
            ..
        })
    ));

    // Mid-round, where a second start is refused
    session.submit_guess("x", "30").unwrap();
    assert!(session.start().is_err());
    assert_eq!(session.reset(), 1);
    assert!(session.ledger().is_empty());

    // While the stop delay runs
    session.submit_guess("y", "2").unwrap();
    session.begin_stop().unwrap();
    assert_eq!(session.reset(), 1);
    assert_eq!(session.state(), SessionState::Collecting);

    session.submit_guess("z", "5").unwrap();
    session.begin_stop().unwrap();
    session.finish_stop().unwrap();
    assert_eq!(session.score(1.0).unwrap().winner_names, names(&["z"]));
}

#[test]
fn test_replace_and_first_wins_policies() {
    let mut latest = Session::new(true, false);
    let mut first = Session::new(false, false);

    for session in [&mut latest, &mut first] {
        session.start().unwrap();
        session.submit_guess("viewer", "10").unwrap();
        session.submit_guess("viewer", "20 changed my mind").unwrap();
    }

    assert_eq!(latest.ledger().get("viewer"), Some(20));
    assert_eq!(first.ledger().get("viewer"), Some(10));
    assert_eq!(latest.ledger().len(), 1);
}

#[test]
fn test_bad_guesses_leave_ledger_alone() {
    let mut session = Session::default();
    session.start().unwrap();
    session.submit_guess("viewer", "6").unwrap();

    assert_eq!(
        session.submit_guess("viewer", "banana"),
        Err(GuessError::NotANumber)
    );
    assert_eq!(
        session.submit_guess("viewer", "-6"),
        Err(GuessError::NegativeValue)
    );
    assert_eq!(
        session.submit_guess("viewer", "6.5"),
        Err(GuessError::NotANumber)
    );
    assert_eq!(session.ledger().get("viewer"), Some(6));
}

#[test]
fn test_empty_round_scores_to_error() {
    let mut session = Session::default();
    session.start().unwrap();
    session.begin_stop().unwrap();

    let summary = session.finish_stop().unwrap();
    assert_eq!(summary.count, 0);
    assert_eq!(session.score(3.0), Err(GuessError::EmptyLedger));
    assert_eq!(session.stats(), Err(GuessError::EmptyLedger));
}

#[test]
fn test_results_serialize() {
    let session = sample_session(false);

    let stats = serde_json::to_value(session.stats().unwrap()).unwrap();
    assert_eq!(stats["count"], 10);
    assert_eq!(stats["multimode"], serde_json::json!([7]));

    let result = serde_json::to_value(session.score(4.0).unwrap()).unwrap();
    assert_eq!(result["winner_names"], serde_json::json!(["d"]));
    assert_eq!(result["winner_values"], serde_json::json!([4]));
}
