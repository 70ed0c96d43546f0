/// Property-based tests for the guess ledger using proptest
///
/// These tests check the replace policies and winner selection across
/// randomly generated rounds.
use guess_moderator::GuessLedger;
use proptest::prelude::*;

// Strategy to generate a participant name from a small pool, so repeats happen
fn participant_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["ann", "bo", "cy", "dee", "ed", "flo"]).prop_map(str::to_string)
}

// Strategy to generate a sequence of valid guesses
fn guesses_strategy() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec((participant_strategy(), 0u64..1_000), 1..40)
}

// Strategy to generate text that is never a valid guess
fn invalid_guess_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{1,12}",
        (1u64..1_000).prop_map(|v| format!("-{v}")),
        (0u64..1_000, 1u8..10).prop_map(|(v, f)| format!("{v}.{f}")),
    ]
}

fn fill(ledger: &mut GuessLedger, guesses: &[(String, u64)]) {
    for (name, value) in guesses {
        ledger.accept(name, &value.to_string()).unwrap();
    }
}

proptest! {
    #[test]
    fn test_latest_reply_keeps_last_value(guesses in guesses_strategy()) {
        let mut ledger = GuessLedger::new(true);
        fill(&mut ledger, &guesses);

        for (name, _) in &guesses {
            let last = guesses.iter().rev().find(|(n, _)| n == name).map(|(_, v)| *v);
            prop_assert_eq!(ledger.get(name), last);
        }
    }

    #[test]
    fn test_first_reply_keeps_first_value(guesses in guesses_strategy()) {
        let mut ledger = GuessLedger::new(false);
        fill(&mut ledger, &guesses);

        for (name, _) in &guesses {
            let first = guesses.iter().find(|(n, _)| n == name).map(|(_, v)| *v);
            prop_assert_eq!(ledger.get(name), first);
        }
    }

    #[test]
    fn test_one_entry_per_participant(guesses in guesses_strategy(), latest in any::<bool>()) {
        let mut ledger = GuessLedger::new(latest);
        fill(&mut ledger, &guesses);

        let mut distinct: Vec<&String> = guesses.iter().map(|(n, _)| n).collect();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(ledger.len(), distinct.len());
    }

    #[test]
    fn test_failed_accept_does_not_mutate(
        guesses in guesses_strategy(),
        name in participant_strategy(),
        raw in invalid_guess_strategy(),
    ) {
        let mut ledger = GuessLedger::new(true);
        fill(&mut ledger, &guesses);
        let before: Vec<_> = ledger.iter().cloned().collect();

        prop_assert!(ledger.accept(&name, &raw).is_err());

        let after: Vec<_> = ledger.iter().cloned().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn test_winners_are_closest(guesses in guesses_strategy(), target in 0.0f64..1_000.0) {
        let mut ledger = GuessLedger::new(true);
        fill(&mut ledger, &guesses);

        let result = ledger.score(target, false).unwrap();
        let best = ledger
            .iter()
            .map(|g| (g.value as f64 - target).abs())
            .fold(f64::INFINITY, f64::min);

        prop_assert!(!result.winner_names.is_empty());
        for guess in ledger.iter() {
            let distance = (guess.value as f64 - target).abs();
            let won = result.winner_names.contains(&guess.participant);
            prop_assert_eq!(won, distance == best);
        }
        prop_assert!(result.winner_values.len() <= result.winner_names.len());
    }

    #[test]
    fn test_capped_winners_never_go_over(guesses in guesses_strategy(), target in 0.0f64..1_000.0) {
        let mut ledger = GuessLedger::new(true);
        fill(&mut ledger, &guesses);

        let result = ledger.score(target, true).unwrap();
        let any_under = ledger.iter().any(|g| g.value as f64 <= target);
        if any_under {
            prop_assert!(result.winner_values.iter().all(|&v| v as f64 <= target));
            prop_assert_eq!(result.winner_values.len(), 1);
        }
    }

    #[test]
    fn test_stats_bounds(guesses in guesses_strategy()) {
        let mut ledger = GuessLedger::new(true);
        fill(&mut ledger, &guesses);

        let stats = ledger.stats().unwrap();
        prop_assert_eq!(stats.count, ledger.len());
        prop_assert!(stats.min as f64 <= stats.mean && stats.mean <= stats.max as f64);
        prop_assert!(stats.min as f64 <= stats.median && stats.median <= stats.max as f64);
        prop_assert!(!stats.multimode.is_empty());
    }
}
