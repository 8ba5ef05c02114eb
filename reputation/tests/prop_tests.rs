use proptest::prelude::*;

use triad_reputation::{Reputation, MAX_SCORE, MIN_SCORE};

#[derive(Clone, Debug)]
enum Event {
    Honest(u64),
    Cheat,
    InvalidAuth,
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        any::<u64>().prop_map(Event::Honest),
        Just(Event::Cheat),
        Just(Event::InvalidAuth),
    ]
}

proptest! {
    /// The score never leaves its bounds, whatever the update sequence.
    #[test]
    fn score_stays_bounded(events in prop::collection::vec(event(), 0..200)) {
        let mut rep = Reputation::new();
        for e in events {
            match e {
                Event::Honest(uptime) => rep.record_contribution(uptime, true),
                Event::Cheat => rep.record_contribution(0, false),
                Event::InvalidAuth => rep.record_invalid_auth(),
            }
            prop_assert!(rep.score >= MIN_SCORE && rep.score <= MAX_SCORE, "score {}", rep.score);
        }
    }

    /// Counters match the number of events on each channel.
    #[test]
    fn counters_track_events(events in prop::collection::vec(event(), 0..100)) {
        let mut rep = Reputation::new();
        let mut cheats = 0u64;
        let mut auths = 0u64;
        for e in events {
            match e {
                Event::Honest(uptime) => rep.record_contribution(uptime, true),
                Event::Cheat => { cheats += 1; rep.record_contribution(0, false) }
                Event::InvalidAuth => { auths += 1; rep.record_invalid_auth() }
            }
        }
        prop_assert_eq!(rep.cheat_attempts, cheats);
        prop_assert_eq!(rep.invalid_auth_attempts, auths);
    }

    /// An honest report never lowers the score; a cheat never raises it.
    #[test]
    fn updates_are_monotone(start in 0u32..50, uptime in any::<u64>()) {
        let mut rep = Reputation::new();
        for _ in 0..start {
            rep.record_contribution(0, false);
        }
        let before = rep.score;
        let mut honest = rep.clone();
        honest.record_contribution(uptime, true);
        prop_assert!(honest.score >= before);
        rep.record_contribution(uptime, false);
        prop_assert!(rep.score <= before);
    }
}
