use proptest::prelude::*;

use super::{Phase, PhaseSequencer, TimerConfig};
use crate::events::Event;

fn run(config: TimerConfig) -> (PhaseSequencer, Vec<Event>, u64) {
    let mut seq = PhaseSequencer::new(config);
    let mut events = seq.start();
    let mut ticks = 0u64;
    while !seq.is_finished() {
        events.extend(seq.tick());
        ticks += 1;
    }
    (seq, events, ticks)
}

fn entered(events: &[Event], phase: Phase) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::PhaseChanged { to, .. } if *to == phase))
        .count()
}

proptest! {
    #[test]
    fn visits_every_round_once(
        prep in 0u32..20,
        exercise in 1u32..40,
        rest in 1u32..20,
        rounds in 1u32..12,
    ) {
        let (seq, events, _) = run(TimerConfig::new(prep, exercise, rest, rounds));
        prop_assert_eq!(entered(&events, Phase::Exercise), rounds as usize);
        prop_assert_eq!(entered(&events, Phase::Rest), rounds as usize - 1);
        prop_assert_eq!(entered(&events, Phase::Completed), 1);
        prop_assert_eq!(seq.phase(), Phase::Completed);
        prop_assert_eq!(seq.completed_rounds(), rounds);
    }

    #[test]
    fn tick_count_matches_total_duration(
        prep in 0u32..20,
        exercise in 1u32..40,
        rest in 0u32..20,
        rounds in 0u32..12,
    ) {
        let config = TimerConfig::new(prep, exercise, rest, rounds);
        let (seq, _, ticks) = run(config);
        prop_assert_eq!(ticks, config.total_duration());
        prop_assert_eq!(seq.elapsed(), config.total_duration());
    }

    #[test]
    fn round_never_decreases(
        prep in 0u32..5,
        exercise in 1u32..6,
        rest in 0u32..6,
        rounds in 1u32..10,
    ) {
        let mut seq = PhaseSequencer::new(TimerConfig::new(prep, exercise, rest, rounds));
        seq.start();
        let mut last = seq.state().current_round;
        while !seq.is_finished() {
            seq.tick();
            let now = seq.state().current_round;
            prop_assert!(now == last || now == last + 1);
            last = now;
        }
        prop_assert_eq!(last, rounds);
    }

    #[test]
    fn ticks_while_paused_change_nothing(
        config in (0u32..10, 1u32..10, 0u32..10, 1u32..5)
            .prop_map(|(p, e, r, n)| TimerConfig::new(p, e, r, n)),
        before in 0u64..20,
        paused_ticks in 1usize..50,
    ) {
        let mut seq = PhaseSequencer::new(config);
        seq.start();
        for _ in 0..before {
            seq.tick();
        }
        prop_assume!(!seq.is_finished());
        seq.pause();
        let frozen = *seq.state();
        let elapsed = seq.elapsed();
        for _ in 0..paused_ticks {
            prop_assert!(seq.tick().is_empty());
        }
        prop_assert_eq!(seq.state().time_remaining, frozen.time_remaining);
        prop_assert_eq!(seq.state().phase, frozen.phase);
        prop_assert_eq!(seq.elapsed(), elapsed);
    }
}
