//! Integration tests for the reveal screen choreography.
//!
//! These verify the forward timeline, the chevron/detail round trip, and
//! that unmounting leaves nothing behind.

use glassmotion_core::{
    simulate, Config, Event, Input, RevealState, RevealTransition, Script,
};
use proptest::prelude::*;

fn reveal_transitions(frames: &[glassmotion_core::Stamped]) -> Vec<(u64, RevealTransition, RevealState)> {
    frames
        .iter()
        .filter_map(|f| match f.event {
            Event::Reveal { transition, state } => Some((f.at_ms, transition, state)),
            _ => None,
        })
        .collect()
}

const SETTLED: RevealState = RevealState {
    card_visible: false,
    sticky_visible: true,
    detail_open: false,
};

#[test]
fn test_forward_timeline_from_mount() {
    let report = simulate(&Script::default().until(5_000), &Config::default());
    let timeline = reveal_transitions(&report.frames);

    assert_eq!(
        timeline,
        vec![
            (
                0,
                RevealTransition::Mounted,
                RevealState {
                    card_visible: true,
                    sticky_visible: false,
                    detail_open: false,
                }
            ),
            (2_000, RevealTransition::AutoDismiss, RevealState::default()),
            (2_280, RevealTransition::AutoReveal, SETTLED),
        ]
    );
    assert_eq!(report.pending_at_end, 1, "only the background clock keeps running");
}

#[test]
fn test_chevron_round_trip() {
    let script = Script::default()
        .step(3_000, Input::ChevronTap)
        .step(4_000, Input::DetailClosed)
        .until(6_000);
    let report = simulate(&script, &Config::default());
    let timeline = reveal_transitions(&report.frames);

    let tail: Vec<_> = timeline[3..].to_vec();
    assert_eq!(
        tail,
        vec![
            (3_000, RevealTransition::ChevronTap, RevealState::default()),
            (
                3_120,
                RevealTransition::OpenDetail,
                RevealState {
                    card_visible: false,
                    sticky_visible: false,
                    detail_open: true,
                }
            ),
            (4_000, RevealTransition::DetailClosed, SETTLED),
        ]
    );
}

#[test]
fn test_chevron_before_banner_is_ignored() {
    let script = Script::default()
        .step(1_000, Input::ChevronTap)
        .step(2_100, Input::ChevronTap)
        .step(2_200, Input::DetailClosed)
        .until(5_000);
    let report = simulate(&script, &Config::default());
    let timeline = reveal_transitions(&report.frames);

    assert_eq!(timeline.len(), 3);
    assert!(timeline.iter().all(|(_, _, s)| !s.detail_open));
}

#[test]
fn test_close_before_detail_opens_is_ignored() {
    let script = Script::default()
        .step(3_000, Input::ChevronTap)
        .step(3_050, Input::DetailClosed)
        .until(4_000);
    let report = simulate(&script, &Config::default());
    let last = reveal_transitions(&report.frames).pop().unwrap();
    assert_eq!(last.1, RevealTransition::OpenDetail);
    assert!(last.2.detail_open);
}

#[test]
fn test_unmount_mid_handoff() {
    let script = Script::default().unmount_at(2_100).until(10_000);
    let report = simulate(&script, &Config::default());

    assert_eq!(report.cancelled, 2, "auto-reveal and background were pending");
    assert_eq!(report.frames_after_unmount().count(), 0);
    assert_eq!(report.pending_at_end, 0);
}

#[test]
fn test_invariants_hold_on_every_frame() {
    let report = simulate(&Script::demo(), &Config::default());
    for (_, _, state) in reveal_transitions(&report.frames) {
        assert!(state.is_consistent(), "{state:?}");
    }
}

proptest! {
    /// Unmounting anywhere in the forward timeline stops all mutation.
    #[test]
    fn prop_unmount_stops_reveal(unmount in 0u64..=2_280) {
        let script = Script::default().unmount_at(unmount).until(10_000);
        let report = simulate(&script, &Config::default());

        prop_assert_eq!(report.frames_after_unmount().count(), 0);
        prop_assert_eq!(report.pending_at_end, 0);
        // The background clock is always running.
        let expected_cancelled = if unmount < 2_280 { 2 } else { 1 };
        prop_assert_eq!(report.cancelled, expected_cancelled);
    }

    /// Every chevron/close round trip lands back on the settled state.
    #[test]
    fn prop_round_trips_are_idempotent(cycles in 1usize..12, gap in 130u64..600) {
        let mut script = Script::default();
        let mut at = 3_000;
        for _ in 0..cycles {
            script = script.step(at, Input::ChevronTap).step(at + gap, Input::DetailClosed);
            at += gap * 2;
        }
        let report = simulate(&script.until(at + 1_000), &Config::default());
        let timeline = reveal_transitions(&report.frames);

        prop_assert_eq!(timeline.len(), 3 + cycles * 3);
        let closes: Vec<RevealState> = timeline
            .iter()
            .filter(|(_, t, _)| *t == RevealTransition::DetailClosed)
            .map(|(_, _, s)| *s)
            .collect();
        prop_assert_eq!(closes.len(), cycles);
        prop_assert!(closes.iter().all(|s| *s == SETTLED));
    }
}
