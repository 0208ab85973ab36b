//! Integration tests for the progress button run.
//!
//! These drive the full stage on virtual time and check the label sequence
//! the render surface sees.

use glassmotion_core::{
    simulate, Config, Event, Input, Phase, ProgressTransition, Script, Stamped,
};
use proptest::prelude::*;

fn progress_frames(frames: &[Stamped]) -> Vec<(u64, ProgressTransition, String, bool)> {
    frames
        .iter()
        .filter_map(|f| match &f.event {
            Event::Progress {
                transition,
                label,
                active,
                ..
            } => Some((f.at_ms, *transition, label.clone(), *active)),
            _ => None,
        })
        .collect()
}

fn expected_labels() -> Vec<String> {
    let mut labels = vec!["1".to_string(), "1".to_string()];
    labels.extend((1..=100).map(|n| format!("{n:02}")));
    labels.push("Yayyyyyy!!!".into());
    labels.push("Once Again?".into());
    labels
}

#[test]
fn test_counting_to_completion() {
    let script = Script::default().step(0, Input::Activate).until(13_000);
    let report = simulate(&script, &Config::default());
    let frames = progress_frames(&report.frames);

    let labels: Vec<String> = frames.iter().map(|(_, _, l, _)| l.clone()).collect();
    assert_eq!(labels, expected_labels());

    // Ticks land on a fixed 100 ms cadence.
    let ticks: Vec<u64> = frames
        .iter()
        .filter(|(_, t, _, _)| matches!(t, ProgressTransition::Ticked | ProgressTransition::Finished))
        .map(|(at, _, _, _)| *at)
        .collect();
    assert_eq!(ticks.len(), 100);
    for (i, at) in ticks.iter().enumerate() {
        assert_eq!(*at, (i as u64 + 1) * 100);
    }

    let (celebrated_at, _, _, still_active) = &frames[frames.len() - 2];
    assert_eq!(*celebrated_at, 11_000);
    assert!(*still_active);

    let (prompted_at, transition, _, active) = frames.last().unwrap();
    assert_eq!(*prompted_at, 12_000);
    assert_eq!(*transition, ProgressTransition::Prompted);
    assert!(!active);
    assert_eq!(report.pending_at_end, 1, "only the background clock keeps running");
}

#[test]
fn test_labels_are_zero_padded_to_two_digits() {
    let script = Script::default().step(0, Input::Activate).until(950);
    let report = simulate(&script, &Config::default());
    let labels: Vec<String> = progress_frames(&report.frames)
        .into_iter()
        .skip(2)
        .map(|(_, _, l, _)| l)
        .collect();
    assert_eq!(labels, ["01", "02", "03", "04", "05", "06", "07", "08", "09"]);
}

#[test]
fn test_second_run_after_prompt() {
    let script = Script::default()
        .step(0, Input::Activate)
        .step(12_500, Input::Activate)
        .until(12_800);
    let report = simulate(&script, &Config::default());
    let frames = progress_frames(&report.frames);

    let restarted = frames
        .iter()
        .filter(|(_, t, _, _)| *t == ProgressTransition::Started)
        .count();
    assert_eq!(restarted, 2);
    let last = frames.last().unwrap();
    assert_eq!(last.2, "03");
    assert!(last.3);
}

#[test]
fn test_custom_timings_from_config() {
    let mut config = Config::default();
    config.progress.target = 5;
    config.progress.tick_interval_ms = 20;
    config.progress.celebrate_delay_ms = 300;
    config.progress.prompt_delay_ms = 200;

    let report = simulate(&Script::default().step(0, Input::Activate), &config);
    let frames = progress_frames(&report.frames);
    let tail: Vec<(u64, String)> = frames
        .iter()
        .rev()
        .take(3)
        .rev()
        .map(|(at, _, l, _)| (*at, l.clone()))
        .collect();
    assert_eq!(
        tail,
        vec![
            (100, "05".to_string()),
            (400, "Yayyyyyy!!!".to_string()),
            (600, "Once Again?".to_string()),
        ]
    );
}

#[test]
fn test_press_release_starts_run() {
    let script = Script::default()
        .step(0, Input::PointerDown)
        .step(80, Input::PointerUp)
        .until(280);
    let report = simulate(&script, &Config::default());

    let press: Vec<bool> = report
        .frames
        .iter()
        .filter_map(|f| match f.event {
            Event::Press { pressed, .. } => Some(pressed),
            _ => None,
        })
        .collect();
    assert_eq!(press, vec![false, true, false]);

    let last = progress_frames(&report.frames).pop().unwrap();
    assert_eq!((last.0, last.2.as_str()), (280, "02"));
}

proptest! {
    /// Activation while a run is in flight never disturbs it.
    #[test]
    fn prop_reentrant_activation_is_ignored(extra in proptest::collection::vec(1u64..12_000, 1..20)) {
        let mut script = Script::default().step(0, Input::Activate).until(13_000);
        for at in &extra {
            script = script.step(*at, Input::Activate);
        }
        let report = simulate(&script, &Config::default());
        let frames = progress_frames(&report.frames);

        let labels: Vec<String> = frames.iter().map(|(_, _, l, _)| l.clone()).collect();
        prop_assert_eq!(labels, expected_labels());
        let started = frames.iter().filter(|(_, t, _, _)| *t == ProgressTransition::Started).count();
        prop_assert_eq!(started, 1);
    }

    /// The run ends on the prompt however the press is timed.
    #[test]
    fn prop_run_always_ends_inactive(down in 0u64..500, hold in 0u64..2_000) {
        let script = Script::default()
            .step(down, Input::PointerDown)
            .step(down + hold, Input::PointerUp)
            .until(down + hold + 12_000);
        let report = simulate(&script, &Config::default());
        match report.frames.iter().rev().find(|f| matches!(f.event, Event::Progress { .. })) {
            Some(Stamped { event: Event::Progress { phase, active, .. }, .. }) => {
                prop_assert_eq!(*phase, Phase::Prompt);
                prop_assert!(!*active);
            }
            other => prop_assert!(false, "no progress frame: {:?}", other),
        }
    }
}
