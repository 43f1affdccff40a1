//! Property-based tests for navigation, gestures and volume
//!
//! Uses proptest to verify invariants across many random inputs.

use encore_playback::{
    GestureConfig, GestureEnd, GestureRecognizer, MemoryVolumeStore, TouchRegion,
    TrackNavigator, Volume, VolumePersistence,
};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
    Select(usize),
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Next),
        Just(Step::Previous),
        (0usize..64).prop_map(Step::Select),
    ]
}

fn navigator_at(len: usize, start: usize) -> TrackNavigator {
    let mut navigator = TrackNavigator::new(len);
    navigator.select(start, false);
    navigator
}

fn mobile_recognizer() -> GestureRecognizer {
    let mut recognizer = GestureRecognizer::new(GestureConfig::default());
    recognizer.set_viewport_width(390.0);
    recognizer
}

/// Drive a recognizer through a straight drag sampled every 20 ms
fn drag(recognizer: &mut GestureRecognizer, dx: f64, dy: f64, samples: u32) -> GestureEnd {
    assert!(recognizer.begin(TouchRegion::Handle, 200.0, 100.0));
    for i in 1..=samples {
        let t = f64::from(i) / f64::from(samples);
        recognizer.update(
            200.0 + dx * t,
            100.0 + dy * t,
            Duration::from_millis(u64::from(i) * 20),
        );
    }
    recognizer.end()
}

proptest! {
    /// Property: N Nexts on an N-track playlist return to the start
    #[test]
    fn next_is_circular(len in 2usize..40, start_seed in 0usize..1000) {
        let start = start_seed % len;
        let mut navigator = navigator_at(len, start);

        for _ in 0..len {
            prop_assert!(navigator.next(true).is_some());
        }
        prop_assert_eq!(navigator.current(), Some(start));
    }

    /// Property: Previous undoes Next from any index
    #[test]
    fn previous_inverts_next(len in 2usize..40, start_seed in 0usize..1000) {
        let start = start_seed % len;
        let mut navigator = navigator_at(len, start);

        let forward = navigator.next(false).unwrap();
        let back = navigator.previous(false).unwrap();
        prop_assert_eq!(forward.from, start);
        prop_assert_eq!(back.to, start);
        prop_assert_eq!(navigator.current(), Some(start));
    }

    /// Property: the index stays in range whatever the navigation sequence
    #[test]
    fn index_stays_in_range(
        len in 1usize..20,
        steps in prop::collection::vec(arbitrary_step(), 0..100)
    ) {
        let mut navigator = TrackNavigator::new(len);
        for step in steps {
            let before = navigator.current();
            let transition = match step {
                Step::Next => navigator.next(true),
                Step::Previous => navigator.previous(true),
                Step::Select(i) => navigator.select(i, true),
            };
            let current = navigator.current().unwrap();
            prop_assert!(current < len);
            match transition {
                Some(t) => {
                    prop_assert_eq!(t.to, current);
                    prop_assert!(navigator.should_resume());
                }
                None => prop_assert_eq!(navigator.current(), before),
            }
        }
    }

    /// Property: navigation captures the playing flag into the resume flag
    #[test]
    fn resume_flag_follows_playing(len in 2usize..20, playing in any::<bool>()) {
        let mut navigator = TrackNavigator::new(len);
        let transition = navigator.next(playing).unwrap();
        prop_assert_eq!(transition.resume, playing);
        prop_assert_eq!(navigator.should_resume(), playing);
    }

    /// Property: a predominantly downward drag past the threshold closes
    /// exactly once
    #[test]
    fn long_drag_closes_once(dy in 101.0f64..600.0, drift in -1.0f64..1.0, samples in 1u32..12) {
        let mut recognizer = mobile_recognizer();
        let dx = drift * dy * 0.5;

        prop_assert_eq!(drag(&mut recognizer, dx, dy, samples), GestureEnd::Close);
        prop_assert_eq!(recognizer.end(), GestureEnd::Inactive);
        prop_assert_eq!(recognizer.offset(), 0.0);
    }

    /// Property: a short drag never closes and the panel returns to rest
    #[test]
    fn short_drag_snaps_back(dy in -300.0f64..=100.0, dx in -300.0f64..300.0, samples in 1u32..12) {
        let mut recognizer = mobile_recognizer();

        prop_assert_eq!(drag(&mut recognizer, dx, dy, samples), GestureEnd::SnapBack);
        let visual = recognizer.visual();
        prop_assert_eq!(visual.translate_y, None);
        prop_assert_eq!(visual.opacity, 1.0);
    }

    /// Property: drag opacity never drops below the floor
    #[test]
    fn opacity_is_bounded(dy in 1.0f64..2000.0) {
        let mut recognizer = mobile_recognizer();
        recognizer.begin(TouchRegion::Handle, 0.0, 0.0);
        recognizer.update(0.0, dy, Duration::from_millis(20));

        let opacity = recognizer.visual().opacity;
        prop_assert!((0.5..=1.0).contains(&opacity), "opacity {}", opacity);
    }

    /// Property: any input yields a volume in [0, 1]
    #[test]
    fn volume_is_clamped(raw in any::<f64>()) {
        let volume = Volume::new(raw);
        prop_assert!((0.0..=1.0).contains(&volume.fraction()));
        prop_assert!((0.0..=100.0).contains(&volume.as_percent()));
    }

    /// Property: the persisted value is always the last one set
    #[test]
    fn persistence_keeps_last_value(values in prop::collection::vec(0.0f64..=1.0, 1..20)) {
        let store = MemoryVolumeStore::new();
        let mut persistence =
            VolumePersistence::new(Box::new(store), "volume", Duration::from_secs(60));
        for value in &values {
            persistence.set(Volume::new(*value));
        }

        let last = Volume::new(*values.last().unwrap());
        prop_assert_eq!(persistence.current(), last);
        prop_assert_eq!(persistence.load(), last);
    }
}
