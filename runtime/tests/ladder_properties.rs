//! Property tests for ladder ordering.

#![allow(clippy::unwrap_used)]

use checkin_camera_runtime::{CameraStartNegotiator, NegotiateParams, NegotiatorConfig};
use checkin_camera_testing::properties::{arb_constraint_bases, arb_ladder};
use checkin_camera_testing::{MockScanner, RecordingObserver, fixtures};
use proptest::prelude::*;

proptest! {
    /// Whatever call succeeds, the calls before it walk bases × presets in
    /// row-major order and nothing is called after it.
    #[test]
    fn prop_attempts_follow_row_major_order(
        bases in arb_constraint_bases(4),
        presets in arb_ladder(6),
        pick in any::<prop::sample::Index>(),
    ) {
        let total = bases.len() * presets.len();
        let success_call = pick.index(total) + 1;
        let scanner = MockScanner::rejecting("busy").succeed_on_call(success_call);
        let observer = RecordingObserver::new();
        let negotiator = CameraStartNegotiator::with_observer(NegotiatorConfig::default(), observer.clone());

        let result = tokio_test::block_on(negotiator.negotiate(
            &scanner,
            NegotiateParams::new(bases.clone(), fixtures::discard_decoded()).presets(presets.clone()),
        ))
        .unwrap();

        let expected: Vec<(usize, String)> = (0..bases.len())
            .flat_map(|b| presets.iter().map(move |p| (b, p.label.clone())))
            .take(success_call)
            .collect();
        prop_assert_eq!(observer.attempt_order(), expected);
        prop_assert_eq!(scanner.call_count(), success_call);
        prop_assert_eq!(result.base_index, (success_call - 1) / presets.len());
        prop_assert_eq!(result.preset_index, (success_call - 1) % presets.len());
        prop_assert_eq!(result.attempts.len(), success_call - 1);
    }

    /// When nothing starts, every combination is tried exactly once.
    #[test]
    fn prop_exhaustion_tries_every_combination(
        bases in arb_constraint_bases(3),
        presets in arb_ladder(6),
    ) {
        let scanner = MockScanner::rejecting("busy");
        let negotiator = CameraStartNegotiator::with_observer(
            NegotiatorConfig::default(),
            checkin_camera_runtime::NoopObserver,
        );

        let err = tokio_test::block_on(negotiator.negotiate(
            &scanner,
            NegotiateParams::new(bases.clone(), fixtures::discard_decoded()).presets(presets.clone()),
        ))
        .unwrap_err();

        prop_assert_eq!(scanner.call_count(), bases.len() * presets.len());
        prop_assert_eq!(err.attempts().len(), bases.len() * presets.len());
    }
}
