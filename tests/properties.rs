//! Property tests for the throttle policy and the run pipeline.

use grid_guard::config::ScenarioConfig;
use grid_guard::error::SimError;
use grid_guard::sim::{ThrottleController, ThrottleStrategy, run_scenario};
use proptest::prelude::*;

fn strategy() -> impl Strategy<Value = ThrottleStrategy> {
    prop_oneof![
        Just(ThrottleStrategy::Linear),
        Just(ThrottleStrategy::SmoothDecay)
    ]
}

proptest! {
    #[test]
    fn prop_shed_is_bounded_and_consistent(
        cap in 3000.0..=5000.0f64,
        aggressiveness in 0.0..=1.0f64,
        strategy in strategy(),
        attempted in proptest::collection::vec(0.0..12000.0f64, 1..200)
    ) {
        let controller = ThrottleController::new(cap, aggressiveness, strategy, 1.0);
        let outcome = controller.apply(&attempted).unwrap();

        prop_assert_eq!(outcome.shed.len(), attempted.len());
        for (t, &a) in attempted.iter().enumerate() {
            let shed = outcome.shed[t];
            prop_assert!(shed >= 0.0, "negative shed {} at {}", shed, t);
            prop_assert!(outcome.throttled[t] <= a);
            prop_assert_eq!(outcome.throttled[t], a - shed);
        }

        let any_shed = outcome.shed.iter().any(|&s| s > 0.0);
        prop_assert_eq!(outcome.kill_switch.is_throttled(), any_shed);
        prop_assert_eq!(
            outcome.kill_switch_step,
            outcome.shed.iter().position(|&s| s > 0.0)
        );
    }

    #[test]
    fn prop_linear_never_sheds_below_capacity(
        cap in 3000.0..=5000.0f64,
        aggressiveness in 0.0..=1.0f64,
        attempted in proptest::collection::vec(0.0..12000.0f64, 1..200)
    ) {
        let controller = ThrottleController::new(cap, aggressiveness, ThrottleStrategy::Linear, 1.0);
        let outcome = controller.apply(&attempted).unwrap();

        for (t, &a) in attempted.iter().enumerate() {
            if a <= cap {
                prop_assert_eq!(outcome.shed[t], 0.0);
            } else {
                // throttling never pushes load under the ceiling
                prop_assert!(outcome.throttled[t] >= cap - 1e-6);
            }
        }
    }

    #[test]
    fn prop_full_aggressiveness_clamps_exactly(
        cap in 3000.0..=5000.0f64,
        factors in proptest::collection::vec(1.0..=2.0f64, 1..100)
    ) {
        let attempted: Vec<f64> = factors.iter().map(|f| cap * f).collect();
        let controller = ThrottleController::new(cap, 1.0, ThrottleStrategy::Linear, 1.0);
        let outcome = controller.apply(&attempted).unwrap();

        for (t, &a) in attempted.iter().enumerate() {
            if a > cap {
                prop_assert_eq!(outcome.throttled[t], cap);
            }
        }
    }

    #[test]
    fn prop_seeded_runs_are_reproducible(seed in any::<u64>(), aggressiveness in 0.0..=1.0f64) {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.seed = Some(seed);
        cfg.policy.aggressiveness = aggressiveness;
        let a = run_scenario(cfg.clone()).unwrap();
        let b = run_scenario(cfg).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_out_of_range_capacity_is_rejected(cap in prop_oneof![0.0..2999.0f64, 5001.0..1e6f64]) {
        let mut cfg = ScenarioConfig::baseline();
        cfg.grid.max_capacity_mw = cap;
        match run_scenario(cfg) {
            Err(SimError::Config(e)) => prop_assert_eq!(e.field, "grid.max_capacity_mw"),
            other => prop_assert!(false, "expected config error, got {:?}", other),
        }
    }
}
