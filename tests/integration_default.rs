//! Integration tests for full simulation runs.

mod common;

use grid_guard::config::ScenarioConfig;
use grid_guard::error::{ConfigErrorKind, SimError};
use grid_guard::sim::{KillSwitch, ThrottleStrategy, run_scenario};

#[test]
fn surge_overshoot_sheds_fraction_of_excess() {
    // 4500 baseline + 600 surge at step 14 = 5100 attempted against 4800
    let cfg = common::seeded_config();
    let source = common::spike_baseline(&cfg, 3500.0, 14, 4500.0);
    let result = common::run_supplied(cfg, source);

    let step = result.steps()[14];
    assert_eq!(step.attempted, 5100.0);
    assert!((step.shed - 195.0).abs() < 1e-9, "shed={}", step.shed);
    assert!((step.throttled - 4905.0).abs() < 1e-9, "throttled={}", step.throttled);
    assert!(result.is_throttled());
    assert_eq!(result.kill_switch(), KillSwitch::Throttled);
    assert_eq!(result.kill_switch_step(), Some(14));

    for s in result.steps().iter().filter(|s| s.time != 14) {
        assert_eq!(s.shed, 0.0, "step {} should not shed", s.time);
    }
}

#[test]
fn demand_under_capacity_is_untouched() {
    let mut cfg = common::seeded_config();
    cfg.grid.max_capacity_mw = 5000.0;
    cfg.workload.ai_spike_mw = 100.0;
    let source = common::flat_baseline(&cfg, 3800.0);
    let result = common::run_supplied(cfg, source);

    assert!(!result.is_throttled());
    assert_eq!(result.kill_switch_step(), None);
    assert_eq!(result.metrics().shed_energy, 0.0);
    assert_eq!(result.metrics().stability_gain, 0.0);
    assert_eq!(result.metrics().cost_impact, 0.0);
    for s in result.steps() {
        assert!(s.attempted <= 4000.0);
        assert_eq!(s.throttled, s.attempted);
    }
}

#[test]
fn zero_aggressiveness_disables_policy() {
    for strategy in [ThrottleStrategy::Linear, ThrottleStrategy::SmoothDecay] {
        let mut cfg = common::seeded_config();
        cfg.grid.max_capacity_mw = 3000.0;
        cfg.policy.aggressiveness = 0.0;
        cfg.policy.strategy = strategy;
        let result = run_scenario(cfg).unwrap();

        assert!(!result.is_throttled(), "{strategy} should not throttle");
        for s in result.steps() {
            assert_eq!(s.shed, 0.0);
            assert_eq!(s.throttled, s.attempted);
        }
    }
}

#[test]
fn full_aggressiveness_clamps_to_capacity() {
    let mut cfg = common::seeded_config();
    cfg.policy.aggressiveness = 1.0;
    let source = common::flat_baseline(&cfg, 4900.0);
    let result = common::run_supplied(cfg, source);

    for s in result.steps() {
        assert!(s.attempted > 4800.0);
        assert_eq!(s.throttled, 4800.0, "step {} not clamped", s.time);
    }
    assert_eq!(result.metrics().peak_load, 4800.0);
}

#[test]
fn same_seed_reproduces_run() {
    let a = run_scenario(common::seeded_config()).unwrap();
    let b = run_scenario(common::seeded_config()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn different_seeds_change_baseline() {
    let a = run_scenario(common::seeded_config()).unwrap();
    let mut cfg = common::seeded_config();
    cfg.simulation.seed = Some(43);
    let b = run_scenario(cfg).unwrap();
    assert_ne!(a.steps()[0].baseline, b.steps()[0].baseline);
}

#[test]
fn unseeded_runs_are_not_reproducible() {
    let cfg = ScenarioConfig::baseline();
    assert_eq!(cfg.simulation.seed, None);
    let a = run_scenario(cfg.clone()).unwrap();
    let b = run_scenario(cfg).unwrap();

    let baseline = |r: &grid_guard::sim::SimulationResult| -> Vec<f64> {
        r.steps().iter().map(|s| s.baseline).collect()
    };
    assert_ne!(baseline(&a), baseline(&b));
}

#[test]
fn metrics_agree_with_steps() {
    let cfg = ScenarioConfig::heat_wave();
    let cost = cfg.economics.cost_per_mwh;
    let result = run_scenario(cfg).unwrap();
    let steps = result.steps();
    let dt = result.dt_hours();

    let peak = steps.iter().map(|s| s.throttled).fold(f64::MIN, f64::max);
    let shed: f64 = steps.iter().map(|s| s.shed).sum::<f64>() * dt;
    let m = result.metrics();

    assert_eq!(m.peak_load, peak);
    assert!((m.shed_energy - shed).abs() < 1e-6);
    assert!((m.cost_impact - shed * cost).abs() < 1e-3);
    assert!(m.stability_gain > 0.0);
}

#[test]
fn smooth_decay_keeps_shedding_after_overshoot() {
    // Overshoot only at step 14; linear stops shedding there, smooth decay rings on
    let mut cfg = common::seeded_config();
    cfg.policy.strategy = ThrottleStrategy::SmoothDecay;
    let source = common::spike_baseline(&cfg, 3500.0, 14, 4500.0);
    let result = common::run_supplied(cfg, source);

    let steps = result.steps();
    assert!((steps[14].shed - 195.0).abs() < 1e-9);
    let tail: Vec<f64> = steps[15..].iter().map(|s| s.shed).collect();
    assert!(tail.iter().any(|&shed| shed > 0.0), "no residual shed: {tail:?}");
    assert!(tail.iter().all(|&shed| shed < steps[14].shed));
    for s in &steps[..14] {
        assert_eq!(s.shed, 0.0);
    }
    for s in steps {
        assert!(s.shed >= 0.0);
        assert!(s.throttled <= s.attempted);
    }
}

#[test]
fn invalid_config_produces_no_result() {
    let mut cfg = common::seeded_config();
    cfg.workload.ai_spike_mw = 2000.0;
    match run_scenario(cfg) {
        Err(SimError::Config(e)) => {
            assert_eq!(e.kind, ConfigErrorKind::OutOfRange);
            assert_eq!(e.field, "workload.ai_spike_mw");
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn week_ahead_covers_seven_days() {
    let mut cfg = ScenarioConfig::week_ahead();
    cfg.simulation.seed = Some(7);
    let result = run_scenario(cfg).unwrap();
    assert_eq!(result.steps().len(), 168);

    // Surge repeats daily at hours 12..19
    for day in 0..7 {
        assert_eq!(result.steps()[day * 24 + 13].ai_load, 600.0);
        assert_eq!(result.steps()[day * 24 + 2].ai_load, 100.0);
    }
}
