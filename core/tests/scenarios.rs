//! End-to-end outcomes of the scenario presets.

use aiworld_core::{
    config::AutomationSpeed,
    engine::simulate,
    error::SimError,
    model::AiWorldModel,
    scenarios::{self, Scenario},
    timeseries::TimeSeries,
};

fn run(scenario: Scenario, horizon: f64) -> TimeSeries {
    simulate(AiWorldModel::new(scenario.config()), horizon, 1.0).expect("scenario run")
}

#[test]
fn laissez_faire_stability_collapses() {
    let series = run(Scenario::LaissezFaire, 200.0);
    let min = series.min_of(|r| r.stability).expect("records");
    assert!(min < 0.3, "expected collapse, min stability was {min}");
}

#[test]
fn laissez_faire_holds_base_tax() {
    let series = run(Scenario::LaissezFaire, 200.0);
    assert!(series.iter().all(|r| r.tax_rate == 0.20));
}

#[test]
fn nordic_sustains_stability() {
    let series = run(Scenario::Nordic, 200.0);
    let last = series.last().expect("records");
    assert!(last.stability > 0.3, "expected sustained stability, got {}", last.stability);
    let max_u = series.max_of(|r| r.unemployment_rate).expect("records");
    assert!(max_u < 1.0, "unemployment rate should stay below 100%, got {max_u}");
}

#[test]
fn singularity_collapses_society_and_environment() {
    let series = run(Scenario::Singularity, 100.0);
    let min_stability = series.min_of(|r| r.stability).expect("records");
    let min_env = series.min_of(|r| r.environment).expect("records");
    let max_tax = series.max_of(|r| r.tax_rate).expect("records");
    assert!(min_stability < 0.05, "expected stability collapse, min was {min_stability}");
    assert!(min_env < 0.1, "expected environmental collapse, min was {min_env}");
    assert!(max_tax >= 0.40, "expected elevated tax rate, max was {max_tax}");
}

#[test]
fn singularity_automation_accelerates() {
    let config = Scenario::Singularity.config();
    let AutomationSpeed::TimeCapitalFunction(f) = config.params.automation_speed else {
        panic!("singularity should use a function-valued automation speed");
    };
    assert_eq!(f(0.0, 100.0), 0.05);
    assert!(f(50.0, 100.0) > f(10.0, 100.0));
    assert_eq!(f(20.0, 1.0), scenarios::singularity_automation_speed(20.0, 500.0));
}

#[test]
fn green_transition_preserves_environment_and_resources() {
    let series = run(Scenario::GreenTransition, 150.0);
    let min_env = series.min_of(|r| r.environment).expect("records");
    let final_resources = series.last().expect("records").resources;
    assert!(min_env > 0.4, "expected sustained environment, min was {min_env:.3}");
    assert!(final_resources > 100.0, "expected resources to last, got {final_resources:.1}");
}

#[test]
fn extraction_exhausts_environment_and_resources() {
    let series = run(Scenario::Extraction, 100.0);
    let last = series.last().expect("records");
    assert!(last.environment < 0.3, "expected degraded environment, got {}", last.environment);
    assert!(last.resources < 200.0, "expected depletion, got {}", last.resources);
}

#[test]
fn every_preset_keeps_stocks_in_bounds() {
    for scenario in Scenario::ALL {
        let config = scenario.config();
        let initial_resources = config.initial.resources;
        let series = simulate(AiWorldModel::new(config), 100.0, 0.5).expect("run");
        for r in &series {
            assert!((0.0..=1.0).contains(&r.stability), "{scenario}: Stability {}", r.stability);
            assert!((0.0..=1.0).contains(&r.environment), "{scenario}: Environment {}", r.environment);
            assert!(
                (0.0..=initial_resources).contains(&r.resources),
                "{scenario}: Resources {}",
                r.resources
            );
            assert!(r.labor_u >= 0.0, "{scenario}: Labor_U {}", r.labor_u);
        }
    }
}

#[test]
fn names_round_trip_through_registry() {
    for scenario in Scenario::ALL {
        assert_eq!(scenario.name().parse::<Scenario>().expect("known name"), scenario);
        assert!(scenarios::lookup(scenario.name()).is_ok());
        assert!(!scenario.description().is_empty());
    }
}

#[test]
fn unknown_scenario_is_rejected() {
    let err = scenarios::lookup("utopia").unwrap_err();
    assert!(matches!(err, SimError::UnknownScenario { ref name } if name == "utopia"));
}

#[test]
fn presets_only_touch_what_they_name() {
    let nordic = Scenario::Nordic.config();
    assert_eq!(nordic.params.stability_threshold, 0.85);
    assert_eq!(nordic.params.retrain_throughput, 0.25);
    // Untouched coefficients keep their defaults.
    assert_eq!(nordic.params.churn_rate, 0.01);
    assert_eq!(nordic.initial.k_ai, 100.0);
}
