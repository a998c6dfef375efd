use aiworld_core::{
    config::ModelConfig,
    engine::simulate,
    model::AiWorldModel,
    scenarios::Scenario,
    sensitivity::{lhs_sample, oat_sweep, DEFAULT_LHS_RANGES},
    store::SimStore,
};

fn store() -> SimStore {
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn close(a: f64, b: f64) -> bool {
    (a == b) || (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn migration_is_repeatable() {
    let store = store();
    store.migrate().expect("second migration");
}

#[test]
fn run_and_records_round_trip() {
    let store = store();
    let config = Scenario::Nordic.config();
    let series = simulate(AiWorldModel::new(config.clone()), 20.0, 0.5).expect("run");

    store
        .insert_run("run-nordic", "nordic", 20.0, 0.5, &config, "2026-01-01T00:00:00Z")
        .expect("insert run");
    store.append_records("run-nordic", &series).expect("append records");

    assert_eq!(store.record_count("run-nordic").expect("count"), 40);
    assert_eq!(store.records_for_run("run-nordic").expect("read back"), series);
    assert_eq!(
        store.run_info("run-nordic").expect("run info"),
        Some(("nordic".to_string(), 20.0, 0.5))
    );
    assert_eq!(store.run_info("run-missing").expect("run info"), None);
}

#[test]
fn function_valued_config_still_stores() {
    let store = store();
    let config = Scenario::Singularity.config();
    store
        .insert_run("run-sing", "singularity", 10.0, 1.0, &config, "2026-01-01T00:00:00Z")
        .expect("insert run");
}

#[test]
fn records_require_a_registered_run() {
    let store = store();
    let series = simulate(AiWorldModel::default(), 3.0, 1.0).expect("run");
    assert!(store.append_records("nobody", &series).is_err());
    assert_eq!(store.record_count("nobody").expect("count"), 0);
}

#[test]
fn sensitivity_records_round_trip() {
    let store = store();
    let base = ModelConfig::default();
    store
        .insert_run("run-sens", "custom", 10.0, 1.0, &base, "2026-01-01T00:00:00Z")
        .expect("insert run");

    let oat = oat_sweep(&base, "churn_rate", &[0.0, 0.02], 10.0, 1.0).expect("sweep");
    let lhs = lhs_sample(&base, &DEFAULT_LHS_RANGES[..2], 4, 10.0, 1.0, 42).expect("lhs");
    store.append_oat("run-sens", &oat).expect("append oat");
    store.append_lhs("run-sens", &lhs).expect("append lhs");

    let oat_back = store.oat_records_for_run("run-sens").expect("read oat");
    assert_eq!(oat_back.len(), oat.len());
    for (a, b) in oat.iter().zip(&oat_back) {
        assert_eq!(a.param, b.param);
        assert!(close(a.value, b.value));
        assert!(close(a.metrics.final_stability, b.metrics.final_stability));
        assert_eq!(
            a.metrics.stability_collapse_year.is_infinite(),
            b.metrics.stability_collapse_year.is_infinite()
        );
    }

    let lhs_back = store.lhs_records_for_run("run-sens").expect("read lhs");
    assert_eq!(lhs_back.len(), 4);
    for (a, b) in lhs.iter().zip(&lhs_back) {
        assert_eq!(a.sample_id, b.sample_id);
        for ((name_a, va), (name_b, vb)) in a.params.iter().zip(&b.params) {
            assert_eq!(name_a, name_b);
            assert!(close(*va, *vb), "{name_a}: {va} vs {vb}");
        }
        assert!(close(a.metrics.final_k_ai, b.metrics.final_k_ai));
    }
}
