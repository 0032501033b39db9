use crate::error::KernelError;
use crate::proc::ProcessId;
use crate::sim::{EventKind, KernelConfig, Scenario, SimTime, SimulationDriver};
use std::sync::{Arc, Mutex};

#[test]
fn scenario_parses_minimal_json_with_defaults() {
    let raw = r#"
    {
        "schema_version": 1,
        "entities": [ { "name": "cell" } ]
    }
    "#;
    let sc = Scenario::from_json(raw).expect("parse scenario");
    assert_eq!(sc.schema_version, 1);
    assert!(sc.config.is_none());
    assert_eq!(sc.entities.len(), 1);
    assert!(sc.entities[0].genes.is_empty());
    assert!(sc.events.is_empty());

    let attrs = sc.entities[0].attributes();
    assert_eq!(attrs.priority, 5);
    assert_eq!(attrs.vitality, 100.0);
}

#[test]
fn scenario_parses_config_genes_proteins_and_events() {
    let raw = r#"
    {
        "schema_version": 1,
        "config": { "time_step": 0.5, "total_capacity": 300.0 },
        "entities": [
            {
                "name": "a",
                "priority": 1,
                "vitality": 2.0,
                "metabolic_rate": 1.0,
                "genes": [ { "name": "G", "sequence": "ATCG", "express": 2.0 } ],
                "proteins": [ { "name": "P", "origin_gene": "G", "concentration": 4.0 } ]
            }
        ],
        "events": [ { "at": 1.5, "kind": "gene_expression", "source": 0 } ]
    }
    "#;
    let sc = Scenario::from_json(raw).expect("parse scenario");
    let cfg = sc.config.clone().expect("config");
    assert_eq!(cfg.time_step, 0.5);
    assert_eq!(cfg.total_capacity, 300.0);
    assert_eq!(cfg.entity_cost, KernelConfig::default().entity_cost);
    assert_eq!(cfg.progress_every, 100);

    let e = &sc.entities[0];
    assert_eq!(e.priority, Some(1));
    assert_eq!(e.genes[0].express, Some(2.0));
    assert_eq!(e.proteins[0].half_life, 10.0);
    assert_eq!(sc.events[0].kind, EventKind::GeneExpression);
}

#[test]
fn scenario_apply_creates_entities_and_schedules_events() {
    let raw = r#"
    {
        "schema_version": 1,
        "config": { "time_step": 0.5, "total_capacity": 300.0 },
        "entities": [
            { "name": "a", "vitality": 1.0 },
            { "name": "b", "vitality": 1.0 }
        ],
        "events": [ { "at": 1.0, "kind": "mutation", "source": 1 } ]
    }
    "#;
    let sc = Scenario::from_json(raw).expect("parse scenario");
    let mut d = SimulationDriver::new(sc.config.clone().unwrap_or_default()).expect("driver");
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        d.on(EventKind::Mutation, move |e| {
            seen.lock().expect("seen lock").push(e.source);
            Ok(())
        });
    }

    let ids = sc.apply(&mut d).expect("apply");
    assert_eq!(ids, vec![Some(ProcessId(0)), Some(ProcessId(1))]);
    assert_eq!(d.pool().free(), 100.0);

    // 每秒 0.5 的代谢，活力 1.0 在 2 秒时耗尽
    let report = d.advance(SimTime::from_secs(2));
    assert_eq!(&*seen.lock().expect("seen lock"), &[ProcessId(1)]);
    assert_eq!(report.live, 0);
    assert_eq!(d.pool().free(), 300.0);
}

#[test]
fn scenario_apply_skips_entities_denied_admission() {
    let sc = Scenario::from_json(
        r#"{ "schema_version": 1, "entities": [ { "name": "a" }, { "name": "b" } ] }"#,
    )
    .expect("parse scenario");
    let mut d = SimulationDriver::new(KernelConfig::new(0.1, 150.0)).expect("driver");
    let ids = sc.apply(&mut d).expect("apply");
    assert_eq!(ids, vec![Some(ProcessId(0)), None]);
    assert_eq!(d.created_count(), 1);
}

#[test]
fn scenario_event_with_unknown_source_is_an_error() {
    let sc = Scenario::from_json(
        r#"{ "schema_version": 1, "events": [ { "at": 0.0, "kind": "mutation", "source": 3 } ] }"#,
    )
    .expect("parse scenario");
    let mut d = SimulationDriver::new(KernelConfig::default()).expect("driver");
    assert!(matches!(sc.apply(&mut d), Err(KernelError::Scenario(_))));
}

#[test]
fn malformed_scenario_is_reported() {
    let err = Scenario::from_json("{ not json").expect_err("should fail");
    assert!(matches!(err, KernelError::Scenario(_)));
    let err = Scenario::from_json(r#"{ "schema_version": 1, "events": [ { "at": 0.0, "kind": "teleport", "source": 0 } ] }"#)
        .expect_err("unknown kind");
    assert!(matches!(err, KernelError::Scenario(_)));
}

#[test]
fn demo_scenario_has_two_organisms_with_two_genes_each() {
    let sc = Scenario::demo();
    assert_eq!(sc.entities.len(), 2);
    assert!(sc.entities.iter().all(|e| e.genes.len() == 2));

    let mut d = SimulationDriver::new(KernelConfig::default()).expect("driver");
    sc.apply(&mut d).expect("apply");
    let report = d.advance(SimTime::from_secs(10));
    assert_eq!(report.ticks, 100);
    assert_eq!(report.created, 2);
    assert_eq!(report.live, 2);
    assert!((report.usage_fraction - 0.02).abs() < 1e-12);
}

#[test]
fn scenario_rejects_non_positive_protein_half_life_before_admitting() {
    for half_life in ["0.0", "-2.5"] {
        let raw = format!(
            r#"{{
                "schema_version": 1,
                "entities": [
                    {{ "name": "ok" }},
                    {{ "name": "bad", "proteins": [ {{ "name": "P", "origin_gene": "G", "concentration": 1.0, "half_life": {half_life} }} ] }}
                ]
            }}"#
        );
        let sc = Scenario::from_json(&raw).expect("parse scenario");
        let mut d = SimulationDriver::new(KernelConfig::default()).expect("driver");

        let err = sc.apply(&mut d).expect_err("half_life must be rejected");
        match err {
            KernelError::Scenario(msg) => assert!(msg.contains("half_life"), "{msg}"),
            other => panic!("expected Scenario error, got {other:?}"),
        }
        assert_eq!(d.created_count(), 0);
    }
}
