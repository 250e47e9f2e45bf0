use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};

use process_atoms::event_log::{Event, EventLog, Trace};
use process_atoms::flow_graph::{FlowElement, FlowGraph, GatewayKind};
use process_atoms::petri_net::play_out::PlayOutOptions;
use process_atoms::{
    aggregate_atoms, check_atom_violations, conformance_checking, DeclareModel, LogMiner,
    ModelMiner, VariantLog,
};

/// A small claim-handling process: register, then either assess and pay, or
/// reject, behind an exclusive choice.
fn claim_model() -> FlowGraph {
    let mut flow = FlowGraph::new();
    flow.add_element(FlowElement::event("start", "Start Event"));
    flow.add_element(FlowElement::task("register", "Register Claim"));
    flow.add_element(FlowElement::gateway("split", "Gateway", GatewayKind::Exclusive));
    flow.add_element(FlowElement::task("assess", "Assess Claim"));
    flow.add_element(FlowElement::task("pay", "Pay Claim"));
    flow.add_element(FlowElement::task("reject", "Reject Claim"));
    flow.add_element(FlowElement::gateway("join", "Gateway", GatewayKind::Exclusive));
    flow.add_element(FlowElement::event("end", "End Event"));
    flow.add_flow("start", "register");
    flow.add_flow("register", "split");
    flow.add_flow("split", "assess");
    flow.add_flow("split", "reject");
    flow.add_flow("assess", "pay");
    flow.add_flow("pay", "join");
    flow.add_flow("reject", "join");
    flow.add_flow("join", "end");
    flow
}

/// An observed log: mostly conforming cases plus one where payment happens
/// without an assessment.
fn observed_log() -> EventLog {
    let mut log = EventLog::new();
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("c1", vec!["Register Claim", "Assess Claim", "Pay Claim"]),
        ("c2", vec!["Register Claim", "Assess Claim", "Pay Claim"]),
        ("c3", vec!["Register Claim", "Reject Claim"]),
        ("c4", vec!["Register Claim", "Pay Claim"]),
    ];
    for (case_id, activities) in cases {
        let mut trace = Trace::new(case_id.to_string());
        let mut timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        for activity in activities {
            trace
                .events
                .push(Event::new_with_time(activity.to_string(), timestamp));
            timestamp += Duration::minutes(30);
        }
        log.traces.push(trace);
    }
    log
}

fn main() {
    let flow = claim_model();

    // Compile the model into atoms via Petri net play-out
    let now = Instant::now();
    let miner = ModelMiner::new("claim-handling", &flow);
    let model_atoms = miner.mine_with_petri(None, &PlayOutOptions::default());
    println!(
        "Mined {} atoms from the model in {:#?}",
        model_atoms.len(),
        now.elapsed()
    );
    for atom in &model_atoms {
        println!("  {}", atom.atom_str);
    }

    // Mine atoms from the observed log
    let log = observed_log();
    let variants = VariantLog::from(&log);
    let now = Instant::now();
    let log_atoms = LogMiner::new("claim-handling", &variants)
        .mine(&Default::default())
        .unwrap();
    let log_atoms = aggregate_atoms(log_atoms);
    println!(
        "Mined {} atoms from {} cases ({} variants) in {:#?}",
        log_atoms.len(),
        variants.total_cases,
        variants.variants.len(),
        now.elapsed()
    );

    // Check the model atoms against the log
    let now = Instant::now();
    let violations = check_atom_violations("claim-handling", &variants, &model_atoms, true);
    println!("Checked atoms against the log in {:#?}", now.elapsed());
    for violation in violations.iter().filter(|v| v.frequency > 0) {
        println!(
            "  violated by {} case(s): {}",
            violation.frequency, violation.atom.atom_str
        );
    }

    // The same check through the general evaluator
    let constraints = model_atoms
        .iter()
        .map(|atom| {
            process_atoms::Constraint::new(atom.atom_type, atom.operands.clone())
                .with_cardinality(atom.cardinality.max(1))
        })
        .collect();
    let report = conformance_checking(&variants, &DeclareModel::new(constraints), true).unwrap();
    let violating_cases = report
        .violations_by_case
        .iter()
        .filter(|(_, violated)| !violated.is_empty())
        .count();
    println!("{violating_cases} case(s) violate at least one model atom");

    println!(
        "\nAtoms as JSON:\n{}",
        serde_json::to_string_pretty(&model_atoms).unwrap()
    );
}
