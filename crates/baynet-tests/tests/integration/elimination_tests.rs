use baynet_core::engine::query::ProbabilityQuery;
use baynet_core::{load_network, BayesianNetwork, ExecError, VariableElimination};

fn alarm() -> BayesianNetwork {
    load_network(include_str!("../../../baynet-examples/alarm.xml")).expect("load alarm")
}

fn weather() -> BayesianNetwork {
    load_network(include_str!("../../../baynet-examples/weather.xml")).expect("load weather")
}

#[test]
fn burglary_given_both_calls() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    assert_eq!(ve.run("P(B=T|J=T,M=T) E-A").unwrap(), "0.28417,7,16");
}

#[test]
fn order_affects_counts_not_answer() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    let a = ve
        .evaluate(&ProbabilityQuery::parse("P(B=T|J=T,M=T) E-A").unwrap())
        .unwrap();
    let b = ve
        .evaluate(&ProbabilityQuery::parse("P(B=T|J=T,M=T) A-E").unwrap())
        .unwrap();
    assert!((a.probability - b.probability).abs() < 1e-12);
    assert!((a.probability - 0.284_171_835).abs() < 1e-6);
}

#[test]
fn irrelevant_child_is_pruned() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    let result = ve
        .evaluate(&ProbabilityQuery::parse("P(J=T|B=T) E-A-M").unwrap())
        .unwrap();
    assert_eq!(result.pruned, vec![net.var_id("M").unwrap()]);
    assert_eq!(result.to_string(), "0.84902,4,8");
}

#[test]
fn non_binary_posterior() {
    let net = weather();
    let ve = VariableElimination::new(&net);
    assert_eq!(
        ve.run("P(Weather=rainy|Umbrella=yes)").unwrap(),
        "0.51429,2,3"
    );
}

#[test]
fn posterior_over_outcomes_sums_to_one() {
    let net = weather();
    let ve = VariableElimination::new(&net);
    let total: f64 = ["sunny", "cloudy", "rainy"]
        .iter()
        .map(|w| {
            let q = format!("P(Weather={}|Umbrella=no)", w);
            ve.evaluate(&ProbabilityQuery::parse(&q).unwrap())
                .unwrap()
                .probability
        })
        .sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn prior_query_prunes_everything_else() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    let result = ve
        .evaluate(&ProbabilityQuery::parse("P(B=T) E-A-J-M").unwrap())
        .unwrap();
    assert_eq!(result.pruned.len(), 4);
    assert!(result.elimination_order.is_empty());
    assert_eq!(result.to_string(), "0.00100,0,0");
}

#[test]
fn unknown_outcome_fails() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    assert!(matches!(
        ve.run("P(B=maybe|J=T) E-A"),
        Err(ExecError::UnknownOutcome { .. })
    ));
}

#[test]
fn barren_variable_must_be_listed_to_be_pruned() {
    let net = alarm();
    let ve = VariableElimination::new(&net);
    // M is barren for P(J|B) but only pruned when it appears in the order
    assert!(matches!(
        ve.run("P(J=T|B=T) A-E"),
        Err(ExecError::Internal(msg)) if msg.contains("'M'")
    ));
    assert_eq!(ve.run("P(J=T|B=T) A-E-M").unwrap(), "0.84902,6,12");
}
