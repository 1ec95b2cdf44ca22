use baynet_core::{load_network, BayesBall, BayesianNetwork};
use rustc_hash::FxHashSet;

fn alarm() -> BayesianNetwork {
    load_network(include_str!("../../../baynet-examples/alarm.xml")).expect("load alarm")
}

#[test]
fn alarm_independence_answers() {
    let net = alarm();
    let ball = BayesBall::new(&net);
    let cases = [
        ("B-E", "yes"),
        ("B-E|A", "no"),
        ("B-E|J", "no"),
        ("B-E|M=T", "no"),
        ("J-M", "no"),
        ("J-M|A", "yes"),
        ("B-J|A", "yes"),
        ("B-J", "no"),
        ("E-M|A,J", "yes"),
    ];
    for (query, expected) in cases {
        assert_eq!(ball.run(query).unwrap(), expected, "query {}", query);
    }
}

#[test]
fn d_separation_is_symmetric_on_alarm() {
    let net = alarm();
    let ball = BayesBall::new(&net);
    let ids: Vec<_> = net.nodes().iter().map(|n| n.id()).collect();
    let evidence_sets: Vec<FxHashSet<_>> = vec![
        FxHashSet::default(),
        [net.var_id("A").unwrap()].into_iter().collect(),
        [net.var_id("J").unwrap()].into_iter().collect(),
    ];
    for evidence in &evidence_sets {
        for x in &ids {
            for y in &ids {
                if evidence.contains(x) || evidence.contains(y) {
                    continue;
                }
                assert_eq!(
                    ball.d_separated(*x, *y, evidence),
                    ball.d_separated(*y, *x, evidence),
                    "{} / {}",
                    net.var_name(*x),
                    net.var_name(*y)
                );
            }
        }
    }
}
