use baynet_core::{load_network, BayesianNetwork, ExecError, NetworkBuilder};

fn alarm() -> BayesianNetwork {
    load_network(include_str!("../../../baynet-examples/alarm.xml")).expect("load alarm")
}

#[test]
fn loads_alarm_structure() {
    let net = alarm();
    assert_eq!(net.name(), Some("Alarm"));
    assert_eq!(net.len(), 5);

    let a = net.var_id("A").unwrap();
    assert_eq!(net.names(net.parents(a)), vec!["B", "E"]);
    assert_eq!(net.names(net.children(a)), vec!["J", "M"]);

    let b = net.var_id("B").unwrap();
    assert!(net.parents(b).is_empty());
    assert_eq!(net.names(net.children(b)), vec!["A"]);
}

#[test]
fn cpts_have_parents_then_self_scope() {
    let net = alarm();
    let j = net.node_by_name("J").unwrap();
    let a = net.var_id("A").unwrap();
    assert_eq!(j.cpt().scope(), &[a, j.id()]);
    // A=F, J=T
    assert_eq!(j.cpt().get(&[1, 0]), Some(0.05));
}

#[test]
fn every_cpt_row_group_sums_to_one() {
    let net = alarm();
    for node in net.nodes() {
        let card = node.variable().cardinality() as f64;
        let mass = node.cpt().total_mass();
        let groups = node.cpt().len() as f64 / card;
        assert!((mass - groups).abs() < 1e-9, "{} mass {}", node.name(), mass);
    }
}

#[test]
fn cycle_is_a_load_error() {
    let src = r#"
        <NETWORK>
          <VARIABLE><NAME>X</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
          <VARIABLE><NAME>Y</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
          <DEFINITION><FOR>X</FOR><GIVEN>Y</GIVEN><TABLE>0.5 0.5 0.5 0.5</TABLE></DEFINITION>
          <DEFINITION><FOR>Y</FOR><GIVEN>X</GIVEN><TABLE>0.5 0.5 0.5 0.5</TABLE></DEFINITION>
        </NETWORK>
    "#;
    assert!(matches!(load_network(src), Err(ExecError::CyclicNetwork(_))));
}

#[test]
fn undeclared_parent_is_rejected() {
    let err = NetworkBuilder::new()
        .variable("A", ["T", "F"])
        .cpt("A", ["Ghost"], [0.5, 0.5, 0.5, 0.5])
        .build()
        .expect_err("unknown parent");
    assert!(matches!(err, ExecError::ValidationError(_)));
}

#[test]
fn missing_file_is_io_error() {
    let err = BayesianNetwork::from_path("does/not/exist.xml").expect_err("missing");
    assert!(matches!(err, ExecError::Io(_)));
}

#[test]
fn display_dumps_every_node() {
    let text = alarm().to_string();
    for name in ["B", "E", "A", "J", "M"] {
        assert!(text.contains(&format!("Node: {}", name)));
    }
}
