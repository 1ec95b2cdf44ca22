use baynet_frontend::{parse_network, validate_network, FrontendError};

#[test]
fn parses_alarm_example() {
    let src = include_str!("../../../baynet-examples/alarm.xml");
    let ast = parse_network(src).expect("parse alarm");
    assert_eq!(ast.name.as_deref(), Some("Alarm"));
    assert_eq!(ast.variables.len(), 5);
    assert_eq!(ast.definitions.len(), 5);

    let a = ast.definition_for("A").expect("definition for A");
    assert_eq!(a.given, vec!["B", "E"]);
    assert_eq!(a.table.len(), 8);

    let b = ast.variable("B").expect("variable B");
    assert_eq!(b.outcomes, vec!["T", "F"]);
    assert_eq!(b.kind.as_deref(), Some("nature"));
    assert_eq!(b.properties, vec!["position = (0, 0)"]);

    validate_network(&ast).expect("alarm is valid");
}

#[test]
fn parses_non_binary_domains() {
    let src = include_str!("../../../baynet-examples/weather.xml");
    let ast = parse_network(src).expect("parse weather");
    let weather = ast.variable("Weather").expect("Weather");
    assert_eq!(weather.outcomes, vec!["sunny", "cloudy", "rainy"]);
    validate_network(&ast).expect("weather is valid");
}

#[test]
fn rejects_truncated_document() {
    let src = "<NETWORK><VARIABLE><NAME>A</NAME>";
    assert!(matches!(parse_network(src), Err(FrontendError::ParseError(_))));
}

#[test]
fn validation_catches_table_size() {
    let src = r#"
        <NETWORK>
          <VARIABLE><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
          <DEFINITION><FOR>A</FOR><TABLE>0.6 0.3 0.1</TABLE></DEFINITION>
        </NETWORK>
    "#;
    let ast = parse_network(src).expect("syntactically fine");
    assert!(matches!(
        validate_network(&ast),
        Err(FrontendError::ValidationError(_))
    ));
}
