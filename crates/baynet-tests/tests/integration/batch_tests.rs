use std::path::{Path, PathBuf};

use baynet_core::{run_batch, BatchInput, EliminationConfig, ExecError};

fn examples_dir() -> PathBuf {
    // tests run from the baynet-tests crate; fixtures live at ../baynet-examples
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../baynet-examples");
    p
}

#[test]
fn sample_batch_matches_expected_output() -> Result<(), ExecError> {
    let dir = examples_dir();
    let input = BatchInput::read(dir.join("input.txt"))?;
    assert_eq!(input.network_path, dir.join("alarm.xml"));

    let network = input.load_network()?;
    assert_eq!(network.name(), Some("Alarm"));
    let answers = run_batch(&network, &input.queries, EliminationConfig::default())?;
    let expected = std::fs::read_to_string(dir.join("expected_output.txt"))?;
    let expected: Vec<&str> = expected.lines().collect();
    let actual: Vec<&str> = answers.iter().map(|a| a.output.as_str()).collect();
    assert_eq!(actual, expected);
    assert_eq!(answers.iter().filter(|a| a.failed).count(), 1);
    Ok(())
}

#[test]
fn absolute_network_path_is_kept() {
    let input = BatchInput::parse("/tmp/net.xml\nA-B\n").unwrap();
    assert_eq!(input.network_path, Path::new("/tmp/net.xml"));
    assert_eq!(input.queries.len(), 1);
}

#[test]
fn missing_network_fails_to_load() {
    let input = BatchInput::parse("no_such_network.xml\nA-B\n").unwrap();
    assert!(matches!(input.load_network(), Err(ExecError::Io(_))));
}
