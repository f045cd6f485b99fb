//! Integration tests substituting a repository url into a deployment document.

use std::fs;
use std::path::PathBuf;

use checkmate_core::{EngineConfig, SubstitutionMode};
use checkmate_template::{merge_into_tracked, substitute_variables, Substituter};
use serde_json::{json, Value};

const REPOSITORY_URL: &str = "https://github.com/checkmate/wordpress";

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_deployment() -> Value {
    let fixture_path = fixtures_dir().join("deployment.json");
    let raw = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read deployment fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_first_occurrence_substitution() {
    let mut deployment = load_deployment();
    let changed = substitute_variables(
        &mut deployment,
        [("%repository_url%", REPOSITORY_URL), ("%branch%", "master")],
    )
    .unwrap();

    assert!(changed);
    assert_eq!(deployment["blueprint"]["source"], json!(REPOSITORY_URL));
    assert_eq!(
        deployment["blueprint"]["services"]["web"]["component"]["options"]["branch"],
        json!("master")
    );
    // only the first occurrence is rewritten in the default mode
    assert_eq!(
        deployment["inputs"]["blueprint"]["url"],
        json!("%repository_url%")
    );
}

#[test]
fn test_global_substitution_from_config() {
    let config = EngineConfig::new()
        .unwrap()
        .with_substitution(SubstitutionMode::Global);
    let mut deployment = load_deployment();
    Substituter::from_config(&config)
        .substitute(&mut deployment, [("%repository_url%", REPOSITORY_URL)])
        .unwrap();

    assert_eq!(deployment["blueprint"]["source"], json!(REPOSITORY_URL));
    assert_eq!(deployment["inputs"]["blueprint"]["url"], json!(REPOSITORY_URL));
}

#[test]
fn test_untouched_sections_are_preserved() {
    let original = load_deployment();
    let mut deployment = original.clone();
    substitute_variables(&mut deployment, [("%branch%", "develop")]).unwrap();

    assert_eq!(deployment["environment"], original["environment"]);
    assert_eq!(deployment["includes"], original["includes"]);
    assert_eq!(deployment["inputs"], original["inputs"]);
}

#[test]
fn test_merge_reports_changed_inputs() {
    let mut deployment = load_deployment();
    let changed = merge_into_tracked(
        &mut deployment,
        &json!({"inputs": {"blueprint": {"region": "DFW", "url": "%repository_url%"}}}),
    );
    assert_eq!(changed, vec!["/inputs/blueprint/region"]);
    assert_eq!(deployment["inputs"]["blueprint"]["region"], json!("DFW"));
}
