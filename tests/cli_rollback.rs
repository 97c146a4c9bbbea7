//! Integration tests for `shipwright rollback`

mod common;

use common::*;

#[test]
fn rollback_repoints_current_to_previous_release() {
    let env = TestEnv::with_config_lines("keep_releases = 5");
    env.deploy_as("20200101000000");
    env.deploy_as("20200102000000");

    let result = env.run(&["rollback", "--host", "web1"]);

    assert!(result.success, "{}", result.combined_output());
    let current = env.current_target().unwrap();
    assert!(current.ends_with("releases/20200101000000"));

    // Marker follows the rollback so bootstrap reads the right release
    let marker = env.deploy_root.path().join(".dep").join("latest_release");
    assert_eq!(
        std::fs::read_to_string(marker).unwrap().trim(),
        "20200101000000"
    );
}

#[test]
fn rollback_without_previous_release_fails() {
    let env = TestEnv::new();
    env.deploy_as("20200101000000");

    let result = env.run(&["rollback", "--host", "web1"]);

    assert!(!result.success);
    assert!(
        result.stderr.contains("roll back"),
        "{}",
        result.combined_output()
    );
    // Still published
    let current = env.current_target().unwrap();
    assert!(current.ends_with("releases/20200101000000"));
}

#[test]
fn rollback_before_first_deploy_fails() {
    let env = TestEnv::new();

    let result = env.run(&["rollback", "--host", "web1"]);

    assert!(!result.success);
    assert!(result.stderr.contains("no active release"));
}

#[test]
fn rollback_json_reports_from_and_to() {
    let env = TestEnv::with_config_lines("keep_releases = 5");
    env.deploy_as("20200101000000");
    env.deploy_as("20200102000000");

    let result = env.run(&["rollback", "--host", "web1", "--json"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains(r#""event":"rollback""#));
    assert!(result.stdout.contains(r#""from":"20200102000000""#));
    assert!(result.stdout.contains(r#""to":"20200101000000""#));
}
