//! Integration tests for `shipwright releases`

mod common;

use common::*;

#[test]
fn releases_lists_newest_first_with_active_marker() {
    let env = TestEnv::with_config_lines("keep_releases = 5");
    env.deploy_as("20200101000000");
    env.deploy_as("20200102000000");

    let result = env.run(&["releases", "--host", "web1"]);

    assert!(result.success, "{}", result.combined_output());
    let newest = result.stdout.find("20200102000000").unwrap();
    let oldest = result.stdout.find("20200101000000").unwrap();
    assert!(newest < oldest, "newest release should print first");
    assert!(result.stdout.contains("* 20200102000000"));
    assert!(!result.stdout.contains("* 20200101000000"));
}

#[test]
fn releases_on_empty_root_reports_none() {
    let env = TestEnv::new();

    let result = env.run(&["releases", "--host", "web1"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("no releases"));
}

#[test]
fn releases_json_includes_current() {
    let env = TestEnv::new();
    env.deploy_as("20200101000000");

    let result = env.run(&["releases", "--host", "web1", "--json"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains(r#""event":"releases""#));
    assert!(result.stdout.contains(r#""current":"20200101000000""#));
}
