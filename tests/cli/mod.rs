use std::fs;
use std::path::Path;
use std::process::Command;
use std::process::Output;

use crate::commons::target_file;
use crate::commons::CLIENT_PRELUDE;
use crate::commons::SERVER_PRELUDE;

fn getwatch(
    target: Option<&Path>,
    args: &[&str],
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_getwatch"));
    cmd.args(args).env_remove("GETWATCH_CONFIG").env_remove("GETWATCH_FILE");
    if let Some(target) = target {
        cmd.env("GETWATCH_FILE", target);
    }
    cmd.output().expect("failed to run getwatch")
}

#[test]
fn test_generate_client_command() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);

    let out = getwatch(Some(&path), &["generate-client", "Pod", "id"]);

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("pub async fn pod_get(&self, id: String)"));
}

#[test]
fn test_generate_client_without_key_param() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);

    let out = getwatch(Some(&path), &["generate-client", "Nodes"]);

    assert!(out.status.success());
    assert!(fs::read_to_string(&path).unwrap().contains("pub async fn nodes_get(&self)"));
}

#[test]
fn test_generate_server_command() {
    let (_dir, path) = target_file(SERVER_PRELUDE);

    let out = getwatch(Some(&path), &["generate-server", "3", "Config"]);

    assert!(out.status.success());
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("// CODE GENERATION 3 START"));
    assert!(text.contains("for ConfigEndpoint"));
}

#[test]
fn test_missing_target_env_fails() {
    let out = getwatch(None, &["generate-client", "Pod"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("GETWATCH_FILE"));
}

#[test]
fn test_invalid_resource_name_fails_without_writing() {
    let (_dir, path) = target_file(CLIENT_PRELUDE);

    let out = getwatch(Some(&path), &["generate-client", "pod-group"]);

    assert!(!out.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), CLIENT_PRELUDE);
}

#[test]
fn test_non_numeric_index_is_rejected() {
    let (_dir, path) = target_file(SERVER_PRELUDE);

    let out = getwatch(Some(&path), &["generate-server", "first", "Config"]);

    assert!(!out.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), SERVER_PRELUDE);
}
