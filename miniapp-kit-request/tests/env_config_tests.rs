#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! `ClientConfig::from_env` against a real process environment.
//!
//! Each case re-runs this test binary with `BASE_HOST` set on the child
//! process only, so the parent's environment is never mutated.

use std::process::Command;
use std::sync::Arc;

use miniapp_kit_request::{BASE_HOST_ENV, ClientConfig};
use miniapp_kit_storage::MemoryStorage;

/// Marks the child run and carries the base host it must observe.
const EXPECTED_ENV: &str = "MINIAPP_KIT_EXPECTED_BASE_HOST";
const UNSET: &str = "<unset>";

/// Runs only inside a child spawned by `from_env_reads_base_host`.
#[test]
fn child_checks_base_host_from_env() {
    let Some(expected) = std::env::var_os(EXPECTED_ENV) else {
        return;
    };
    let expected = expected.into_string().unwrap();

    let config = ClientConfig::from_env(Arc::new(MemoryStorage::new()));
    let observed = config.base_host.as_deref().unwrap_or(UNSET);
    assert_eq!(observed, expected);
}

fn run_child(base_host: Option<&str>, expected: &str) {
    let mut command = Command::new(std::env::current_exe().unwrap());
    command
        .args(["child_checks_base_host_from_env", "--exact", "--test-threads=1"])
        .env(EXPECTED_ENV, expected);
    match base_host {
        Some(value) => command.env(BASE_HOST_ENV, value),
        None => command.env_remove(BASE_HOST_ENV),
    };

    let output = command.output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "BASE_HOST={base_host:?}: {stdout}\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("1 passed"), "child test did not run: {stdout}");
}

#[test]
fn from_env_reads_base_host() {
    run_child(Some("https://api.example.com"), "https://api.example.com");
}

#[test]
fn from_env_treats_empty_base_host_as_unset() {
    run_child(Some(""), UNSET);
}

#[test]
fn from_env_without_base_host_is_unset() {
    run_child(None, UNSET);
}

#[test]
fn from_env_installs_default_chain() {
    let config = ClientConfig::from_env(Arc::new(MemoryStorage::new()));
    let names: Vec<_> = config.request_interceptors.iter().map(|i| i.name()).collect();
    assert_eq!(names, vec!["token", "log", "timeout"]);
}
