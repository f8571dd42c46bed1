//! Exit codes and diagnostics of the `agent-sim` binary.
//!
//! Every case here fails before Docker is contacted, so no daemon is needed.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "SIM_NUM",
    "NUM_TO_START_IDS",
    "MTP",
    "PREFIX",
    "CONFIGS_PATH",
    "DOCKERFILE_PATH",
    "IMAGE_NAME",
    "TEARDOWN_POLICY",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "RUST_LOG",
];

/// The binary run from an empty directory with none of its variables set.
fn agent_sim(cwd: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("agent-sim");
    cmd.current_dir(cwd.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_exits_zero() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--sim-number"))
        .stdout(predicate::str::contains("--protocol"))
        .stdout(predicate::str::contains("--dockerfile"));
}

#[test]
fn version_exits_zero() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent-sim"));
}

#[test]
fn missing_protocol_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--dockerfile", "agent.Dockerfile"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("protocol"));
}

#[test]
fn unknown_protocol_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--protocol", "coap", "--dockerfile", "agent.Dockerfile"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown protocol 'coap'"));
}

#[test]
fn stomp_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--protocol", "stomp", "--dockerfile", "agent.Dockerfile"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn missing_dockerfile_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--protocol", "mqtt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("dockerfile"));
}

#[test]
fn malformed_number_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--sim-number", "many", "--protocol", "mqtt"])
        .assert()
        .code(1);
}

#[test]
fn id_range_overflow_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args([
            "--protocol",
            "mqtt",
            "--dockerfile",
            "agent.Dockerfile",
            "--num-to-start-ids",
            "4294967295",
            "--sim-number",
            "5",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("sim-number"));
}

#[test]
fn protocol_is_read_from_environment() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .env("MTP", "stomp")
        .env("DOCKERFILE_PATH", "agent.Dockerfile")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn env_local_overrides_env_file() {
    let cwd = tempfile::tempdir().unwrap();
    fs::write(
        cwd.path().join(".env"),
        "MTP=stomp\nDOCKERFILE_PATH=agent.Dockerfile\n",
    )
    .unwrap();
    fs::write(cwd.path().join(".env.local"), "MTP=coap\n").unwrap();

    agent_sim(&cwd)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown protocol 'coap'"));
}

#[test]
fn json_mode_reports_errors_as_json() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--json", "--protocol", "stomp", "--dockerfile", "agent.Dockerfile"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"type\":\"error\""));
}

#[test]
fn bootstrap_breaking_value_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--protocol", "mqtt", "--dockerfile", "agent.Dockerfile"])
        .args(["--mqtt-password", "p\"w\nDevice.LocalAgent.EndpointID \"evil\""])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mqtt-password"))
        .stderr(predicate::str::contains("evil").not());
}

#[test]
fn prefix_unusable_as_container_name_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    agent_sim(&cwd)
        .args(["--protocol", "mqtt", "--dockerfile", "agent.Dockerfile"])
        .args(["--prefix", "dev lab"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("prefix"));
}
