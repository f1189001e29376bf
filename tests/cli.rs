mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{StubServer, TestEnv};
use predicates::str::contains;
use tempfile::TempDir;

fn run_help(dir: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("zorzim-data");
    cmd.current_dir(dir.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let dir = TempDir::new().expect("temp dir");
    run_help(&dir, &[]);
    run_help(&dir, &["run"]);
    run_help(&dir, &["fetch"]);
    run_help(&dir, &["clip"]);
    run_help(&dir, &["status"]);
    run_help(&dir, &["locate"]);
    run_help(&dir, &["doctor"]);
    run_help(&dir, &["config"]);
    run_help(&dir, &["config", "show"]);
    run_help(&dir, &["config", "init"]);
}

#[test]
fn config_show_defaults_to_santiago() {
    let dir = TempDir::new().expect("temp dir");
    let out = cargo_bin_cmd!("zorzim-data")
        .current_dir(dir.path())
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(v["ok"], true);
    assert_eq!(v["data"]["region"]["name"], "santiago");
    assert_eq!(v["data"]["data_dir"], "data/external");
    assert_eq!(v["data"]["extract"]["filename"], "chile-latest.osm.pbf");
    assert_eq!(v["data"]["boundary_refresh"], "always");
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().expect("temp dir");
    cargo_bin_cmd!("zorzim-data")
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("wrote zorzim-data.json"));
    assert!(dir.path().join("zorzim-data.json").exists());

    cargo_bin_cmd!("zorzim-data")
        .current_dir(dir.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(contains("refusing to overwrite"));
}

#[test]
fn data_dir_flag_overrides_config() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join("elsewhere")).expect("mkdir");
    let out = cargo_bin_cmd!("zorzim-data")
        .current_dir(dir.path())
        .args(["--json", "--data-dir", "elsewhere", "config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(v["data"]["data_dir"], "elsewhere");
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join("zorzim-data.json"),
        r#"{"output_filename": "../escape.osm.pbf"}"#,
    )
    .expect("write config");
    cargo_bin_cmd!("zorzim-data")
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .code(1)
        .stderr(contains("invalid configuration"));
}

#[test]
fn run_without_base_directory_is_filesystem_error() {
    let server = StubServer::start(&[]);
    let env = TestEnv::new(&server);
    std::fs::remove_dir_all(env.root.join("data/external")).expect("remove data dir");

    env.cmd()
        .arg("run")
        .assert()
        .code(2)
        .stderr(contains("filesystem error"));
    assert_eq!(server.hits(common::EXTRACT_PATH), 0);
}

#[test]
fn locate_missing_extract_fails() {
    let server = StubServer::start(&[]);
    let env = TestEnv::new(&server);
    env.cmd()
        .args(["locate", "valparaiso"])
        .assert()
        .code(2)
        .stderr(contains("extract not found"));
}
