//! CLI acceptance tests
//!
//! Each test runs the binary inside an isolated XDG sandbox so nothing
//! touches the developer's real config or queue. Only offline commands are
//! exercised; nothing here talks to a network.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use beacon_core::store::{EventStore, SqliteStore};
use beacon_core::Event;
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn queue_path(&self) -> PathBuf {
        self.xdg_data.join("beacon/queue.db")
    }

    fn seed_queue(&self, names: &[&str]) {
        let store = SqliteStore::open(&self.queue_path()).expect("failed to open queue");
        let events: Vec<Event> = names.iter().map(|name| Event::new(*name)).collect();
        store.write_all(&events).expect("failed to seed queue");
    }
}

fn run_beacon(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("beacon"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute beacon: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    assert!(
        output.status.success(),
        "beacon {:?} failed\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn status_reports_unconfigured_defaults() {
    let env = CliTestEnv::new();
    let output = run_beacon(&env, &["status"]);

    assert_success(&["status"], &output);
    let out = stdout(&output);
    assert!(out.contains("Not ready"));
    assert!(out.contains("Batch Size:      20"));
}

#[test]
fn pending_is_zero_on_fresh_queue() {
    let env = CliTestEnv::new();
    let output = run_beacon(&env, &["pending"]);

    assert_success(&["pending"], &output);
    assert!(stdout(&output).contains("0 pending event(s)"));
}

#[test]
fn pending_lists_seeded_events() {
    let env = CliTestEnv::new();
    env.seed_queue(&["checkout_viewed", "purchase"]);

    let output = run_beacon(&env, &["pending"]);
    assert_success(&["pending"], &output);

    let out = stdout(&output);
    assert!(out.contains("2 pending event(s)"));
    assert!(out.contains("checkout_viewed"));
    assert!(out.contains("purchase"));
}

#[test]
fn clear_empties_the_queue() {
    let env = CliTestEnv::new();
    env.seed_queue(&["stale"]);

    let output = run_beacon(&env, &["clear"]);
    assert_success(&["clear"], &output);

    let output = run_beacon(&env, &["pending"]);
    assert!(stdout(&output).contains("0 pending event(s)"));
}

#[test]
fn network_commands_refuse_without_server_url() {
    let env = CliTestEnv::new();

    let output = run_beacon(&env, &["send", "--name", "tap"]);
    assert_success(&["send"], &output);
    assert!(stdout(&output).contains("not configured"));

    let output = run_beacon(&env, &["resume"]);
    assert_success(&["resume"], &output);
    assert!(stdout(&output).contains("not configured"));
}

#[test]
fn status_reads_config_file() {
    let env = CliTestEnv::new();
    let config_dir = env.xdg_config.join("beacon");
    fs::create_dir_all(&config_dir).expect("failed to create config dir");
    fs::write(
        config_dir.join("config.toml"),
        r#"
[telemetry]
server_url = "https://ingest.example.com"
batch_size = 7
"#,
    )
    .expect("failed to write config");

    let output = run_beacon(&env, &["status"]);
    assert_success(&["status"], &output);

    let out = stdout(&output);
    assert!(out.contains("Ready to deliver"));
    assert!(out.contains("Batch Size:      7"));
    assert!(out.contains("https://ingest.example.com"));
}
