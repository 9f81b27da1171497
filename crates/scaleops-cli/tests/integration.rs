#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scaleops(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("scaleops").unwrap();
    cmd.current_dir(dir.path())
        .env("SCALEOPS_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(dir: &TempDir) {
    scaleops(dir).arg("init").assert().success();
}

fn save_example(dir: &TempDir) {
    scaleops(dir)
        .args([
            "answers",
            "save",
            "1-1",
            "--set",
            "who=B2B SaaS founders",
            "--set",
            "what=no GTM framework",
        ])
        .assert()
        .success();
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_workspace() {
    let dir = TempDir::new().unwrap();
    scaleops(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created:"));

    assert!(dir.path().join(".scaleops/config.yaml").exists());
    assert!(dir.path().join(".scaleops/workspace.redb").exists());
    assert!(dir.path().join(".scaleops/exports").is_dir());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    scaleops(&dir).arg("init").assert().success();
    scaleops(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    scaleops(&dir)
        .args(["answers", "show", "1-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("scaleops init"));
}

// ---------------------------------------------------------------------------
// answers
// ---------------------------------------------------------------------------

#[test]
fn answers_save_and_show() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);

    scaleops(&dir)
        .args(["answers", "show", "1-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("B2B SaaS founders"))
        .stdout(predicate::str::contains("no GTM framework"));
}

#[test]
fn answers_save_merges_with_saved_values() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);
    scaleops(&dir)
        .args(["answers", "save", "1-1", "--set", "why=budget season"])
        .assert()
        .success();

    let answers = json_stdout(scaleops(&dir).args(["answers", "show", "1-1"]));
    assert_eq!(answers["who"]["value"], "B2B SaaS founders");
    assert_eq!(answers["why"]["value"], "budget season");
}

#[test]
fn answers_save_rejects_bad_item_id() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["answers", "save", "Bad Item", "--set", "who=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid item id"));
}

// ---------------------------------------------------------------------------
// analyze / history
// ---------------------------------------------------------------------------

#[test]
fn analyze_records_history() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);

    let report = json_stdout(scaleops(&dir).args(["analyze", "1-1"]));
    let score = report["result"]["score"].as_u64().unwrap();
    assert!(score <= 100);
    assert_eq!(report["save"]["status"], "saved");

    let cards = json_stdout(scaleops(&dir).args(["history", "1-1"]));
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["ordinal"], 1);
    assert_eq!(cards[0]["score"].as_u64(), Some(score));
}

#[test]
fn analyze_without_required_answers_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["analyze", "1-1", "--set", "who=founders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required answers: what"));
}

#[test]
fn history_of_new_item_is_empty() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["history", "fresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No analyses recorded"));
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_pdf_falls_back_to_html() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);
    scaleops(&dir).args(["analyze", "1-1"]).assert().success();

    let out = json_stdout(scaleops(&dir).args(["export", "1-1", "--format", "pdf"]));
    assert_eq!(out["fallback"], true);
    assert_eq!(out["format"], "html");
    let path = std::path::PathBuf::from(out["path"].as_str().unwrap());
    assert!(path.exists());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("1-1-report-"));
}

#[test]
fn export_bundle_writes_zip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);

    scaleops(&dir)
        .args(["export", "1-1", "-f", "zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1-1-bundle-"));
}

#[test]
fn export_unknown_format_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);
    scaleops(&dir)
        .args(["export", "1-1", "-f", "rtf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid export format"));
}

// ---------------------------------------------------------------------------
// tab / items / config
// ---------------------------------------------------------------------------

#[test]
fn tab_switch_is_remembered() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);

    let first = json_stdout(scaleops(&dir).args(["tab", "1-1", "workspace"]));
    assert_eq!(first["switched"], true);
    assert_eq!(first["content"]["kind"], "worksheet");

    let again = json_stdout(scaleops(&dir).args(["tab", "1-1", "workspace"]));
    assert_eq!(again["switched"], false);
    assert_eq!(again["activeTab"], "workspace");

    let current = json_stdout(scaleops(&dir).args(["tab", "1-1"]));
    assert_eq!(current["activeTab"], "workspace");
}

#[test]
fn tab_analysis_before_analyze_shows_notice() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["tab", "1-1", "analysis"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No analysis yet"));
}

#[test]
fn items_lists_saved_items() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    save_example(&dir);
    scaleops(&dir)
        .arg("items")
        .assert()
        .success()
        .stdout(predicate::str::contains("1-1"));
}

#[test]
fn config_validate_default_is_clean() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_inverted_bands() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let path = dir.path().join(".scaleops/config.yaml");
    let yaml = std::fs::read_to_string(&path).unwrap();
    assert!(yaml.contains("good: 80"));
    std::fs::write(&path, yaml.replace("good: 80", "good: 50")).unwrap();

    scaleops(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_with_zero_history_limit_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let path = dir.path().join(".scaleops/config.yaml");
    let yaml = std::fs::read_to_string(&path).unwrap();
    assert!(yaml.contains("history_limit: 20"));
    std::fs::write(&path, yaml.replace("history_limit: 20", "history_limit: 0")).unwrap();

    scaleops(&dir)
        .args(["analyze", "1-1", "--set", "who=a", "--set", "what=b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("history_limit must be at least 1"));
}

// ---------------------------------------------------------------------------
// remote
// ---------------------------------------------------------------------------

/// Run a backend for an initialized project on a free local port.
fn spawn_backend(dir: &TempDir) -> u16 {
    let root = dir.path().to_path_buf();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    listener.set_nonblocking(true).unwrap();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let _ = scaleops_server::serve_on(root, listener).await;
        });
    });
    port
}

fn point_sync_at(dir: &TempDir, port: u16) {
    let mut config = scaleops_core::config::Config::load(dir.path()).unwrap();
    config.sync.base_url = Some(format!("http://127.0.0.1:{port}"));
    config.save(dir.path()).unwrap();
}

#[test]
fn local_analysis_is_mirrored_to_backend_history() {
    let backend = TempDir::new().unwrap();
    init_project(&backend);
    let port = spawn_backend(&backend);

    let dir = TempDir::new().unwrap();
    init_project(&dir);
    point_sync_at(&dir, port);
    save_example(&dir);

    let report = json_stdout(scaleops(&dir).args(["analyze", "1-1"]));
    assert_eq!(report["save"]["status"], "saved");
    assert_eq!(report["sync"]["status"], "ok");

    let remote = json_stdout(scaleops(&dir).args(["history", "1-1", "--remote"]));
    assert_eq!(remote.as_array().unwrap().len(), 1);
    assert_eq!(remote[0]["score"], report["result"]["score"]);

    let answers = json_stdout(scaleops(&dir).args(["answers", "show", "1-1", "--remote"]));
    assert_eq!(answers["who"]["value"], "B2B SaaS founders");
}

#[test]
fn remote_analyze_records_on_backend_only() {
    let backend = TempDir::new().unwrap();
    init_project(&backend);
    let port = spawn_backend(&backend);

    let dir = TempDir::new().unwrap();
    init_project(&dir);
    point_sync_at(&dir, port);
    save_example(&dir);

    let result = json_stdout(scaleops(&dir).args(["analyze", "1-1", "--remote"]));
    assert!(result["score"].as_u64().unwrap() <= 100);

    let remote = json_stdout(scaleops(&dir).args(["history", "1-1", "--remote"]));
    assert_eq!(remote.as_array().unwrap().len(), 1);
    let local = json_stdout(scaleops(&dir).args(["history", "1-1"]));
    assert!(local.as_array().unwrap().is_empty());
}

#[test]
fn remote_history_without_remote_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    scaleops(&dir)
        .args(["history", "1-1", "--remote"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync.base_url"));
}
