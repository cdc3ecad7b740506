use assert_cmd::Command;
use serde_json::Value;

fn verdictprobe() -> Command {
    let mut cmd = Command::cargo_bin("verdictprobe").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("VERDICTPROBE_BASE_URL")
        .env_remove("VERDICTPROBE_VARIANT");
    cmd
}

#[test]
fn locators_json_lists_the_catalog() {
    let output = verdictprobe()
        .args(["locators", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    let verdict = entries
        .iter()
        .find(|entry| entry["name"] == "verdict")
        .expect("verdict locator listed");
    assert!(verdict["fallback"].is_object());

    let cookie = entries
        .iter()
        .find(|entry| entry["name"] == "cookie_accept_button")
        .expect("cookie locator listed");
    assert!(cookie["fallback"].is_null());
}

#[test]
fn config_prints_yaml_with_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "scenario:\n  variant: TP53:R175H\n").unwrap();

    let output = verdictprobe()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .env("VERDICTPROBE_BASE_URL", "http://localhost:9000")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("variant: TP53:R175H"), "{stdout}");
    assert!(stdout.contains("base_url: http://localhost:9000"), "{stdout}");
    assert!(stdout.contains("ethnicity: East Asian"), "{stdout}");
}

#[test]
fn malformed_config_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "timeouts: [1, 2]\n").unwrap();

    verdictprobe()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .failure()
        .code(1);
}
