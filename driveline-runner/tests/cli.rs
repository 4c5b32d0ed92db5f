use std::path::{Path, PathBuf};
use std::process::Command;

const DEATH_TRACE: &str = r#"{"draws": [
  {"atts": [0.10, -0.05, 0.0], "defs": [0.0, 0.05, -0.02],
   "atts_rz": [0.2, 0.0, -0.1], "defs_rz": [0.0, 0.1, 0.0],
   "home": [0.02, 0.03, 0.01],
   "baseline_hazards": [0.02, 0.022, 0.03],
   "two_minute_drill": -0.2},
  {"atts": [0.05, -0.10, 0.02], "defs": [0.02, 0.0, -0.04],
   "atts_rz": [0.1, 0.05, -0.05], "defs_rz": [0.05, 0.0, 0.02],
   "home": [0.01, 0.02, 0.04],
   "baseline_hazards": [0.018, 0.024, 0.028]}
]}"#;

const TURNOVER_TRACE: &str = r#"{"draws": [
  {"atts": [0.0, 0.1, -0.1], "defs": [0.05, 0.0, -0.05], "home": 0.02,
   "baseline_hazards": [0.006, 0.005, 0.004]}
]}"#;

const TEAMS: &str = r#"["SEA", "ARI", "KC"]"#;
const SCHEDULE: &str = r#"[
  {"home": "SEA", "away": "ARI"}, {"home": "KC", "away": "SEA"},
  {"home": "ARI", "away": "KC"}, {"home": "ARI", "away": "SEA"}
]"#;

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "driveline-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    for (name, body) in [
        ("death.json", DEATH_TRACE),
        ("turnover.json", TURNOVER_TRACE),
        ("teams.json", TEAMS),
        ("schedule.json", SCHEDULE),
    ] {
        std::fs::write(dir.join(name), body).expect("write fixture");
    }
    dir
}

fn runner(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_driveline-runner"));
    command
        .arg("--death-trace")
        .arg(dir.join("death.json"))
        .arg("--turnover-trace")
        .arg(dir.join("turnover.json"))
        .arg("--teams")
        .arg(dir.join("teams.json"));
    command
}

#[test]
fn cli_list_variants_writes_output() {
    let dir = temp_dir("list");
    let output_path = dir.join("variants.txt");
    let status = Command::new(env!("CARGO_BIN_EXE_driveline-runner"))
        .args(["--list-variants", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available variants"));
    assert!(content.contains("no-redzone-no-turnover-defense"));
}

#[test]
fn cli_season_json_report_and_drive_log() {
    let dir = temp_dir("season");
    let report = dir.join("report.json");
    let drives = dir.join("drives.csv");
    let output = runner(&dir)
        .arg("--schedule")
        .arg(dir.join("schedule.json"))
        .args(["--iterations", "20", "--seed", "9", "--report", "json"])
        .arg("--drives-csv")
        .arg(&drives)
        .arg("--output")
        .arg(&report)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("read report"))
            .expect("report is json");
    assert_eq!(value["mode"], "season");
    assert_eq!(value["iterations"], 20);
    let teams = value["teams"].as_array().expect("teams array");
    assert_eq!(teams.len(), 3);
    let wins: f64 = teams.iter().map(|t| t["wins"].as_f64().unwrap_or(0.0)).sum();
    assert!((wins - 4.0).abs() < 1e-9);

    let log = std::fs::read_to_string(&drives).expect("read drives");
    assert!(log.lines().count() > 1);
    assert!(log.starts_with("iteration,home,away"));
}

#[test]
fn cli_same_seed_same_report() {
    let dir = temp_dir("repeat");
    let run = |name: &str| {
        let path = dir.join(name);
        let status = runner(&dir)
            .arg("--schedule")
            .arg(dir.join("schedule.json"))
            .args(["--mode", "quality", "--iterations", "15", "--report", "csv"])
            .arg("--output")
            .arg(&path)
            .status()
            .expect("run cli");
        assert!(status.success());
        std::fs::read_to_string(path).expect("read report")
    };
    let first = run("first.csv");
    let second = run("second.csv");
    assert_eq!(first, second);
    assert!(first.lines().skip(1).all(|row| {
        let mut columns = row.split(',');
        columns.next() == columns.next()
    }));
}

#[test]
fn cli_matchup_mode_reports_both_sides() {
    let dir = temp_dir("matchup");
    let output = runner(&dir)
        .args([
            "--mode",
            "matchup",
            "--matchup",
            "ARI@SEA",
            "--iterations",
            "12",
            "--report",
            "markdown",
            "--sequential",
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# Driveline Simulation Report"));
    assert!(stdout.contains("| SEA |"));
    assert!(stdout.contains("| ARI |"));
}

#[test]
fn cli_rejects_schedule_modes_without_a_schedule() {
    let dir = temp_dir("missing");
    let output = runner(&dir)
        .args(["--mode", "schedule-strength", "--iterations", "5"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--schedule is required"));
}
