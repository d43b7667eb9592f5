use anyhow::Result;
use fuzzy_autopilot::sweep::{run_sweep, SweepConfig};

#[test]
fn sweep_writes_summary_and_grid_artifacts() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut config = SweepConfig::new(tmp.path().to_path_buf());
    config.distance_steps = 11;
    config.angle_steps = 9;

    let report = run_sweep(&config)?;
    assert_eq!(report.summary.run_count, 11 * 9);
    assert_eq!(report.points.len(), 11 * 9);
    assert!(report.summary.fire_count > 0, "nothing fired across the grid");
    assert!(report.summary.thrust_max > 200.0);
    assert!(report.summary.thrust_min < -200.0);
    assert!(tmp.path().join("summary.json").exists());
    assert!(tmp.path().join("runs.csv").exists());

    let csv = std::fs::read_to_string(tmp.path().join("runs.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 11 * 9, "header plus one row per grid point");
    assert!(lines[0].starts_with("current_distance,"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("summary.json"))?)?;
    assert_eq!(summary["run_count"], 99);
    Ok(())
}

#[test]
fn degenerate_grids_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = SweepConfig::new(tmp.path().to_path_buf());
    config.distance_steps = 1;
    assert!(run_sweep(&config).is_err());
}
