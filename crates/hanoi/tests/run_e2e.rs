/// End-to-end runs through the headless and real-time drivers
use anyhow::Result;
use hanoi::{
    config::Config,
    runner::{run_headless, run_realtime},
};
use hanoi_core::{planner::move_count, progress::RecordingProgress, scene::MemoryScene};
use std::{fs, time::Duration};

fn config(disks: u32, delay: f64) -> Config {
    let mut config = Config::default();
    config.simulation.disk_count = disks;
    config.simulation.move_delay = delay;
    config
}

#[test]
fn headless_runs_solve_every_size() -> Result<()> {
    for disks in 1..=6 {
        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();
        let report = run_headless(&config(disks, 0.5), &mut scene, &mut sink)?;

        let total = move_count(disks);
        assert!(report.is_solved(), "{disks} disks: {report:?}");
        assert_eq!(report.pegs[2], (0..disks).rev().collect::<Vec<_>>());
        assert_eq!(report.launched, total);
        assert_eq!(report.completed, total);
        assert_eq!(sink.readouts.len() as u64, total + 1);
        assert_eq!(sink.last(), Some(format!("Step {total}/{total}").as_str()));
        assert_eq!(scene.len(), disks as usize);
    }
    Ok(())
}

#[test]
fn position_scan_run_from_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scan.toml");
    fs::write(
        &path,
        r#"
[simulation]
disk_count = 5
move_delay = 0.5

[layout]
disk_height = 0.4
pegs = [[-5.0, 0.0, 2.0], [0.0, 0.0, 2.0], [5.0, 0.0, 2.0]]

[display]
progress_style = "legacy"
resolution = "position_scan"
"#,
    )?;

    let config = Config::from_file(&path)?;
    config.validate()?;

    let mut scene = MemoryScene::new();
    let mut sink = RecordingProgress::default();
    let report = run_headless(&config, &mut scene, &mut sink)?;

    assert!(report.is_solved(), "{report:?}");
    assert_eq!(sink.readouts[0], "Step 0/31");
    assert_eq!(sink.last(), Some("Steps: Step 31/31"));

    let mut heights: Vec<f64> = scene.disks().map(|(_, d)| d.position.y).collect();
    heights.sort_by(f64::total_cmp);
    for (level, y) in heights.into_iter().enumerate() {
        assert!((y - level as f64 * 0.4).abs() < 1e-9, "level {level} at {y}");
    }
    assert!(scene.disks().all(|(_, d)| d.position.x == 5.0 && d.position.z == 2.0));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn realtime_run_matches_headless() -> Result<()> {
    let config = config(4, 0.3);

    let mut headless_scene = MemoryScene::new();
    let headless = run_headless(&config, &mut headless_scene, &mut ())?;

    let mut scene = MemoryScene::new();
    let mut sink = RecordingProgress::default();
    let realtime = run_realtime(&config, &mut scene, &mut sink, std::future::pending()).await?;

    assert_eq!(realtime.pegs, headless.pegs);
    assert_eq!(realtime.launched, headless.launched);
    assert!(!realtime.cancelled);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_leaves_partial_progress() -> Result<()> {
    let mut scene = MemoryScene::new();
    let mut sink = RecordingProgress::default();
    let report = run_realtime(
        &config(3, 1.0),
        &mut scene,
        &mut sink,
        tokio::time::sleep(Duration::from_millis(3_500)),
    )
    .await?;

    assert!(report.cancelled);
    assert_eq!(report.launched, 3);
    assert_eq!(sink.last(), Some("Step 3/7"));
    assert!(!report.is_solved());
    Ok(())
}
