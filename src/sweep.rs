//! Response-surface sweeps: evaluate the pilot over a distance x bearing
//! grid in parallel and write the surface plus a summary to disk.

use crate::pilot::{FallbackPolicy, FuzzyPilot, ShipObservation};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Samples along current_distance over [0, 1000].
    pub distance_steps: usize,
    /// Samples along ship_asteroid_angle over [-pi, pi].
    pub angle_steps: usize,
    /// Fixed values for the remaining observation fields.
    pub base: ShipObservation,
    pub out_dir: PathBuf,
}

impl SweepConfig {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            distance_steps: 41,
            angle_steps: 33,
            base: ShipObservation::default(),
            out_dir,
        }
    }
}

/// One grid point's inputs and resolved command.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SweepPoint {
    pub current_distance: f64,
    pub ship_asteroid_angle: f64,
    pub thrust: f64,
    pub rotation: f64,
    pub fire_level: f64,
    pub fire: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SweepSummary {
    pub run_count: usize,
    pub fire_count: usize,
    pub thrust_min: f64,
    pub thrust_max: f64,
    pub rotation_min: f64,
    pub rotation_max: f64,
}

#[derive(Clone, Debug)]
pub struct SweepReport {
    pub summary: SweepSummary,
    pub points: Vec<SweepPoint>,
}

pub fn run_sweep(config: &SweepConfig) -> Result<SweepReport> {
    anyhow::ensure!(
        config.distance_steps >= 2 && config.angle_steps >= 2,
        "sweep needs at least 2 steps per axis"
    );

    let rows: Vec<Vec<SweepPoint>> = (0..config.distance_steps)
        .into_par_iter()
        .map(|row| -> Result<Vec<SweepPoint>> {
            let distance = 1000.0 * row as f64 / (config.distance_steps - 1) as f64;
            let mut pilot = FuzzyPilot::new(FallbackPolicy::Neutral)
                .context("building the fuzzy pilot")?;
            let mut points = Vec::with_capacity(config.angle_steps);
            for col in 0..config.angle_steps {
                let angle = -PI + 2.0 * PI * col as f64 / (config.angle_steps - 1) as f64;
                let observation = ShipObservation {
                    current_distance: distance,
                    ship_asteroid_angle: angle,
                    ..config.base
                };
                let command = pilot.next_command(&observation)?;
                points.push(SweepPoint {
                    current_distance: distance,
                    ship_asteroid_angle: angle,
                    thrust: command.thrust,
                    rotation: command.rotation,
                    fire_level: command.fire_level,
                    fire: command.fire,
                });
            }
            Ok(points)
        })
        .collect::<Result<_>>()?;
    let points: Vec<SweepPoint> = rows.into_iter().flatten().collect();

    let mut summary = SweepSummary {
        run_count: points.len(),
        fire_count: 0,
        thrust_min: f64::INFINITY,
        thrust_max: f64::NEG_INFINITY,
        rotation_min: f64::INFINITY,
        rotation_max: f64::NEG_INFINITY,
    };
    for point in &points {
        if point.fire {
            summary.fire_count += 1;
        }
        summary.thrust_min = summary.thrust_min.min(point.thrust);
        summary.thrust_max = summary.thrust_max.max(point.thrust);
        summary.rotation_min = summary.rotation_min.min(point.rotation);
        summary.rotation_max = summary.rotation_max.max(point.rotation);
    }

    write_artifacts(config, &summary, &points)?;
    Ok(SweepReport { summary, points })
}

fn write_artifacts(
    config: &SweepConfig,
    summary: &SweepSummary,
    points: &[SweepPoint],
) -> Result<()> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating directory {}", config.out_dir.display()))?;

    let summary_path = config.out_dir.join("summary.json");
    let json = serde_json::to_vec_pretty(summary).context("serializing sweep summary")?;
    fs::write(&summary_path, json)
        .with_context(|| format!("failed writing {}", summary_path.display()))?;

    let mut csv = String::from("current_distance,ship_asteroid_angle,thrust,rotation,fire_level,fire\n");
    for p in points {
        let _ = writeln!(
            csv,
            "{:.3},{:.5},{:.3},{:.3},{:.4},{}",
            p.current_distance, p.ship_asteroid_angle, p.thrust, p.rotation, p.fire_level, p.fire
        );
    }
    let csv_path = config.out_dir.join("runs.csv");
    fs::write(&csv_path, csv).with_context(|| format!("failed writing {}", csv_path.display()))
}
