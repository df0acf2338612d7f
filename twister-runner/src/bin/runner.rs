//! Twister Scenario Runner
//!
//! Loads a scenario from JSON, steps it headless and logs fusion events and a
//! periodic weather summary.
//!
//! Usage: `twister-runner [scenario.json] [--ticks N] [--write-default out.json]`
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=twister=debug`) for more detail.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use twister::prelude::*;
use twister_runner::{telemetry, ScenarioConfig};

struct Args {
    config: Option<PathBuf>,
    ticks: Option<u64>,
    write_default: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        ticks: None,
        write_default: None,
    };
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--ticks" => args.ticks = it.next().and_then(|v| v.parse().ok()),
            "--write-default" => args.write_default = it.next().map(PathBuf::from),
            _ => args.config = Some(PathBuf::from(arg)),
        }
    }
    args
}

fn main() -> ExitCode {
    telemetry::init("info");
    let args = parse_args();

    if let Some(path) = &args.write_default {
        return match ScenarioConfig::default().save(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "default scenario written");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match &args.config {
        Some(path) => match ScenarioConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("failed to load {}: {e}; using the default scenario", path.display());
                ScenarioConfig::default()
            }
        },
        None => {
            tracing::info!("no scenario given, using the default scenario");
            ScenarioConfig::default()
        }
    };

    let mut scenario = match config.build() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let ticks = args.ticks.unwrap_or(scenario.ticks);
    let dt = scenario.dt;
    let summary_every = ((10.0 / dt).round() as u64).max(1);
    tracing::info!(scenario = %config.name, ticks, dt, "running");

    let mut frame = InstanceBuffer::new();
    for tick in 0..ticks {
        frame.clear();
        let report = scenario.simulation.step(dt, &mut frame);

        for event in &report.fusion {
            match *event {
                FusionEvent::Started { first, second } => {
                    tracing::info!(
                        t = report.elapsed,
                        "{} and {} collided, merging",
                        scenario.name_of(first),
                        scenario.name_of(second)
                    );
                }
                FusionEvent::Completed { first, second, merged, particles } => {
                    let name = format!("{}+{}", scenario.name_of(first), scenario.name_of(second));
                    tracing::info!(t = report.elapsed, particles, "fusion complete: {name}");
                    scenario.names.push((name, merged));
                }
                FusionEvent::Aborted { first, second } => {
                    tracing::warn!(
                        "fusion of {} and {} aborted",
                        scenario.name_of(first),
                        scenario.name_of(second)
                    );
                }
            }
        }

        if tick % summary_every == 0 {
            let sim = &scenario.simulation;
            let map = sim.wind_map();
            let (peak, heading) = map.strongest().map(|s| (s.speed, s.heading_deg)).unwrap_or((0.0, 0.0));
            tracing::info!(
                t = report.elapsed,
                vortices = sim.vortices().len(),
                particles = frame.particles.len(),
                min_pressure = sim.grid().min_pressure(),
                peak_wind = peak,
                heading,
                "status"
            );
            for vortex in sim.vortices() {
                let pos = vortex.planar_position();
                let local = sim.grid().local(pos.x, pos.y);
                tracing::info!(
                    name = %scenario.name_of(vortex.id()),
                    pressure = local.pressure,
                    temperature = local.temperature,
                    wind_x = local.wind.x,
                    wind_z = local.wind.y,
                    "local weather"
                );
            }
        }
    }

    let sim = &scenario.simulation;
    for vortex in sim.vortices() {
        let p = vortex.params();
        let local = sim.grid().local(p.position.x, p.position.z);
        tracing::info!(
            name = %scenario.name_of(vortex.id()),
            x = p.position.x,
            z = p.position.z,
            pressure = local.pressure,
            temperature = local.temperature,
            height = p.height,
            radius_top = p.radius_top,
            intensity = p.intensity,
            particles = vortex.particle_count(),
            "final"
        );
    }
    tracing::info!(elapsed = sim.clock().elapsed(), frames = sim.clock().frame(), "done");
    ExitCode::SUCCESS
}
