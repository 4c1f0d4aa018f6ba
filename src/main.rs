//! Headless Elvenvale runner.
//!
//! Steps the scene for a fixed number of ticks, applying a scripted weather
//! sequence, and optionally writes the final snapshot as JSON.
//!
//! ```text
//! elvenvale [--ticks N] [--config scene.ron] [--weather 0:rainy,900:snowy]
//!           [--seed S] [--dump snapshot.json] [--print-config]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use elvenvale::config::{config_to_ron, load_config, SceneConfig};
use elvenvale::shared::Weather;
use elvenvale::snapshot::{capture_snapshot, snapshot_to_json};
use elvenvale::weather::request_weather;
use elvenvale::{step_scene, ElvenvalePlugins};

const DEFAULT_TICKS: u64 = 3000;
const PROGRESS_EVERY: u64 = 500;

#[derive(Debug, Default)]
struct RunnerArgs {
    ticks: Option<u64>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    script: Vec<(u64, Weather)>,
    dump: Option<PathBuf>,
    print_config: bool,
}

/// Parses `tick:weather` pairs, e.g. `0:rainy,900:snowy`.
fn parse_script(source: &str) -> Result<Vec<(u64, Weather)>, String> {
    let mut script = Vec::new();
    for entry in source.split(',').filter(|e| !e.trim().is_empty()) {
        let (tick, weather) = entry
            .split_once(':')
            .ok_or_else(|| format!("Expected tick:weather, got '{}'", entry))?;
        let tick = tick
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("Bad tick '{}': {}", tick, e))?;
        script.push((tick, weather.parse::<Weather>()?));
    }
    script.sort_by_key(|(tick, _)| *tick);
    Ok(script)
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<RunnerArgs, String> {
    let mut parsed = RunnerArgs::default();
    let mut args = args.skip(1);
    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("{} needs a value", name))
        };
        match flag.as_str() {
            "--ticks" => {
                let raw = value("--ticks")?;
                parsed.ticks = Some(
                    raw.parse()
                        .map_err(|e| format!("Bad --ticks '{}': {}", raw, e))?,
                );
            }
            "--seed" => {
                let raw = value("--seed")?;
                parsed.seed = Some(
                    raw.parse()
                        .map_err(|e| format!("Bad --seed '{}': {}", raw, e))?,
                );
            }
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--weather" => parsed.script = parse_script(&value("--weather")?)?,
            "--dump" => parsed.dump = Some(PathBuf::from(value("--dump")?)),
            "--print-config" => parsed.print_config = true,
            other => return Err(format!("Unknown argument '{}'", other)),
        }
    }
    Ok(parsed)
}

fn resolve_config(args: &RunnerArgs) -> SceneConfig {
    let mut config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => {
                info!("[Runner] Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("[Runner] {}; using defaults", e);
                SceneConfig::default()
            }
        },
        None => SceneConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("elvenvale: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));
    let config = resolve_config(&args);

    if args.print_config {
        match config_to_ron(&config) {
            Ok(ron) => println!("{}", ron),
            Err(e) => {
                error!("[Runner] {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    app.insert_resource(config).add_plugins(ElvenvalePlugins);
    // Runs Startup once so every population exists before the first tick.
    app.update();

    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);
    let mut script = args.script.iter().peekable();
    info!("[Runner] Simulating {} ticks", ticks);

    for tick in 0..ticks {
        while let Some((_, weather)) = script.next_if(|(at, _)| *at <= tick) {
            request_weather(app.world_mut(), *weather);
        }
        step_scene(app.world_mut());

        if (tick + 1) % PROGRESS_EVERY == 0 {
            let snapshot = capture_snapshot(app.world_mut());
            info!(
                "[Runner] tick {} | {} {:?} | puddles {} | particles {} | fireflies {}",
                snapshot.tick,
                snapshot.weather.label(),
                snapshot.time_of_day,
                snapshot.puddles.len(),
                snapshot.particles.len(),
                snapshot.fireflies.len(),
            );
        }
    }

    if let Some(path) = &args.dump {
        let snapshot = capture_snapshot(app.world_mut());
        let written = snapshot_to_json(&snapshot).and_then(|json| {
            std::fs::write(path, json)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
        });
        match written {
            Ok(()) => info!("[Runner] Snapshot written to {}", path.display()),
            Err(e) => {
                warn!("[Runner] {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<RunnerArgs, String> {
        parse_args(std::iter::once("elvenvale").chain(list.iter().copied()).map(String::from))
    }

    #[test]
    fn test_script_is_sorted_by_tick() {
        let script = parse_script("900:snowy, 0:rainy").unwrap();
        assert_eq!(script, vec![(0, Weather::Rainy), (900, Weather::Snowy)]);
    }

    #[test]
    fn test_script_rejects_garbage() {
        assert!(parse_script("soon:rainy").is_err());
        assert!(parse_script("10-rainy").is_err());
        assert!(parse_script("10:hail").is_err());
    }

    #[test]
    fn test_args_parse_flags() {
        let parsed = args(&["--ticks", "20", "--seed", "9", "--weather", "5:snow"]).unwrap();
        assert_eq!(parsed.ticks, Some(20));
        assert_eq!(parsed.seed, Some(9));
        assert_eq!(parsed.script, vec![(5, Weather::Snowy)]);
        assert!(args(&["--ticks"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
    }
}
