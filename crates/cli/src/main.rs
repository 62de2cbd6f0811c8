//! Command Line Interface for the live location tracker.
mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::Settings;
use dotenv::dotenv;
use livelocator_tracking::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Time left after the last fix for the indicator animation to settle.
const SETTLE_TIME: Duration = Duration::from_millis(1_500);

#[derive(Parser)]
#[command(name = "livelocator")]
#[command(about = "Live location tracking on an in-memory map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a random walk through `locate_me`
    Simulate {
        /// Start latitude in degrees
        #[arg(long, default_value_t = 26.4498954, allow_negative_numbers = true)]
        lat: f64,

        /// Start longitude in degrees
        #[arg(long, default_value_t = 74.6399163, allow_negative_numbers = true)]
        lon: f64,

        /// Number of fixes to generate
        #[arg(short, long, default_value_t = 10)]
        fixes: usize,

        /// Standard deviation of each step, in meters
        #[arg(long, default_value_t = 15.0)]
        step_m: f64,

        /// Mean reported accuracy, in meters
        #[arg(long, default_value_t = 20.0)]
        accuracy_m: f32,

        /// Delay between simulated fixes, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,

        /// Seed for a reproducible walk
        #[arg(long)]
        seed: Option<u64>,

        /// Pulse the indicator for one period before stopping
        #[arg(long)]
        pulse: bool,
    },
    /// Replay fixes from a JSON file through a fused provider
    Replay {
        /// JSON array of fixes
        file: PathBuf,

        /// Delay between fixes, in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Fastest accepted interval, in milliseconds
        #[arg(long)]
        fastest_interval_ms: Option<u64>,

        /// Request priority (HIGH_ACCURACY, BALANCED_POWER, LOW_POWER, NO_POWER or a code)
        #[arg(long)]
        priority: Option<ProviderPriority>,
    },
    /// Great-circle midpoint of two coordinates
    Midpoint {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
    /// Great-circle distance between two coordinates
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Commands::Simulate {
            lat,
            lon,
            fixes,
            step_m,
            accuracy_m,
            delay_ms,
            seed,
            pulse,
        } => {
            let start = GeoPoint::new(lat, lon);
            let delay = Duration::from_millis(delay_ms);
            let mut walk = RandomWalk::new(start, step_m, accuracy_m, accuracy_m / 3.0)
                .context("Invalid random walk parameters")?
                .with_timing(chrono::Utc::now().timestamp_millis(), delay_ms as i64);
            if let Some(seed) = seed {
                walk = walk.with_seed(seed);
            }
            let fixes = walk.generate(fixes);
            print_fixes(&fixes);

            println!("🛰️  Locating from {start} ({} fixes)...", fixes.len());
            let map = MemoryMap::new();
            let source = Arc::new(ScriptedLocationSource::new(fixes.clone()).with_delay(delay));
            let tracker = Arc::new(LiveLocationTracker::new(
                Arc::new(map.clone()),
                settings.tracker_config()?,
            ));

            let handle = tracker.locate_me(source.clone()).await?;
            tokio::time::sleep(playback_time(delay, fixes.len())?).await;

            if pulse {
                let pulser = PulseAnimator::default();
                if tracker.pulse(&pulser).await {
                    tokio::time::sleep(pulser.period).await;
                }
            }

            let last = tracker.last_fix().await;
            tracker.stop().await;
            info!(active = handle.is_active(), "Simulation finished");

            for request in source.status().requests {
                println!(
                    "📋 Requested {} every {} ms (fastest {} ms)",
                    request.priority, request.interval_ms, request.fastest_interval_ms
                );
            }
            print_events(&map);
            if let Some(last) = last {
                println!("📍 Last fix: {}", last.describe(None));
            }
        }
        Commands::Replay {
            file,
            interval_ms,
            fastest_interval_ms,
            priority,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let fixes: Vec<Fix> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a JSON array of fixes", file.display()))?;
            if fixes.is_empty() {
                bail!("{} contains no fixes", file.display());
            }
            print_fixes(&fixes);

            let settings = settings.with_overrides(priority, interval_ms, fastest_interval_ms);
            println!("⚙️  Settings: {}", serde_json::to_string(&settings)?);
            let provider_config = settings.provider_config()?;

            let map = MemoryMap::new();
            let tracker = Arc::new(LiveLocationTracker::new(
                Arc::new(map.clone()),
                settings.tracker_config()?,
            ));
            let source = Arc::new(
                ScriptedLocationSource::new(fixes.clone()).with_delay(provider_config.interval()),
            );

            let mut provider = FusedLocationProvider::new()
                .with_source(source)
                .with_listener(tracker.clone())
                .with_config(provider_config);

            println!("▶️  Replaying {} fixes...", fixes.len());
            provider.start().await?;
            tokio::time::sleep(playback_time(provider_config.interval(), fixes.len())?).await;
            provider.stop().await;
            tracker.stop().await;

            print_events(&map);
        }
        Commands::Midpoint {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let mid = midpoint(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2));
            println!("{mid}");
        }
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let meters = distance_m(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2));
            println!("{meters:.2} m");
        }
    }

    Ok(())
}

/// How long `count` fixes spaced `step` apart take to play back and settle.
fn playback_time(step: Duration, count: usize) -> Result<Duration> {
    let slots = u32::try_from(count)
        .ok()
        .and_then(|count| count.checked_add(1))
        .with_context(|| format!("Too many fixes to play back: {count}"))?;
    step.checked_mul(slots)
        .and_then(|total| total.checked_add(SETTLE_TIME))
        .with_context(|| format!("{count} fixes every {step:?} is too long to play back"))
}

fn print_fixes(fixes: &[Fix]) {
    let mut previous: Option<&Fix> = None;
    for fix in fixes {
        println!("  {}", fix.describe(previous));
        previous = Some(fix);
    }
}

fn print_events(map: &MemoryMap) {
    let events = map.events();
    println!("🗺️  {} map operations:", events.len());
    for event in &events {
        match event {
            MapEvent::MarkerAdded {
                id,
                position,
                icon,
                draggable,
            } => println!(
                "  + marker #{id} at {position} ({}, draggable: {draggable})",
                icon.as_str()
            ),
            MapEvent::MarkerMoved { id, position } => {
                println!("  ~ marker #{id} -> {position}");
            }
            MapEvent::MarkerRemoved { id } => println!("  - marker #{id}"),
            MapEvent::IndicatorAdded { id, options } => println!(
                "  + indicator #{id} at {} r={:.0} m (fill {}, stroke {})",
                options.center, options.radius, options.fill, options.stroke
            ),
            MapEvent::IndicatorMoved { id, center } => {
                println!("  ~ indicator #{id} -> {center}");
            }
            MapEvent::IndicatorResized { id, radius } => {
                println!("  ~ indicator #{id} r={radius:.1} m");
            }
            MapEvent::IndicatorRemoved { id } => println!("  - indicator #{id}"),
            MapEvent::CameraMoved { target, zoom } => {
                println!("  ⌖ camera -> {target} @ zoom {zoom}");
            }
        }
    }
    if map.stale_writes() > 0 {
        println!("⚠️  {} writes hit removed overlays", map.stale_writes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_time_covers_every_fix() {
        assert_eq!(
            playback_time(Duration::from_millis(500), 3).unwrap(),
            Duration::from_millis(2_000) + SETTLE_TIME
        );
        assert_eq!(playback_time(Duration::ZERO, 0).unwrap(), SETTLE_TIME);
    }

    #[test]
    fn test_playback_time_overflow_is_an_error() {
        assert!(playback_time(Duration::from_millis(u64::MAX), 10).is_err());
        assert!(playback_time(Duration::MAX, 0).is_err());
        assert!(playback_time(Duration::from_millis(1), usize::MAX).is_err());
    }
}
