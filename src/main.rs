//! AquaMind — Main Entry Point
//!
//! Hexagonal architecture with a single-threaded dispatch loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  SensorHub        LogEventSink      ConsoleLink   FileStore  │
//! │  (SamplePort)     (EventSink)       (LinkPort)    (Storage)  │
//! │  FixedLocator     StdSleep                                   │
//! │  (LocationPort)   (SleepPort)                                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌───────────────────────────────────────────────────────┐   │
//! │  │             AppService (pure logic)                   │   │
//! │  │  Tri-Check · Scoring · Safety Override · Trends       │   │
//! │  └───────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};

use aquamind::adapters::link::ConsoleLink;
use aquamind::adapters::locator::{FixedLocator, OfflineLocator};
use aquamind::adapters::log_sink::LogEventSink;
use aquamind::adapters::sleep::StdSleep;
use aquamind::adapters::store::FileStore;
use aquamind::app::commands::AppCommand;
use aquamind::app::ports::{ConfigPort, WeatherObs};
use aquamind::app::service::AppService;
use aquamind::config::SystemConfig;
use aquamind::events::{Event, EventQueue, TriggerOrigin};
use aquamind::profile::ProfileRegistry;
use aquamind::sensors::sim::Scenario;
use aquamind::sensors::SensorHub;

/// AquaMind water-quality analyzer.
#[derive(Debug, Parser)]
#[command(name = "aquamind", version, about)]
struct Cli {
    /// Pin a regional profile instead of geo-resolution (e.g. "jaipur").
    #[arg(short, long)]
    profile: Option<String>,

    /// Simulation scenario for the sensor channels.
    #[arg(short, long, default_value = "tap_water")]
    scenario: String,

    /// Seed for the simulated channels (reproducible runs).
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Injected location fix latitude (with --lon enables geo-resolution).
    #[arg(long, requires = "lon")]
    lat: Option<f32>,

    /// Injected location fix longitude.
    #[arg(long, requires = "lat")]
    lon: Option<f32>,

    /// Run continuously instead of a single analysis.
    #[arg(short, long)]
    continuous: bool,

    /// Seconds between analyses in continuous mode.
    #[arg(short, long, default_value_t = 60)]
    interval: u64,

    /// State directory for stored config and credentials.
    #[arg(long, default_value = ".aquamind", env = "AQUAMIND_STATE_DIR")]
    state_dir: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("AquaMind v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 1. Stored config (or defaults on first boot) ──────────
    let mut store = FileStore::new(&cli.state_dir)
        .map_err(|e| anyhow!("state dir '{}' unusable: {e}", cli.state_dir))?;
    let mut config = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("stored config rejected ({e}); using defaults");
            SystemConfig::default()
        }
    };
    if let Some(name) = &cli.profile {
        config.default_profile = name.to_ascii_lowercase();
    }

    // ── 2. Domain core ────────────────────────────────────────
    let registry = ProfileRegistry::builtin();
    if registry.get(&config.default_profile).is_err() {
        let available = registry.names().collect::<Vec<_>>().join(", ");
        return Err(anyhow!(
            "unknown profile '{}' (available: {available})",
            config.default_profile
        ));
    }
    let mut service =
        AppService::new(config, registry).map_err(|e| anyhow!("service init failed: {e}"))?;

    // ── 3. Adapters ───────────────────────────────────────────
    let scenario = Scenario::from_str_lossy(&cli.scenario);
    info!("sensor channels simulated: scenario '{}'", scenario.label());
    let mut hub = SensorHub::simulated(scenario, cli.seed);
    let mut sink = LogEventSink;
    let mut link = ConsoleLink;
    let mut pacer = StdSleep;
    let boot = Instant::now();

    // ── 4. Session resolution ─────────────────────────────────
    // Explicit --profile pins the region; otherwise resolve from the
    // injected fix, falling back silently to the default when offline.
    if cli.profile.is_none() {
        match (cli.lat, cli.lon) {
            (Some(lat), Some(lon)) => {
                let weather = WeatherObs {
                    ambient_temperature: 27.0,
                    is_raining: false,
                    weathercode: 0,
                };
                let mut locator = FixedLocator::new(lat, lon, "injected fix", weather);
                service.begin_session(&mut locator, &mut pacer, &mut sink, Utc::now());
            }
            _ => {
                let mut locator = OfflineLocator;
                service.begin_session(&mut locator, &mut pacer, &mut sink, Utc::now());
            }
        }
    }
    info!("active profile: '{}'", service.active_profile_name());

    // ── 5. Dispatch loop ──────────────────────────────────────
    let mut queue = EventQueue::new();
    queue.push(Event::AnalysisRequested(TriggerOrigin::Schedule));

    loop {
        while let Some(event) = queue.pop() {
            let now_ms = boot.elapsed().as_millis() as u64;
            let command = match event {
                Event::AnalysisRequested(origin) => AppCommand::RunAnalysis(origin),
                Event::IntervalElapsed => AppCommand::RunAnalysis(TriggerOrigin::Schedule),
                Event::StatusRequested => AppCommand::ReportStatus,
            };
            service.handle_command(
                command,
                now_ms,
                &mut hub,
                &mut pacer,
                &mut sink,
                &mut link,
                &mut store,
                Utc::now(),
            );
        }

        if !cli.continuous {
            break;
        }
        std::thread::sleep(Duration::from_secs(cli.interval));
        queue.push(Event::IntervalElapsed);
    }

    info!(
        "done: {} analysis cycle(s) completed",
        service.analysis_count()
    );
    Ok(())
}
