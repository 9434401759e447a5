//! End-to-end analysis cycle tests: Tri-Check → scoring → override →
//! assembly, through the port boundary.

use chrono::{TimeZone, Utc};

use aquamind::adapters::locator::{FixedLocator, FlakyLocator, OfflineLocator};
use aquamind::adapters::sleep::InstantSleep;
use aquamind::app::events::AppEvent;
use aquamind::app::ports::WeatherObs;
use aquamind::app::service::AppService;
use aquamind::config::SystemConfig;
use aquamind::events::TriggerOrigin;
use aquamind::profile::{ProfileRegistry, Season};
use aquamind::report::Parameter;
use aquamind::scoring::Verdict;
use aquamind::sensors::sim::Scenario;
use aquamind::sensors::SensorHub;

use crate::mock_hw::{CollectingSink, MockChannels};

fn service() -> AppService {
    AppService::new(SystemConfig::default(), ProfileRegistry::builtin()).unwrap()
}

fn ts() -> chrono::DateTime<Utc> {
    // Mid-October: "normal" season, no seasonal advisory in the alert list.
    Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap()
}

fn weather() -> WeatherObs {
    WeatherObs {
        ambient_temperature: 27.0,
        is_raining: false,
        weathercode: 0,
    }
}

#[test]
fn clean_water_scores_safe_with_full_stability() {
    let mut svc = service();
    let mut hw = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();

    assert!(result.jal_score >= 80, "score {}", result.jal_score);
    assert_eq!(result.verdict, Verdict::Safe);
    // Identical raw samples: zero variance, stability exactly 100.
    assert!((result.stability - 100.0).abs() < 1e-3);
    assert!(result.alerts.is_empty());
    assert_eq!(result.profile_name, "jabalpur");
    assert_eq!(result.readings.len(), 5);
    assert_eq!(sink.completed(), 1);
}

#[test]
fn turbidity_at_ceiling_forces_unsafe() {
    let mut svc = service();
    // Turbidity sits exactly on the 8.0 NTU ceiling; everything else fair.
    let mut hw = MockChannels::steady(650.0, 7.0, 8.0, 30.0, 6.0);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();

    assert_eq!(result.verdict, Verdict::Unsafe);
    assert!(result.jal_score <= 30, "score {}", result.jal_score);
    assert!(result.alerts.iter().any(|a| a.contains("Turbidity")));
}

#[test]
fn acidic_ph_overrides_otherwise_perfect_readings() {
    let mut svc = service();
    let mut hw = MockChannels::steady(150.0, 3.5, 0.5, 25.0, 7.5);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let result = svc
        .try_run_analysis(TriggerOrigin::Link, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();

    assert_eq!(result.verdict, Verdict::Unsafe);
    assert!(result.jal_score <= 30);
    assert!(result.alerts.iter().any(|a| a.contains("pH")));
}

#[test]
fn noisy_channel_drags_stability_down() {
    let mut svc = service();
    let mut hw = MockChannels::steady(350.0, 7.2, 1.0, 27.0, 7.0);
    // Violent alternation on the TDS channel only.
    hw.set(Parameter::Tds, vec![200.0, 500.0]);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();

    // One bad channel out of four: overall stability well below 100 but
    // the result still exists — unreliability is a signal, not an error.
    assert!(result.stability < 90.0);
    assert!(result.stability > 0.0);
}

#[test]
fn simulated_sensor_error_scenario_raises_cleaning_alert() {
    let mut svc = service();
    let mut hub = SensorHub::simulated(Scenario::SensorError, 42);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hub, &mut pacer, &mut sink, ts())
        .unwrap();

    // A failing probe surfaces as collapsed stability plus the cleaning
    // alert from the override's stability floor.
    assert!(result.stability < 40.0, "stability {}", result.stability);
    assert!(result.alerts.iter().any(|a| a.contains("clean")));
}

#[test]
fn location_fix_resolves_nearest_profile() {
    let mut svc = service();
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();
    // Coimbatore: closest of the six registry cities is Chennai.
    let mut locator = FixedLocator::new(11.0, 76.97, "Coimbatore", weather());
    svc.begin_session(&mut locator, &mut pacer, &mut sink, ts());

    assert_eq!(svc.active_profile_name(), "chennai");
    assert!(svc.profile_from_fix());

    let mut hw = MockChannels::steady(320.0, 7.1, 0.8, 26.0, 7.0);
    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();
    assert_eq!(result.profile_name, "chennai");
    assert_eq!(result.city.as_deref(), Some("Coimbatore"));
}

#[test]
fn offline_locator_falls_back_to_default_profile() {
    let mut svc = service();
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();
    svc.begin_session(&mut OfflineLocator, &mut pacer, &mut sink, ts());

    // Silent fallback, observable through the profile name.
    assert_eq!(svc.active_profile_name(), "jabalpur");
    assert!(!svc.profile_from_fix());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ProfileResolved { profile, from_fix: false } if profile == "jabalpur"
    )));

    let mut hw = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, ts())
        .unwrap();
    assert_eq!(result.profile_name, "jabalpur");
    assert!(result.city.is_none());
}

#[test]
fn flaky_locator_recovers_within_retry_budget() {
    let mut svc = service();
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();
    // Two failures, then answers near Delhi; default budget is 3 attempts.
    let mut locator =
        FlakyLocator::new(FixedLocator::new(28.6, 77.2, "New Delhi", weather()), 2);
    svc.begin_session(&mut locator, &mut pacer, &mut sink, ts());

    assert_eq!(svc.active_profile_name(), "delhi");
    assert!(svc.profile_from_fix());
    // Backoff between failed attempts went through the sleep port.
    assert!(pacer.total_requested.as_millis() >= 500);
}

#[test]
fn monsoon_session_carries_seasonal_advisory() {
    let mut svc = service();
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();
    let july = Utc.with_ymd_and_hms(2026, 7, 10, 8, 0, 0).unwrap();
    let rain = WeatherObs {
        ambient_temperature: 26.0,
        is_raining: true,
        weathercode: 61,
    };
    let mut locator = FixedLocator::new(26.14, 91.74, "Guwahati", rain);
    svc.begin_session(&mut locator, &mut pacer, &mut sink, july);

    let mut hw = MockChannels::steady(200.0, 7.2, 0.8, 26.0, 7.2);
    let result = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut hw, &mut pacer, &mut sink, july)
        .unwrap();

    assert_eq!(result.season, Season::Monsoon);
    assert!(result.alerts.iter().any(|a| a.contains("sediment")));
}

#[test]
fn cooldown_rejects_rapid_retrigger() {
    let mut svc = service();
    let mut hw = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    assert!(svc
        .try_run_analysis(TriggerOrigin::Button, 1000, &mut hw, &mut pacer, &mut sink, ts())
        .is_some());
    // 2 s later: inside the 5 s cooldown window.
    assert!(svc
        .try_run_analysis(TriggerOrigin::Button, 3000, &mut hw, &mut pacer, &mut sink, ts())
        .is_none());
    assert_eq!(sink.rejected(), 1);
    // After the window, triggers run again.
    assert!(svc
        .try_run_analysis(TriggerOrigin::Button, 7000, &mut hw, &mut pacer, &mut sink, ts())
        .is_some());
    assert_eq!(svc.analysis_count(), 2);
}

#[test]
fn results_are_snapshots_not_live_views() {
    let mut svc = service();
    let mut pacer = InstantSleep::new();
    let mut sink = CollectingSink::new();

    let mut clean = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let first = svc
        .try_run_analysis(TriggerOrigin::Button, 0, &mut clean, &mut pacer, &mut sink, ts())
        .unwrap();

    let mut dirty = MockChannels::steady(950.0, 6.2, 9.0, 31.0, 3.0);
    let second = svc
        .try_run_analysis(TriggerOrigin::Button, 10_000, &mut dirty, &mut pacer, &mut sink, ts())
        .unwrap();

    // The first result is immutable history; the cache holds the second.
    assert_eq!(first.verdict, Verdict::Safe);
    assert_eq!(second.verdict, Verdict::Unsafe);
    assert_eq!(svc.last_result().unwrap().jal_score, second.jal_score);
}
