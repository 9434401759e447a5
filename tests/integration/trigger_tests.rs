//! Manual trigger path: button edges → debounce → event queue → analysis.

use chrono::{TimeZone, Utc};

use aquamind::adapters::sleep::InstantSleep;
use aquamind::app::service::AppService;
use aquamind::config::SystemConfig;
use aquamind::drivers::button::{ButtonEvent, TriggerButton};
use aquamind::events::{Event, EventQueue, TriggerOrigin};
use aquamind::profile::ProfileRegistry;

use crate::mock_hw::{CollectingSink, MockChannels};

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap()
}

/// One dispatch-loop pass: classify button gestures into queue events,
/// then drain the queue into the service.
fn pump(
    button: &mut TriggerButton,
    queue: &mut EventQueue,
    svc: &mut AppService,
    hw: &mut MockChannels,
    sink: &mut CollectingSink,
    now_ms: u64,
) {
    match button.tick(now_ms) {
        Some(ButtonEvent::ShortPress) => {
            queue.push(Event::AnalysisRequested(TriggerOrigin::Button));
        }
        Some(ButtonEvent::LongPress) => {
            queue.push(Event::StatusRequested);
        }
        None => {}
    }
    let mut pacer = InstantSleep::new();
    queue.drain(|event| {
        if let Event::AnalysisRequested(origin) = event {
            let _ = svc.try_run_analysis(origin, now_ms, hw, &mut pacer, sink, ts());
        }
    });
}

#[test]
fn short_press_runs_one_analysis() {
    let mut svc = AppService::new(SystemConfig::default(), ProfileRegistry::builtin()).unwrap();
    let mut hw = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let mut sink = CollectingSink::new();
    let mut button = TriggerButton::new();
    let mut queue = EventQueue::new();

    button.press(1000);
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1000);
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1060);
    button.release();
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1200);

    assert_eq!(svc.analysis_count(), 1);
    assert_eq!(sink.completed(), 1);
}

#[test]
fn retrigger_storm_is_absorbed_by_debounce_and_cooldown() {
    let mut svc = AppService::new(SystemConfig::default(), ProfileRegistry::builtin()).unwrap();
    let mut hw = MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5);
    let mut sink = CollectingSink::new();
    let mut button = TriggerButton::new();
    let mut queue = EventQueue::new();

    // First clean press runs an analysis.
    button.press(1000);
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1000);
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1060);
    button.release();
    pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, 1200);
    assert_eq!(svc.analysis_count(), 1);

    // Frantic pressing right after: every gesture that survives debounce
    // lands in the cooldown window and is rejected.
    for t in [1500u64, 1800, 2100, 2400] {
        button.press(t);
        pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, t);
        pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, t + 60);
        button.release();
        pump(&mut button, &mut queue, &mut svc, &mut hw, &mut sink, t + 120);
    }

    assert_eq!(svc.analysis_count(), 1, "cooldown must absorb the storm");
    assert!(sink.rejected() >= 1);
}
