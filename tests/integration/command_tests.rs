//! Link command handling: trigger, status, credentials, profile selection.

use chrono::{TimeZone, Utc};

use aquamind::adapters::link::ScriptedLink;
use aquamind::adapters::sleep::InstantSleep;
use aquamind::adapters::store::MemStore;
use aquamind::app::commands::{AppCommand, LinkCredentials};
use aquamind::app::events::AppEvent;
use aquamind::app::service::AppService;
use aquamind::config::SystemConfig;
use aquamind::events::TriggerOrigin;
use aquamind::link::{decode_command, ClientCommand, DeviceFrame};
use aquamind::profile::ProfileRegistry;
use aquamind::scoring::Verdict;
use aquamind::CommandError;

use crate::mock_hw::{CollectingSink, MockChannels};

struct Rig {
    svc: AppService,
    hw: MockChannels,
    pacer: InstantSleep,
    sink: CollectingSink,
    link: ScriptedLink,
    store: MemStore,
}

impl Rig {
    fn new() -> Self {
        Self {
            svc: AppService::new(SystemConfig::default(), ProfileRegistry::builtin()).unwrap(),
            hw: MockChannels::steady(150.0, 7.2, 0.5, 25.0, 7.5),
            pacer: InstantSleep::new(),
            sink: CollectingSink::new(),
            link: ScriptedLink::new(),
            store: MemStore::new(),
        }
    }

    fn handle(&mut self, cmd: AppCommand, now_ms: u64) {
        self.svc.handle_command(
            cmd,
            now_ms,
            &mut self.hw,
            &mut self.pacer,
            &mut self.sink,
            &mut self.link,
            &mut self.store,
            Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap(),
        );
    }
}

#[test]
fn analyze_command_delivers_a_result_frame() {
    let mut rig = Rig::new();
    rig.handle(AppCommand::RunAnalysis(TriggerOrigin::Link), 0);

    match rig.link.last_sent() {
        Some(DeviceFrame::AnalysisResult { record }) => {
            assert_eq!(record.verdict, Verdict::Safe);
            assert_eq!(record.profile, "jabalpur");
            assert!((record.tds - 150.0).abs() < 1e-3);
        }
        other => panic!("expected analysis frame, got {other:?}"),
    }
}

#[test]
fn status_command_reports_readiness_and_history() {
    let mut rig = Rig::new();
    rig.handle(AppCommand::ReportStatus, 1000);
    match rig.link.last_sent() {
        Some(DeviceFrame::Status { report }) => {
            assert!(report.ready);
            assert_eq!(report.analyses_run, 0);
            assert!(report.last_score.is_none());
        }
        other => panic!("expected status frame, got {other:?}"),
    }

    rig.handle(AppCommand::RunAnalysis(TriggerOrigin::Link), 2000);
    rig.handle(AppCommand::ReportStatus, 3000);
    match rig.link.last_sent() {
        Some(DeviceFrame::Status { report }) => {
            assert_eq!(report.analyses_run, 1);
            assert_eq!(report.last_verdict, Some(Verdict::Safe));
            assert!(report.last_score.is_some());
        }
        other => panic!("expected status frame, got {other:?}"),
    }
}

#[test]
fn link_loss_does_not_invalidate_the_analysis() {
    let mut rig = Rig::new();
    rig.link.connected = false;
    rig.handle(AppCommand::RunAnalysis(TriggerOrigin::Link), 0);

    assert!(rig.link.sent.is_empty());
    // The cycle completed and the cache holds the result for later status.
    assert_eq!(rig.svc.analysis_count(), 1);
    assert!(rig.svc.last_result().is_some());
}

#[test]
fn credentials_roundtrip_through_storage() {
    let mut rig = Rig::new();
    let creds = LinkCredentials {
        ssid: "field-router".into(),
        secret: "correct horse battery staple".into(),
    };
    rig.handle(AppCommand::UpdateCredentials(creds.clone()), 0);

    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::CredentialsUpdated { ssid } if ssid == "field-router"
    )));
    let stored = rig.svc.stored_credentials(&rig.store).unwrap();
    assert_eq!(stored, creds);
}

#[test]
fn empty_credentials_rejected_without_side_effects() {
    let mut rig = Rig::new();
    rig.handle(
        AppCommand::UpdateCredentials(LinkCredentials {
            ssid: String::new(),
            secret: "x".into(),
        }),
        0,
    );

    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::CommandRejected(CommandError::BadCredentials)
    )));
    assert!(rig.svc.stored_credentials(&rig.store).is_none());
}

#[test]
fn set_profile_pins_the_session() {
    let mut rig = Rig::new();
    rig.handle(AppCommand::SetProfile("jaipur".into()), 0);
    assert_eq!(rig.svc.active_profile_name(), "jaipur");

    rig.handle(AppCommand::RunAnalysis(TriggerOrigin::Link), 10_000);
    match rig.link.last_sent() {
        Some(DeviceFrame::AnalysisResult { record }) => {
            assert_eq!(record.profile, "jaipur");
        }
        other => panic!("expected analysis frame, got {other:?}"),
    }
}

#[test]
fn unknown_profile_rejected_and_session_unchanged() {
    let mut rig = Rig::new();
    rig.handle(AppCommand::SetProfile("atlantis".into()), 0);

    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::CommandRejected(CommandError::UnknownTarget)
    )));
    assert_eq!(rig.svc.active_profile_name(), "jabalpur");
}

#[test]
fn malformed_link_frames_never_reach_the_service() {
    let mut rig = Rig::new();
    // The dispatch loop drops undecodable lines before command mapping.
    for line in ["", "{oops", r#"{"cmd":"format_disk"}"#] {
        assert!(decode_command(line).is_err());
    }
    assert_eq!(rig.svc.analysis_count(), 0);
    rig.handle(AppCommand::ReportStatus, 0);
    assert_eq!(rig.link.sent.len(), 1);
}

#[test]
fn decoded_client_commands_map_onto_service_commands() {
    let cmd: AppCommand = decode_command(r#"{"cmd":"analyze"}"#).unwrap().into();
    assert!(matches!(cmd, AppCommand::RunAnalysis(TriggerOrigin::Link)));

    let cmd: AppCommand = decode_command(
        r#"{"cmd":"set_credentials","ssid":"a","secret":"b"}"#,
    )
    .unwrap()
    .into();
    assert!(matches!(cmd, AppCommand::UpdateCredentials(_)));

    let cmd: AppCommand = ClientCommand::SetProfile { name: "mumbai".into() }.into();
    assert!(matches!(cmd, AppCommand::SetProfile(name) if name == "mumbai"));
}
