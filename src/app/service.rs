//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the scoring pipeline (Tri-Check, scoring engine,
//! safety override, trend tracker) and the session context. It exposes a
//! clean, hardware-agnostic API; all I/O flows through port traits injected
//! at call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SamplePort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        AppService          │
//!  LocationPort ─▶│ Tri-Check · Score · Override│──▶ LinkPort
//!                 └────────────────────────────┘
//! ```
//!
//! One analysis cycle is strictly sequential and synchronous: samples are
//! collected before means exist, means before scoring, scoring before the
//! override and assembly. At most one analysis runs at a time, enforced by
//! a busy flag plus a post-trigger cooldown.

use chrono::{DateTime, Datelike, Utc};
use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::{CommandError, Error};
use crate::events::TriggerOrigin;
use crate::link::DeviceFrame;
use crate::profile::{GeoProfile, ProfileRegistry, SeasonContext};
use crate::report::{AnalysisResult, Parameter, ParameterReading, ResultAssembler};
use crate::safety::SafetyOverride;
use crate::scoring::{ParameterMeans, ScoringEngine};
use crate::tricheck::TriCheck;
use crate::trend::TrendTracker;

use super::commands::{AppCommand, LinkCredentials};
use super::events::{AppEvent, StatusReport};
use super::ports::{EventSink, LinkPort, LocationProvider, SamplePort, SleepPort, StoragePort};

/// Storage namespace/key for link-provisioned network credentials.
const CRED_NAMESPACE: &str = "net";
const CRED_KEY: &str = "credentials";
const MAX_SSID_LEN: usize = 64;
const MAX_SECRET_LEN: usize = 128;

// ───────────────────────────────────────────────────────────────
// Session context
// ───────────────────────────────────────────────────────────────

/// Per-session state resolved once and read-only during scoring. Explicit
/// value, not a static — multiple virtual devices can coexist in a process.
#[derive(Debug, Clone)]
struct SessionContext {
    profile: GeoProfile,
    season: SeasonContext,
    city: Option<String>,
    resolved_from_fix: bool,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    registry: ProfileRegistry,
    /// Validated clone of the registry entry named by the config.
    default_profile: GeoProfile,
    tricheck: TriCheck,
    scoring: ScoringEngine,
    safety: SafetyOverride,
    trends: TrendTracker,
    session: Option<SessionContext>,
    /// Snapshot cache for status queries; single writer (the cycle itself).
    last_result: Option<AnalysisResult>,
    analysis_count: u32,
    busy: bool,
    last_trigger_ms: Option<u64>,
}

impl AppService {
    /// Construct the service. The config is range-checked here; a bad
    /// config is a construction error, never a scoring-time surprise.
    pub fn new(config: SystemConfig, registry: ProfileRegistry) -> Result<Self, Error> {
        config.validate().map_err(Error::Config)?;
        // The default profile must exist before any analysis can run.
        let default_profile = registry.get(&config.default_profile)?.clone();

        let tricheck = TriCheck::from_config(&config);
        let safety = SafetyOverride::from_config(&config);
        let scoring = ScoringEngine::new(config.clone());

        Ok(Self {
            config,
            registry,
            default_profile,
            tricheck,
            scoring,
            safety,
            trends: TrendTracker::new(),
            session: None,
            last_result: None,
            analysis_count: 0,
            busy: false,
            last_trigger_ms: None,
        })
    }

    // ── Session resolution ────────────────────────────────────

    /// Resolve the active profile and season for this session from a
    /// best-effort location/weather provider. Lookup failure is not an
    /// error: after bounded retries the service silently falls back to the
    /// configured default profile, observable via the result's profile name.
    pub fn begin_session(
        &mut self,
        locator: &mut impl LocationProvider,
        pacer: &mut impl SleepPort,
        sink: &mut impl EventSink,
        now: DateTime<Utc>,
    ) {
        let fix = self.with_retry(pacer, |l: &mut _| l.locate(), locator);
        let weather = self.with_retry(pacer, |l: &mut _| l.weather(), locator);

        let coords = fix.as_ref().map(|f| (f.lat, f.lon));
        let city = fix.and_then(|f| f.city);

        let profile = match self.registry.resolve(coords, &self.config.default_profile) {
            Ok(p) => p.clone(),
            // Unreachable for a validated config; the clone taken at
            // construction covers it anyway.
            Err(_) => self.default_profile.clone(),
        };

        let (ambient, raining) = weather
            .map(|w| (w.ambient_temperature, w.is_raining))
            .unwrap_or((25.0, false));
        let season = SeasonContext::new(now.month(), ambient, raining);

        info!(
            "session: profile '{}' ({}), season {}",
            profile.name,
            if coords.is_some() { "located" } else { "default" },
            season.season.label()
        );
        sink.emit(&AppEvent::ProfileResolved {
            profile: profile.name.clone(),
            from_fix: coords.is_some(),
        });

        self.session = Some(SessionContext {
            profile,
            season,
            city,
            resolved_from_fix: coords.is_some(),
        });
    }

    /// Bounded-attempt retry with doubling backoff for the best-effort
    /// provider. Absence must never block scoring, so this returns an
    /// `Option` rather than an error.
    fn with_retry<T, P>(
        &self,
        pacer: &mut impl SleepPort,
        mut op: impl FnMut(&mut P) -> Result<T, crate::error::CommsError>,
        provider: &mut P,
    ) -> Option<T> {
        let attempts = self.config.locator_attempts.max(1);
        let mut backoff = self.config.locator_backoff_ms;
        for attempt in 1..=attempts {
            match op(provider) {
                Ok(v) => return Some(v),
                Err(e) => {
                    if attempt < attempts {
                        warn!("provider attempt {attempt}/{attempts} failed ({e}); retrying");
                        pacer.sleep(core::time::Duration::from_millis(backoff));
                        backoff = backoff.saturating_mul(2);
                    } else {
                        warn!("provider unavailable after {attempts} attempts ({e}); falling back");
                    }
                }
            }
        }
        None
    }

    // ── Analysis cycle ────────────────────────────────────────

    /// Run one analysis cycle if the busy/cooldown guard allows it.
    /// `now_ms` is monotonic milliseconds (for the cooldown window);
    /// `timestamp` is the wall-clock stamp sealed into the result.
    pub fn try_run_analysis(
        &mut self,
        origin: TriggerOrigin,
        now_ms: u64,
        hw: &mut impl SamplePort,
        pacer: &mut impl SleepPort,
        sink: &mut impl EventSink,
        timestamp: DateTime<Utc>,
    ) -> Option<AnalysisResult> {
        if self.busy {
            sink.emit(&AppEvent::AnalysisRejected { origin, cooldown_remaining_ms: 0 });
            return None;
        }
        if let Some(last) = self.last_trigger_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.config.trigger_cooldown_ms {
                let remaining = self.config.trigger_cooldown_ms - elapsed;
                info!("trigger refused: cooling down for another {remaining} ms");
                sink.emit(&AppEvent::AnalysisRejected { origin, cooldown_remaining_ms: remaining });
                return None;
            }
        }

        self.busy = true;
        self.last_trigger_ms = Some(now_ms);
        sink.emit(&AppEvent::AnalysisStarted(origin));
        let result = self.run_cycle(hw, pacer, timestamp);
        self.busy = false;

        if !result.alerts.is_empty() {
            sink.emit(&AppEvent::AlertsRaised(result.alerts.clone()));
        }
        sink.emit(&AppEvent::AnalysisCompleted(result.clone()));
        Some(result)
    }

    /// The strictly sequential pipeline: Tri-Check each scored parameter,
    /// read temperature once, score, override, assemble.
    fn run_cycle(
        &mut self,
        hw: &mut impl SamplePort,
        pacer: &mut impl SleepPort,
        timestamp: DateTime<Utc>,
    ) -> AnalysisResult {
        let session = self.session.clone().unwrap_or_else(|| self.default_session(timestamp));

        // 1. Burst-sample the scored parameters, one exclusive Tri-Check
        //    each, sequentially. All readings land within one bounded window.
        let tds = self.tricheck.run(Parameter::Tds, || hw.sample(Parameter::Tds), pacer);
        let ph = self.tricheck.run(Parameter::Ph, || hw.sample(Parameter::Ph), pacer);
        let turbidity =
            self.tricheck.run(Parameter::Turbidity, || hw.sample(Parameter::Turbidity), pacer);
        let dox = self.tricheck.run(
            Parameter::DissolvedOxygen,
            || hw.sample(Parameter::DissolvedOxygen),
            pacer,
        );
        for burst in [&tds, &ph, &turbidity, &dox] {
            info!(
                "tri-check {}: mean {:.2} {} stability {:.1}%",
                burst.parameter.label(),
                burst.mean,
                burst.parameter.unit(),
                burst.stability
            );
        }

        let means = ParameterMeans {
            tds_ppm: tds.mean,
            ph: ph.mean,
            turbidity_ntu: turbidity.mean,
            dissolved_oxygen_mg_l: dox.mean,
        };
        // Overall confidence is the mean of the stabilities actually used.
        let stability =
            (tds.stability + ph.stability + turbidity.stability + dox.stability) / 4.0;

        // Temperature is diagnostic: a single read suffices.
        let temperature = hw.sample(Parameter::Temperature).max(0.0);

        // 2. Weighted score under the session profile.
        let weighted = self.scoring.score(&means, stability, &session.profile);

        // 3. Absolute safety override on the raw means.
        let outcome = self
            .safety
            .apply(weighted.score, weighted.verdict, &means, stability);

        // 4. Advisory alerts: override first, then season and trends.
        let mut alerts = outcome.alerts.clone();
        if let Some(seasonal) = session.season.advisory() {
            alerts.push(seasonal);
        }
        if let Some(drift) = self.trends.advisory() {
            alerts.push(drift);
        }

        // 5. Seal the result.
        let readings = vec![
            ParameterReading::new(Parameter::Tds, means.tds_ppm),
            ParameterReading::new(Parameter::Ph, means.ph),
            ParameterReading::new(Parameter::Turbidity, means.turbidity_ntu),
            ParameterReading::new(Parameter::Temperature, temperature),
            ParameterReading::new(Parameter::DissolvedOxygen, means.dissolved_oxygen_mg_l),
        ];
        let result = ResultAssembler {
            readings,
            stability,
            profile_name: &session.profile.name,
            city: session.city.as_deref(),
            season: session.season.season,
            alerts,
        }
        .assemble(outcome.score, outcome.verdict, timestamp);

        // 6. Bookkeeping after the fact, so the trend advisory above
        //    described the window *before* this cycle.
        self.trends.record(Parameter::Tds, means.tds_ppm);
        self.trends.record(Parameter::Ph, means.ph);
        self.trends.record(Parameter::Turbidity, means.turbidity_ntu);
        self.trends.record(Parameter::Temperature, temperature);
        self.trends
            .record(Parameter::DissolvedOxygen, means.dissolved_oxygen_mg_l);
        self.analysis_count += 1;
        self.last_result = Some(result.clone());

        info!(
            "analysis #{}: jal-score {} verdict {} (stability {:.1}%)",
            self.analysis_count,
            result.jal_score,
            result.verdict.label(),
            result.stability
        );
        result
    }

    /// Session used when no `begin_session` ran: default profile, season
    /// from the timestamp, no weather signal.
    fn default_session(&self, now: DateTime<Utc>) -> SessionContext {
        SessionContext {
            profile: self.default_profile.clone(),
            season: SeasonContext::new(now.month(), 25.0, false),
            city: None,
            resolved_from_fix: false,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the link client or dispatch loop).
    #[allow(clippy::too_many_arguments)]
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl SamplePort,
        pacer: &mut impl SleepPort,
        sink: &mut impl EventSink,
        link: &mut impl LinkPort,
        storage: &mut impl StoragePort,
        timestamp: DateTime<Utc>,
    ) {
        match cmd {
            AppCommand::RunAnalysis(origin) => {
                if let Some(result) =
                    self.try_run_analysis(origin, now_ms, hw, pacer, sink, timestamp)
                {
                    let frame = DeviceFrame::AnalysisResult { record: result.to_record() };
                    if let Err(e) = link.send(&frame) {
                        // Link loss never invalidates the analysis; the
                        // result stays cached for the next status query.
                        warn!("link: result delivery failed ({e})");
                    }
                }
            }

            AppCommand::ReportStatus => {
                let frame = DeviceFrame::Status { report: self.status_report(now_ms) };
                if let Err(e) = link.send(&frame) {
                    warn!("link: status delivery failed ({e})");
                }
            }

            AppCommand::UpdateCredentials(creds) => {
                self.update_credentials(creds, sink, storage);
            }

            AppCommand::SetProfile(name) => match self.registry.get(&name) {
                Ok(profile) => {
                    let profile = profile.clone();
                    info!("profile pinned to '{}' by command", profile.name);
                    let season = self
                        .session
                        .as_ref()
                        .map(|s| s.season)
                        .unwrap_or_else(|| SeasonContext::new(timestamp.month(), 25.0, false));
                    sink.emit(&AppEvent::ProfileResolved {
                        profile: profile.name.clone(),
                        from_fix: false,
                    });
                    self.session = Some(SessionContext {
                        profile,
                        season,
                        city: self.session.as_ref().and_then(|s| s.city.clone()),
                        resolved_from_fix: false,
                    });
                }
                Err(_) => {
                    warn!("command rejected: unknown profile '{name}'");
                    sink.emit(&AppEvent::CommandRejected(CommandError::UnknownTarget));
                }
            },
        }
    }

    /// Validate and persist link-provisioned credentials. The secret is
    /// opaque: it is stored as received and never logged in cleartext.
    fn update_credentials(
        &mut self,
        creds: LinkCredentials,
        sink: &mut impl EventSink,
        storage: &mut impl StoragePort,
    ) {
        if creds.ssid.is_empty()
            || creds.secret.is_empty()
            || creds.ssid.len() > MAX_SSID_LEN
            || creds.secret.len() > MAX_SECRET_LEN
        {
            warn!("command rejected: credential fields empty or oversized");
            sink.emit(&AppEvent::CommandRejected(CommandError::BadCredentials));
            return;
        }

        let bytes = match postcard::to_allocvec(&creds) {
            Ok(b) => b,
            Err(_) => {
                sink.emit(&AppEvent::CommandRejected(CommandError::BadCredentials));
                return;
            }
        };
        match storage.write(CRED_NAMESPACE, CRED_KEY, &bytes) {
            Ok(()) => {
                info!("network credentials updated (ssid '{}')", creds.ssid);
                sink.emit(&AppEvent::CredentialsUpdated { ssid: creds.ssid });
            }
            Err(e) => {
                warn!("credential store failed ({e})");
                sink.emit(&AppEvent::CommandRejected(CommandError::BadCredentials));
            }
        }
    }

    /// Load previously stored credentials, if any.
    pub fn stored_credentials(
        &self,
        storage: &impl StoragePort,
    ) -> Option<LinkCredentials> {
        let bytes = storage.read(CRED_NAMESPACE, CRED_KEY).ok()?;
        postcard::from_bytes(&bytes).ok()
    }

    // ── Queries (snapshot reads) ──────────────────────────────

    /// Build a readiness report from the current snapshot state.
    pub fn status_report(&self, uptime_ms: u64) -> StatusReport {
        StatusReport {
            ready: !self.busy,
            analyses_run: self.analysis_count,
            last_score: self.last_result.as_ref().map(|r| r.jal_score),
            last_verdict: self.last_result.as_ref().map(|r| r.verdict),
            profile: self.active_profile_name().to_string(),
            uptime_ms,
        }
    }

    /// Name of the profile the next analysis will score under.
    pub fn active_profile_name(&self) -> &str {
        self.session
            .as_ref()
            .map_or(self.config.default_profile.as_str(), |s| s.profile.name.as_str())
    }

    /// Whether the active profile came from a location fix (false also
    /// covers "no session yet").
    pub fn profile_from_fix(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.resolved_from_fix)
    }

    /// Snapshot of the most recent result.
    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    pub fn analysis_count(&self) -> u32 {
        self.analysis_count
    }
}
