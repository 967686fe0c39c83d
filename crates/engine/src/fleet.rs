// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet orchestration: parallel fan-out over warbands and agents.
//!
//! `up` boots the encampment in two phases: a 4-way concurrent gate
//! (daemon, shaman, warchief, warband prefetch) whose results print
//! before anything else, then witness/forge starts pushed through a
//! bounded pool so external spawns never stampede the multiplexer.
//! Results are collected per agent and rendered stable by warband name;
//! failures never short-circuit the remaining fan-out.

use crate::daemon::{DaemonHandle, DaemonState};
use crate::error::EngineError;
use crate::lifecycle::{
    AgentState, CrewManager, ForgeManager, Lifecycle, RaiderManager, ShamanManager, StartOptions,
    StartOutcome, WarchiefManager, WitnessManager,
};
use crate::opsgate;
use crate::workspace::Workspace;
use hd_adapters::{IssueStore, Multiplexer, Vcs};
use hd_core::{
    parse_session_name, validate_raider_name, CrewStartup, GateState, IssueFilter, IssueStatus,
    Role, SessionName, WarbandConfig,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cap on concurrent agent starts; bounds subprocess pressure and keeps
/// the multiplexer from thrashing.
pub const START_POOL_CAP: usize = 10;

/// Serialized line sink shared by concurrent tasks.
pub trait Reporter: Send + Sync {
    fn line(&self, line: &str);
}

/// Reporter printing to stdout, one whole line per call.
#[derive(Default)]
pub struct StdoutReporter {
    guard: Mutex<()>,
}

impl StdoutReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for StdoutReporter {
    fn line(&self, line: &str) {
        let _held = self.guard.lock();
        println!("{}", line);
    }
}

/// Reporter collecting lines for assertions.
#[derive(Default, Clone)]
pub struct BufferReporter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl BufferReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Reporter for BufferReporter {
    fn line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

/// Options for `up`.
#[derive(Debug, Clone, Default)]
pub struct UpOptions {
    /// Also restore crew (per startup preference) and pinned raiders.
    pub restore: bool,
    pub start: StartOptions,
}

/// One agent's start result, stringified for aggregation.
pub type TaskOutcome = Result<StartOutcome, String>;

/// Per-warband result bucket from the pool phase.
#[derive(Debug, Default)]
pub struct WarbandUpReport {
    pub witness: Option<TaskOutcome>,
    pub forge: Option<TaskOutcome>,
    /// Set when the operational-state gate skipped the warband.
    pub skipped: Option<GateState>,
}

impl WarbandUpReport {
    fn ok(&self) -> bool {
        let fine = |o: &Option<TaskOutcome>| o.as_ref().is_none_or(|r| r.is_ok());
        fine(&self.witness) && fine(&self.forge)
    }
}

/// Aggregate result of an `up`.
#[derive(Debug)]
pub struct UpReport {
    pub daemon: Result<(), String>,
    pub shaman: TaskOutcome,
    pub warchief: TaskOutcome,
    pub warbands: BTreeMap<String, WarbandUpReport>,
    /// `--restore` results: (label, outcome).
    pub restored: Vec<(String, TaskOutcome)>,
}

impl Default for UpReport {
    fn default() -> Self {
        Self {
            daemon: Ok(()),
            shaman: Ok(StartOutcome::AlreadyRunning),
            warchief: Ok(StartOutcome::AlreadyRunning),
            warbands: BTreeMap::new(),
            restored: Vec::new(),
        }
    }
}

impl UpReport {
    /// True iff every task succeeded; partial failure exits non-zero.
    pub fn ok(&self) -> bool {
        self.daemon.is_ok()
            && self.shaman.is_ok()
            && self.warchief.is_ok()
            && self.warbands.values().all(WarbandUpReport::ok)
            && self.restored.iter().all(|(_, r)| r.is_ok())
    }
}

/// One discovered agent in a status sweep.
#[derive(Debug, Clone)]
pub struct AgentReport {
    pub role: Role,
    pub session: SessionName,
    pub state: AgentState,
}

/// Fleet-wide status snapshot.
#[derive(Debug, Clone)]
pub struct FleetStatus {
    pub daemon: DaemonState,
    pub agents: Vec<AgentReport>,
}

fn outcome_label(outcome: &TaskOutcome) -> String {
    match outcome {
        Ok(StartOutcome::Started) => "started".to_string(),
        Ok(StartOutcome::AlreadyRunning) => "already running".to_string(),
        Ok(StartOutcome::Respawned) => "respawned".to_string(),
        Err(e) => format!("failed: {}", e),
    }
}

/// The fleet orchestrator.
#[derive(Clone)]
pub struct Fleet<M, I, V> {
    ws: Workspace,
    mux: M,
    relics: I,
    vcs: V,
}

impl<M: Multiplexer, I: IssueStore, V: Vcs> Fleet<M, I, V> {
    pub fn new(ws: Workspace, mux: M, relics: I, vcs: V) -> Self {
        Self {
            ws,
            mux,
            relics,
            vcs,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.ws
    }

    /// Boot the encampment.
    pub async fn up(&self, opts: &UpOptions, reporter: &dyn Reporter) -> Result<UpReport, EngineError> {
        if !self.mux.available().await {
            return Err(EngineError::MultiplexerUnavailable);
        }

        let mut report = UpReport::default();

        // Phase 1: daemon, shaman, warchief, and warband prefetch in a
        // 4-way fan-in.
        let daemon = DaemonHandle::new(&self.ws);
        let shaman = ShamanManager::new(self.ws.clone(), self.mux.clone())?;
        let warchief = WarchiefManager::new(self.ws.clone(), self.mux.clone())?;

        let (daemon_res, shaman_res, warchief_res, prefetched) = tokio::join!(
            async { daemon.ensure() },
            shaman.start(&opts.start),
            warchief.start(&opts.start),
            self.prefetch_warbands(),
        );

        report.daemon = daemon_res.map(|_| ()).map_err(|e| e.to_string());
        report.shaman = shaman_res.map_err(|e| e.to_string());
        report.warchief = warchief_res.map_err(|e| e.to_string());

        // Gate: phase-1 results print before any warband agent's.
        reporter.line(&format!(
            "daemon: {}",
            match &report.daemon {
                Ok(()) => "ok".to_string(),
                Err(e) => format!("failed: {}", e),
            }
        ));
        reporter.line(&format!("shaman: {}", outcome_label(&report.shaman)));
        reporter.line(&format!("warchief: {}", outcome_label(&report.warchief)));

        // Phase 2: witness/forge per warband through the bounded pool.
        let semaphore = Arc::new(Semaphore::new(START_POOL_CAP));
        let mut pool: JoinSet<(String, &'static str, TaskOutcome)> = JoinSet::new();

        for (config, gate) in &prefetched {
            let entry = report.warbands.entry(config.name.clone()).or_default();
            if !gate.state.allows_auto_start() {
                entry.skipped = Some(*gate);
                continue;
            }
            if config.has_witness {
                self.spawn_start(&mut pool, &semaphore, config.name.clone(), "witness", opts);
            }
            if config.has_forge {
                self.spawn_start(&mut pool, &semaphore, config.name.clone(), "forge", opts);
            }
        }

        while let Some(joined) = pool.join_next().await {
            let (warband, kind, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "agent start task panicked");
                    continue;
                }
            };
            let entry = report.warbands.entry(warband).or_default();
            match kind {
                "witness" => entry.witness = Some(outcome),
                _ => entry.forge = Some(outcome),
            }
        }

        // Stable rendering: warband name order, witness before forge.
        for (name, band) in &report.warbands {
            if let Some(gate) = &band.skipped {
                reporter.line(&format!("{}: skipped ({})", name, gate.state));
                continue;
            }
            if let Some(witness) = &band.witness {
                reporter.line(&format!("{}/witness: {}", name, outcome_label(witness)));
            }
            if let Some(forge) = &band.forge {
                reporter.line(&format!("{}/forge: {}", name, outcome_label(forge)));
            }
        }

        if opts.restore {
            self.restore(&prefetched, opts, reporter, &mut report).await;
        }

        Ok(report)
    }

    fn spawn_start(
        &self,
        pool: &mut JoinSet<(String, &'static str, TaskOutcome)>,
        semaphore: &Arc<Semaphore>,
        warband: String,
        kind: &'static str,
        opts: &UpOptions,
    ) {
        let ws = self.ws.clone();
        let mux = self.mux.clone();
        let relics = self.relics.clone();
        let start = opts.start.clone();
        let semaphore = Arc::clone(semaphore);
        pool.spawn(async move {
            // Pool cap: at most START_POOL_CAP concurrent external spawns
            let _permit = semaphore.acquire_owned().await;
            let outcome = match kind {
                "witness" => match WitnessManager::new(ws, &warband, mux, relics) {
                    Ok(manager) => manager.start(&start).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                },
                _ => match ForgeManager::new(ws, &warband, mux, relics) {
                    Ok(manager) => manager.start(&start).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                },
            };
            (warband, kind, outcome)
        });
    }

    /// Reload warband configs and resolve each one's operational gate.
    async fn prefetch_warbands(&self) -> Vec<(WarbandConfig, GateState)> {
        let registry = match hd_core::WarbandRegistry::load(self.ws.root()) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!(error = %e, "warband prefetch failed; using in-memory registry");
                self.ws.registry.clone()
            }
        };
        let mut out = Vec::new();
        for config in registry.sorted() {
            let gate = opsgate::gate_state(&self.ws, config, &self.relics).await;
            out.push((config.clone(), gate));
        }
        out
    }

    /// `--restore`: crew per startup preference, raiders with pinned work.
    async fn restore(
        &self,
        prefetched: &[(WarbandConfig, GateState)],
        opts: &UpOptions,
        reporter: &dyn Reporter,
        report: &mut UpReport,
    ) {
        for (config, gate) in prefetched {
            if !gate.state.allows_auto_start() {
                continue;
            }

            let pref = config
                .crew_startup
                .as_deref()
                .map(CrewStartup::parse)
                .unwrap_or_default();
            for name in pref.select(&config.crew) {
                let label = format!("{}/clan/{}", config.name, name);
                let outcome = match CrewManager::new(
                    self.ws.clone(),
                    &config.name,
                    name,
                    self.mux.clone(),
                    self.vcs.clone(),
                ) {
                    Ok(manager) => manager.start(&opts.start).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                reporter.line(&format!("{}: {}", label, outcome_label(&outcome)));
                report.restored.push((label, outcome));
            }

            for name in self.raiders_on_disk(config) {
                match self.raider_has_pinned_work(config, &name).await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        tracing::warn!(raider = %name, error = %e, "pinned-work probe failed");
                        continue;
                    }
                }
                let label = format!("{}/{}", config.name, name);
                let outcome = match RaiderManager::new(
                    self.ws.clone(),
                    &config.name,
                    &name,
                    self.mux.clone(),
                    self.relics.clone(),
                ) {
                    Ok(manager) => manager.start(&opts.start).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                reporter.line(&format!("{}: {}", label, outcome_label(&outcome)));
                report.restored.push((label, outcome));
            }
        }
    }

    /// Raider directory names under `<warband>/raiders/`.
    fn raiders_on_disk(&self, config: &WarbandConfig) -> Vec<String> {
        let dir = config.dir(self.ws.root()).join("raiders");
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| validate_raider_name(name).is_ok())
            .collect();
        names.sort();
        names
    }

    async fn raider_has_pinned_work(
        &self,
        config: &WarbandConfig,
        name: &str,
    ) -> Result<bool, EngineError> {
        let store = config
            .dir(self.ws.root())
            .join(hd_adapters::relics::RELICS_DIR_NAME);
        let address = format!("{}/{}", config.name, name);
        let pinned = self
            .relics
            .list(
                &store,
                IssueFilter {
                    status: Some(IssueStatus::Pinned),
                    assignee: Some(address.into()),
                    ..IssueFilter::default()
                },
            )
            .await?;
        Ok(!pinned.is_empty())
    }

    /// Discover fleet state from one session snapshot (no per-agent
    /// subprocess calls).
    pub async fn status(&self) -> Result<FleetStatus, EngineError> {
        let snapshot: HashSet<String> = self.mux.list_sessions().await?.into_iter().collect();
        let mut agents = Vec::new();

        let mut push = |role: Role| {
            if let Some(session) = role.session_name() {
                let state = if snapshot.contains(session.as_str()) {
                    AgentState::Running
                } else {
                    AgentState::Stopped
                };
                agents.push(AgentReport {
                    role,
                    session,
                    state,
                });
            }
        };

        push(Role::Warchief);
        push(Role::Shaman);

        for config in self.ws.registry.sorted() {
            let warband = config.name.clone();
            if config.has_witness {
                push(Role::Witness {
                    warband: warband.clone(),
                });
            }
            if config.has_forge {
                push(Role::Forge {
                    warband: warband.clone(),
                });
            }
            for crew in &config.crew {
                push(Role::Crew {
                    warband: warband.clone(),
                    name: crew.clone(),
                });
            }
            // Raiders: union of workspace directories and live sessions
            let mut raiders = self.raiders_on_disk(config);
            for session in &snapshot {
                if let Some(Role::Raider { warband: w, name }) = parse_session_name(session) {
                    if w == warband && !raiders.contains(&name) {
                        raiders.push(name);
                    }
                }
            }
            raiders.sort();
            for name in raiders {
                push(Role::Raider {
                    warband: warband.clone(),
                    name,
                });
            }
        }

        Ok(FleetStatus {
            daemon: DaemonHandle::new(&self.ws).state(),
            agents,
        })
    }

    /// Park a warband: stop witness and forge, then pin the local state.
    pub async fn park(&self, warband: &str) -> Result<(), EngineError> {
        let config = self.ws.warband(warband)?;
        let dir = config.dir(self.ws.root());

        if config.has_witness {
            let witness =
                WitnessManager::new(self.ws.clone(), warband, self.mux.clone(), self.relics.clone())?;
            let _ = witness.stop().await?;
        }
        if config.has_forge {
            let forge =
                ForgeManager::new(self.ws.clone(), warband, self.mux.clone(), self.relics.clone())?;
            let _ = forge.stop().await?;
        }

        opsgate::set_wisp_key(&dir, opsgate::STATUS_KEY, "parked")?;
        tracing::info!(warband, "warband parked");
        Ok(())
    }

    /// Unpark a warband: clear the local state so the gate falls back to
    /// the global layer (or the default).
    pub fn unpark(&self, warband: &str) -> Result<(), EngineError> {
        let config = self.ws.warband(warband)?;
        opsgate::clear_wisp_key(&config.dir(self.ws.root()), opsgate::STATUS_KEY)?;
        tracing::info!(warband, "warband unparked");
        Ok(())
    }

    /// Reset stale raider work across one warband (transient identities
    /// only; crew pins are never auto-reset).
    pub async fn reset_stale_work(&self, warband: &str) -> Result<Vec<String>, EngineError> {
        let config = self.ws.warband(warband)?.clone();
        let mut reset = Vec::new();
        for name in self.raiders_on_disk(&config) {
            let raider = RaiderManager::new(
                self.ws.clone(),
                warband,
                &name,
                self.mux.clone(),
                self.relics.clone(),
            )?;
            if raider.reset_stale_work().await? {
                reset.push(name);
            }
        }
        Ok(reset)
    }
}

#[cfg(test)]
#[path = "fleet_tests.rs"]
mod tests;
