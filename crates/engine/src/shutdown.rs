// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Level-gated shutdown with uncommitted-work protection.
//!
//! One shutdown per encampment at a time, enforced by a file lock held
//! for the whole operation. The session set is snapshotted once up
//! front; per-agent existence checks run against the snapshot instead of
//! a subprocess each. Kills are ordered shaman → everything else
//! (parallel) → warchief, so the health-checker cannot resurrect agents
//! mid-shutdown and the coordinator outlives its fleet. Every kill is
//! independent: failures are recorded, never short-circuited.

use crate::error::EngineError;
use crate::events::{EventKind, EventLog};
use crate::lifecycle::{CANCEL_KEY, GRACEFUL_INTERRUPT_PAUSE};
use crate::workspace::Workspace;
use fs2::FileExt;
use hd_adapters::{Multiplexer, Vcs};
use hd_core::{is_horde_session, parse_session_name, Role};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// How long to poll for the shutdown lock before giving up.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval while waiting for the shutdown lock.
pub const LOCK_POLL: Duration = Duration::from_millis(100);

/// Wait before the `--all` respawn re-check.
const RESPAWN_CHECK_DELAY: Duration = Duration::from_millis(500);

/// Env var acknowledging a multiplexer-server kill.
pub const NUKE_ACK_ENV: &str = "HD_NUKE_ACKNOWLEDGED";

/// Severity levels of a shutdown.
#[derive(Debug, Clone, Default)]
pub struct ShutdownOptions {
    /// Stop raider sessions too.
    pub stop_raiders: bool,
    /// Stop ONLY raider sessions.
    pub raiders_only: bool,
    /// Remove raider worktrees and branches after stopping.
    pub cleanup_worktrees: bool,
    /// Stop the daemon and verify nothing respawned.
    pub stop_daemon: bool,
    /// Kill the entire multiplexer server (requires the ack env var).
    pub nuke: bool,
    /// Discard uncommitted raider work instead of refusing.
    pub nuclear: bool,
    /// Compute and report targets without touching anything.
    pub dry_run: bool,
}

/// What a shutdown did.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Sessions in kill order with each kill's outcome.
    pub killed: Vec<(String, Result<(), String>)>,
    /// Raider worktrees removed (cleanup scope only).
    pub cleaned: Vec<String>,
    /// Cleanup problems (best-effort phase).
    pub cleanup_warnings: Vec<String>,
    pub daemon_stopped: bool,
    pub server_killed: bool,
    /// Sessions found alive again at the respawn re-check.
    pub respawned: Vec<String>,
    pub dry_run: bool,
}

impl ShutdownReport {
    /// Aggregate success: every kill OK and nothing respawned.
    pub fn ok(&self) -> bool {
        self.killed.iter().all(|(_, r)| r.is_ok()) && self.respawned.is_empty()
    }
}

/// Exclusive shutdown lock (file lock at `daemon/shutdown.lock`).
///
/// Held for the entire operation; released on drop.
#[derive(Debug)]
pub struct ShutdownLock {
    // NOTE(lifetime): held to keep the exclusive flock; released on drop
    #[allow(dead_code)]
    file: std::fs::File,
    path: PathBuf,
}

impl ShutdownLock {
    /// Acquire with a poll loop; refuse once the timeout elapses.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
        }
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| EngineError::io(path, e))?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    })
                }
                Err(_) if Instant::now() < deadline => std::thread::sleep(LOCK_POLL),
                Err(_) => {
                    return Err(EngineError::ShutdownLockHeld {
                        path: path.to_path_buf(),
                    })
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The shutdown coordinator.
#[derive(Clone)]
pub struct ShutdownCoordinator<M, V> {
    ws: Workspace,
    mux: M,
    vcs: V,
}

impl<M: Multiplexer, V: Vcs> ShutdownCoordinator<M, V> {
    pub fn new(ws: Workspace, mux: M, vcs: V) -> Self {
        Self { ws, mux, vcs }
    }

    /// Run a shutdown at the level described by `opts`.
    pub async fn run(&self, opts: &ShutdownOptions) -> Result<ShutdownReport, EngineError> {
        if opts.nuke && std::env::var(NUKE_ACK_ENV).as_deref() != Ok("1") {
            return Err(EngineError::NukeNotAcknowledged);
        }

        // Snapshot once; O(1) membership checks from here on.
        let snapshot = self.mux.list_sessions().await?;
        let horde: Vec<String> = snapshot
            .iter()
            .filter(|s| is_horde_session(s))
            .cloned()
            .collect();

        let raiders_in_scope = opts.stop_raiders || opts.raiders_only || opts.cleanup_worktrees;

        if opts.dry_run {
            let mut report = ShutdownReport {
                dry_run: true,
                ..ShutdownReport::default()
            };
            for session in self.kill_plan(&horde, opts) {
                report.killed.push((session, Ok(())));
            }
            return Ok(report);
        }

        // Mutual exclusion for the entire operation.
        let _lock = ShutdownLock::acquire(&self.ws.shutdown_lock_path(), LOCK_TIMEOUT)?;

        // Uncommitted-work guard runs before ANY kill: a refused warband
        // aborts the whole shutdown with nothing stopped.
        if raiders_in_scope && !opts.nuclear {
            self.guard_uncommitted_work().await?;
        }

        let mut report = ShutdownReport::default();
        let plan = self.kill_plan(&horde, opts);

        // Phase a: shaman first so it cannot restart the others.
        let mut rest = Vec::new();
        let mut warchief_last = None;
        for session in plan {
            match session.as_str() {
                "hq-shaman" => {
                    let result = self.kill_one(&session).await;
                    report.killed.push((session, result));
                }
                "hq-warchief" => warchief_last = Some(session),
                _ => rest.push(session),
            }
        }

        // Phase b: everything else in parallel.
        let mut pool: JoinSet<(String, Result<(), String>)> = JoinSet::new();
        for session in rest {
            let mux = self.mux.clone();
            pool.spawn(async move {
                let result = kill_session(&mux, &session).await;
                (session, result)
            });
        }
        let mut parallel_results = Vec::new();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(result) => parallel_results.push(result),
                Err(e) => tracing::error!(error = %e, "kill task panicked"),
            }
        }
        parallel_results.sort_by(|a, b| a.0.cmp(&b.0));
        report.killed.extend(parallel_results);

        // Phase c: warchief last.
        if let Some(session) = warchief_last {
            let result = self.kill_one(&session).await;
            report.killed.push((session, result));
        }

        if opts.cleanup_worktrees {
            self.cleanup_raider_worktrees(&mut report).await;
        }

        if opts.stop_daemon || opts.cleanup_worktrees {
            match crate::daemon::DaemonHandle::new(&self.ws).stop() {
                Ok(_) => report.daemon_stopped = true,
                Err(e) => report
                    .cleanup_warnings
                    .push(format!("daemon stop failed: {}", e)),
            }
        }

        if opts.stop_daemon {
            // An external supervisor may be resurrecting sessions; give it
            // a beat and look again.
            tokio::time::sleep(RESPAWN_CHECK_DELAY).await;
            let after = self.mux.list_sessions().await.unwrap_or_default();
            for (session, result) in &report.killed {
                if result.is_ok() && after.iter().any(|s| s == session) {
                    report.respawned.push(session.clone());
                }
            }
            if !report.respawned.is_empty() {
                tracing::warn!(
                    sessions = ?report.respawned,
                    "sessions respawned after shutdown; external supervisor suspected"
                );
            }
        }

        if opts.nuke {
            self.mux.kill_server().await?;
            report.server_killed = true;
        }

        let stopped: Vec<String> = report
            .killed
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(s, _)| s.clone())
            .collect();
        EventLog::new(self.ws.events_path()).emit(EventKind::Halt { stopped }, None);

        Ok(report)
    }

    /// Ordered kill targets for a level: shaman, then the middle bucket,
    /// then warchief.
    fn kill_plan(&self, horde: &[String], opts: &ShutdownOptions) -> Vec<String> {
        let raiders_in_scope = opts.stop_raiders || opts.raiders_only || opts.cleanup_worktrees;
        let mut plan = Vec::new();
        for session in horde {
            let Some(role) = parse_session_name(session) else {
                continue;
            };
            let is_raider = matches!(role, Role::Raider { .. });
            if opts.raiders_only {
                if is_raider {
                    plan.push(session.clone());
                }
                continue;
            }
            if is_raider && !raiders_in_scope {
                continue;
            }
            plan.push(session.clone());
        }
        // shaman first, warchief last, middle in stable name order
        plan.sort_by_key(|s| {
            (
                match s.as_str() {
                    "hq-shaman" => 0u8,
                    "hq-warchief" => 2,
                    _ => 1,
                },
                s.clone(),
            )
        });
        plan
    }

    async fn kill_one(&self, session: &str) -> Result<(), String> {
        kill_session(&self.mux, session).await
    }

    /// Guard: any raider with uncommitted work refuses the operation.
    async fn guard_uncommitted_work(&self) -> Result<(), EngineError> {
        let mut offenders = Vec::new();
        let mut dirty_warbands = Vec::new();
        for config in self.ws.registry.sorted() {
            let raiders_dir = config.dir(self.ws.root()).join("raiders");
            let Ok(entries) = std::fs::read_dir(&raiders_dir) else {
                continue;
            };
            let mut dirty_here = false;
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                match self.vcs.check_uncommitted(&path).await {
                    Ok(work) if !work.clean() => {
                        dirty_here = true;
                        offenders.push((name, work.summary()));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // Not a git checkout (or git failed): nothing we
                        // could lose, but note it.
                        tracing::debug!(raider = %name, error = %e, "uncommitted-work probe failed");
                    }
                }
            }
            if dirty_here {
                dirty_warbands.push(config.name.clone());
            }
        }
        if offenders.is_empty() {
            return Ok(());
        }
        Err(EngineError::UncommittedWorkRefused {
            warband: dirty_warbands.join(", "),
            offenders,
        })
    }

    /// Best-effort removal of raider worktrees and branches from the
    /// warchief's clone.
    async fn cleanup_raider_worktrees(&self, report: &mut ShutdownReport) {
        for config in self.ws.registry.sorted() {
            let clone = self.ws.warchief_clone(config);
            let raiders_dir = config.dir(self.ws.root()).join("raiders");
            let Ok(entries) = std::fs::read_dir(&raiders_dir) else {
                continue;
            };
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                let label = format!("{}/{}", config.name, name);
                if let Err(e) = self.vcs.worktree_remove(&clone, &path).await {
                    report
                        .cleanup_warnings
                        .push(format!("{}: worktree remove failed: {}", label, e));
                    continue;
                }
                if let Err(e) = self
                    .vcs
                    .delete_branch(&clone, &format!("raiders/{}", name))
                    .await
                {
                    report
                        .cleanup_warnings
                        .push(format!("{}: branch delete failed: {}", label, e));
                }
                report.cleaned.push(label);
            }
        }
    }
}

/// One kill: best-effort cancel key, a beat for it to land, then a hard
/// kill including pane child processes. A session already gone is OK.
async fn kill_session<M: Multiplexer>(mux: &M, session: &str) -> Result<(), String> {
    let _ = mux.send_keys_raw(session, CANCEL_KEY).await;
    tokio::time::sleep(GRACEFUL_INTERRUPT_PAUSE).await;
    mux.kill_session_with_processes(session)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
