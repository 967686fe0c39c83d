// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routing table and relics directory resolution.
//!
//! The routing table lives at `<root>/.relics/routes.jsonl`, one JSON
//! object per line. It is append-only: concurrent writers each append a
//! whole line and never rewrite the file. An agent's relics directory is
//! `<workdir>/.relics`; when that path is a plain file it is a redirect
//! (`redirect: <path>`) pointing at the real storage, typically the
//! warband-level store shared by its agents.

use super::RelicsError;
use hd_core::Route;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the relics storage directory under a workdir or root.
pub const RELICS_DIR_NAME: &str = ".relics";

const ROUTES_FILE: &str = "routes.jsonl";

fn routes_path(root: &Path) -> PathBuf {
    root.join(RELICS_DIR_NAME).join(ROUTES_FILE)
}

/// Load the routing table. A missing file is an empty table; malformed
/// lines are skipped with a warning; the last entry for a prefix wins.
pub fn load_routes(root: &Path) -> Result<Vec<Route>, RelicsError> {
    let path = routes_path(root);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(RelicsError::Io { path, source }),
    };

    let mut routes: Vec<Route> = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Route>(line) {
            Ok(route) => {
                routes.retain(|r| r.prefix != route.prefix);
                routes.push(route);
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = lineno + 1,
                    error = %e,
                    "skipping malformed route line"
                );
            }
        }
    }
    Ok(routes)
}

/// Append a route. Re-appending an identical route is a no-op; the same
/// prefix with a different path is a conflict.
pub fn append_route(root: &Path, route: &Route) -> Result<(), RelicsError> {
    let existing = load_routes(root)?;
    if let Some(found) = existing.iter().find(|r| r.prefix == route.prefix) {
        if found.path == route.path {
            return Ok(());
        }
        return Err(RelicsError::RouteConflict {
            prefix: route.prefix.clone(),
            existing: found.path.clone(),
            requested: route.path.clone(),
        });
    }

    let path = routes_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RelicsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let line = serde_json::to_string(route).map_err(|e| RelicsError::InvalidOutput(e.to_string()))?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| RelicsError::Io {
            path: path.clone(),
            source,
        })?;
    writeln!(file, "{}", line).map_err(|source| RelicsError::Io { path, source })?;
    Ok(())
}

/// Look up the warband path for a bead-id prefix.
pub fn route_for_prefix(root: &Path, prefix: &str) -> Result<Option<Route>, RelicsError> {
    Ok(load_routes(root)?.into_iter().find(|r| r.prefix == prefix))
}

/// Resolve the relics storage directory for a workdir, following
/// redirect files.
///
/// A redirect is a plain file at `<dir>/.relics` whose content is
/// `redirect: <path>` with `<path>` relative to the file's directory (or
/// absolute). A circular chain is broken by deleting the redirect file
/// that closed the cycle and returning the ORIGINAL directory, so the
/// agent still has usable storage.
pub fn resolve_relics_dir(workdir: &Path) -> Result<PathBuf, RelicsError> {
    if let Some(dir) = std::env::var_os("RELICS_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let original = workdir.join(RELICS_DIR_NAME);
    let mut current = original.clone();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(normalize(&current));

    loop {
        if !current.is_file() {
            // A directory (or nothing yet) is the final answer.
            return Ok(current);
        }
        let content = std::fs::read_to_string(&current).map_err(|source| RelicsError::Io {
            path: current.clone(),
            source,
        })?;
        let Some(target) = parse_redirect(&content) else {
            // Not a redirect file; treat the path as final and let the
            // store surface its own error.
            return Ok(current);
        };
        let base = current.parent().unwrap_or(Path::new("."));
        let next = if Path::new(&target).is_absolute() {
            PathBuf::from(&target)
        } else {
            base.join(&target)
        };
        let key = normalize(&next);
        if !seen.insert(key) {
            tracing::warn!(
                start = %original.display(),
                offending = %current.display(),
                "circular relics redirect; removing redirect file"
            );
            if let Err(e) = std::fs::remove_file(&current) {
                tracing::warn!(path = %current.display(), error = %e, "failed to remove redirect");
            }
            return Ok(original);
        }
        current = next;
    }
}

fn parse_redirect(content: &str) -> Option<String> {
    let line = content.lines().next()?.trim();
    line.strip_prefix("redirect:")
        .map(|rest| rest.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Lexical normalization for cycle detection; avoids canonicalize so a
/// dangling redirect target still terminates.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
