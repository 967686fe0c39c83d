// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime command assembly: beacons, identity env, and the shell lines
//! that start or respawn an agent's LLM runtime.

use hd_core::{Role, RuntimeConfig};

/// LLM-runtime environment propagated from the current process into a
/// fresh agent shell: API keys, profile, region, and model selector.
pub const RUNTIME_ENV_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "ANTHROPIC_AUTH_TOKEN",
    "AWS_PROFILE",
    "AWS_REGION",
    "ANTHROPIC_MODEL",
];

/// Escape characters that have special meaning in shell double-quoted
/// strings, so beacons and env values embed literally in `sh -c` lines.
pub fn escape_for_shell_double_quotes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '`' => result.push_str("\\`"),
            '$' => result.push_str("\\$"),
            '"' => result.push_str("\\\""),
            _ => result.push(c),
        }
    }
    result
}

/// Session-start beacon: steers a fresh runtime to load context via rally.
pub fn startup_beacon(role: &Role) -> String {
    let intro = match role {
        Role::Warchief => "You are the warchief, coordinator of this encampment.",
        Role::Shaman => "You are the shaman, health-checker of this encampment.",
        Role::Witness { .. } => "You are the witness, raider monitor for this warband.",
        Role::Forge { .. } => "You are the forge, merge-queue processor for this warband.",
        Role::Raider { .. } => "You are a raider, a task worker in this warband.",
        Role::Crew { .. } => "You are a crew member with a persistent workspace.",
        Role::Unknown => "You are an agent of this encampment.",
    };
    format!("{} Run `hd rally` now to load your role context and current work.", intro)
}

/// Handoff beacon: the successor must discover what its predecessor left.
pub fn handoff_beacon(role: &Role) -> String {
    format!(
        "You are taking over the {} session from a predecessor. \
         Run `hd rally` now: it carries the handoff context, your pinned \
         work, and unread messages.",
        role.class_str()
    )
}

/// `HD_*` and actor identity exported into every agent shell.
pub fn identity_env(role: &Role) -> Vec<(String, String)> {
    let mut env = vec![("HD_ROLE".to_string(), role.class_str().to_string())];
    if let Some(address) = role.address() {
        let actor = address.as_str().trim_end_matches('/').to_string();
        env.push(("BD_ACTOR".to_string(), actor));
    }
    if let Some(name) = role.agent_name() {
        env.push(("BD_AUTHOR".to_string(), name.to_string()));
    } else {
        env.push(("BD_AUTHOR".to_string(), role.class_str().to_string()));
    }
    if let Some(warband) = role.warband() {
        env.push(("HD_WARBAND".to_string(), warband.to_string()));
    }
    match role {
        Role::Raider { name, .. } => env.push(("HD_RAIDER".to_string(), name.clone())),
        Role::Crew { name, .. } => env.push(("HD_CREW".to_string(), name.clone())),
        _ => {}
    }
    env
}

/// Runtime env snapshot from the current process: the propagated set plus
/// the runtime's config-dir variable, forwarded only when actually set.
pub fn propagated_runtime_env(runtime: &RuntimeConfig) -> Vec<(String, String)> {
    let mut env = Vec::new();
    for key in RUNTIME_ENV_VARS {
        if let Ok(value) = std::env::var(key) {
            if !value.is_empty() {
                env.push((key.to_string(), value));
            }
        }
    }
    // Forward the config dir only if explicitly set; fabricating a default
    // would point the runtime at a config copy that has no auth in it.
    if let Ok(value) = std::env::var(&runtime.config_dir_env) {
        if !value.is_empty() {
            env.push((runtime.config_dir_env.clone(), value));
        }
    }
    env
}

/// Command run inside a fresh detached session: env arrives via the
/// multiplexer, so only the runtime invocation is in the line.
pub fn start_command(binary: &str, beacon: &str) -> String {
    format!(
        "exec {} \"{}\"",
        binary,
        escape_for_shell_double_quotes(beacon)
    )
}

/// Command for an in-place pane respawn: the pane gets a brand new shell,
/// so working directory and env must be re-established inline.
pub fn respawn_command(
    workdir: &std::path::Path,
    env: &[(String, String)],
    binary: &str,
    beacon: &str,
) -> String {
    let mut line = format!("cd {}", shell_quote_path(workdir));
    if !env.is_empty() {
        let exports = env
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_for_shell_double_quotes(v)))
            .collect::<Vec<_>>()
            .join(" ");
        line.push_str(&format!(" && export {}", exports));
    }
    line.push_str(&format!(
        " && exec {} \"{}\"",
        binary,
        escape_for_shell_double_quotes(beacon)
    ));
    line
}

fn shell_quote_path(path: &std::path::Path) -> String {
    let raw = path.display().to_string();
    if raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'))
    {
        raw
    } else {
        format!("\"{}\"", escape_for_shell_double_quotes(&raw))
    }
}

#[cfg(test)]
#[path = "runtime_cmd_tests.rs"]
mod tests;
