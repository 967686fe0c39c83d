// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::path::Path;
use yare::parameterized;

#[parameterized(
    backtick = { "a`b", "a\\`b" },
    dollar = { "a$b", "a\\$b" },
    quote = { "a\"b", "a\\\"b" },
    backslash = { "a\\b", "a\\\\b" },
    plain = { "plain text", "plain text" },
)]
fn shell_escape_cases(input: &str, expected: &str) {
    assert_eq!(escape_for_shell_double_quotes(input), expected);
}

#[test]
fn identity_env_for_warchief() {
    let env = identity_env(&Role::Warchief);
    assert!(env.contains(&("HD_ROLE".to_string(), "warchief".to_string())));
    assert!(env.contains(&("BD_ACTOR".to_string(), "warchief".to_string())));
    assert!(env.contains(&("BD_AUTHOR".to_string(), "warchief".to_string())));
    assert!(!env.iter().any(|(k, _)| k == "HD_WARBAND"));
}

#[test]
fn identity_env_for_raider() {
    let role = Role::Raider {
        warband: "greenplace".to_string(),
        name: "toast".to_string(),
    };
    let env = identity_env(&role);
    assert!(env.contains(&("HD_ROLE".to_string(), "raider".to_string())));
    assert!(env.contains(&("BD_ACTOR".to_string(), "greenplace/toast".to_string())));
    assert!(env.contains(&("BD_AUTHOR".to_string(), "toast".to_string())));
    assert!(env.contains(&("HD_WARBAND".to_string(), "greenplace".to_string())));
    assert!(env.contains(&("HD_RAIDER".to_string(), "toast".to_string())));
}

#[test]
fn identity_env_for_crew_sets_crew_var() {
    let role = Role::Crew {
        warband: "greenplace".to_string(),
        name: "joe".to_string(),
    };
    let env = identity_env(&role);
    assert!(env.contains(&("HD_CREW".to_string(), "joe".to_string())));
    assert!(!env.iter().any(|(k, _)| k == "HD_RAIDER"));
}

#[test]
fn start_command_quotes_beacon() {
    let cmd = start_command("claude", "do the \"thing\"");
    assert_eq!(cmd, "exec claude \"do the \\\"thing\\\"\"");
}

#[test]
fn respawn_command_cds_exports_and_execs() {
    let env = vec![
        ("HD_ROLE".to_string(), "warchief".to_string()),
        ("BD_ACTOR".to_string(), "warchief".to_string()),
    ];
    let cmd = respawn_command(Path::new("/camp"), &env, "claude", "take over");

    assert!(cmd.starts_with("cd /camp && export "));
    assert!(cmd.contains("HD_ROLE=\"warchief\""));
    assert!(cmd.contains("BD_ACTOR=\"warchief\""));
    assert!(cmd.ends_with("&& exec claude \"take over\""));
}

#[test]
fn respawn_command_without_env_skips_export() {
    let cmd = respawn_command(Path::new("/camp"), &[], "claude", "b");
    assert_eq!(cmd, "cd /camp && exec claude \"b\"");
}

#[test]
fn respawn_command_quotes_odd_paths() {
    let cmd = respawn_command(Path::new("/camp site/a"), &[], "claude", "b");
    assert!(cmd.starts_with("cd \"/camp site/a\""));
}

#[test]
fn beacons_point_at_rally() {
    for role in [
        Role::Warchief,
        Role::Shaman,
        Role::Witness {
            warband: "g".to_string(),
        },
    ] {
        assert!(startup_beacon(&role).contains("hd rally"));
        assert!(handoff_beacon(&role).contains("hd rally"));
    }
    assert!(handoff_beacon(&Role::Warchief).contains("predecessor"));
}

#[test]
#[serial(runtime_env)]
fn propagated_env_forwards_only_set_vars() {
    let runtime = hd_core::RuntimeConfig::default();
    std::env::remove_var("ANTHROPIC_API_KEY");
    std::env::remove_var("CLAUDE_CONFIG_DIR");
    std::env::set_var("AWS_PROFILE", "bedrock-dev");

    let env = propagated_runtime_env(&runtime);

    std::env::remove_var("AWS_PROFILE");
    assert!(env.contains(&("AWS_PROFILE".to_string(), "bedrock-dev".to_string())));
    assert!(!env.iter().any(|(k, _)| k == "ANTHROPIC_API_KEY"));
    assert!(!env.iter().any(|(k, _)| k == "CLAUDE_CONFIG_DIR"));
}

#[test]
#[serial(runtime_env)]
fn propagated_env_forwards_config_dir_when_set() {
    let runtime = hd_core::RuntimeConfig::default();
    std::env::set_var("CLAUDE_CONFIG_DIR", "/configs/claude");

    let env = propagated_runtime_env(&runtime);

    std::env::remove_var("CLAUDE_CONFIG_DIR");
    assert!(env.contains(&("CLAUDE_CONFIG_DIR".to_string(), "/configs/claude".to_string())));
}
