// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crew startup preference, a small natural-language surface.
//!
//! Warband settings carry a `crew_startup` string consulted by
//! `up --restore`: `"none"`, `"all"`, `"pick one"`, or a list of crew
//! names joined by commas and/or `and`, optionally followed by
//! `but not <list>`. The surface is deliberate and parsed verbatim;
//! unknown names are ignored at selection time rather than rejected.

use serde::{Deserialize, Serialize};

/// Parsed crew startup preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrewStartup {
    /// Start nobody.
    #[default]
    None,
    /// Start the whole roster.
    All,
    /// Start the first roster entry.
    PickOne,
    /// Start `include` (or the whole roster when `include` is `["all"]`),
    /// minus `exclude`.
    List {
        include: Vec<String>,
        exclude: Vec<String>,
    },
}

impl CrewStartup {
    /// Parse a preference string. Whitespace-tolerant; keywords are
    /// case-insensitive; names keep their exact spelling.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CrewStartup::None;
        }
        let lowered = trimmed.to_ascii_lowercase();
        match lowered.as_str() {
            "none" => return CrewStartup::None,
            "all" => return CrewStartup::All,
            "pick one" => return CrewStartup::PickOne,
            _ => {}
        }

        let (include_part, exclude_part) = match split_but_not(trimmed) {
            Some((inc, exc)) => (inc, Some(exc)),
            None => (trimmed, None),
        };

        let include = split_names(include_part);
        let exclude = exclude_part.map(split_names).unwrap_or_default();

        if include.is_empty() && exclude.is_empty() {
            return CrewStartup::None;
        }
        CrewStartup::List { include, exclude }
    }

    /// Select crew to start from `roster`, preserving roster order.
    pub fn select<'a>(&self, roster: &'a [String]) -> Vec<&'a str> {
        match self {
            CrewStartup::None => Vec::new(),
            CrewStartup::All => roster.iter().map(String::as_str).collect(),
            CrewStartup::PickOne => roster.iter().take(1).map(String::as_str).collect(),
            CrewStartup::List { include, exclude } => {
                let everyone = include.iter().any(|n| n.eq_ignore_ascii_case("all"));
                roster
                    .iter()
                    .map(String::as_str)
                    .filter(|name| everyone || include.iter().any(|i| i == name))
                    .filter(|name| !exclude.iter().any(|e| e == name))
                    .collect()
            }
        }
    }
}

/// Split on the first `but not`, matched case-insensitively on word
/// boundaries (so a crew member literally named `butnot` is unaffected).
fn split_but_not(input: &str) -> Option<(&str, &str)> {
    let lowered = input.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(rel) = lowered[search_from..].find("but not") {
        let idx = search_from + rel;
        let before_ok = idx == 0
            || lowered[..idx]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let after = idx + "but not".len();
        let after_ok = lowered[after..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace);
        if before_ok && after_ok {
            return Some((&input[..idx], &input[after..]));
        }
        search_from = after;
    }
    None
}

/// Split a name list on commas and the word `and`.
fn split_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .flat_map(|chunk| chunk.split_whitespace())
        .filter(|word| !word.eq_ignore_ascii_case("and"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "startup_pref_tests.rs"]
mod tests;
