// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd escalate` - Raise an issue to the warchief

use crate::context::Context;
use anyhow::Result;
use clap::Args;
use hd_adapters::relics::RELICS_DIR_NAME;
use hd_adapters::{IssueStore, MessageBus};
use hd_core::{MessageKind, NewIssue, NewMessage, Role};
use hd_engine::{EventKind, EventLog};

#[derive(Args)]
pub struct EscalateArgs {
    /// What needs the warchief's attention
    pub subject: String,

    /// Details
    #[arg(short, long, default_value = "")]
    pub message: String,
}

pub async fn handle(args: EscalateArgs, ctx: &Context) -> Result<()> {
    let from = ctx
        .location
        .role
        .address()
        .map(|a| a.into_inner())
        .unwrap_or_else(|| "unknown".to_string());
    let warchief = Role::Warchief
        .address()
        .map(|a| a.into_inner())
        .unwrap_or_default();

    // The escalation lives in the encampment store, labeled so the
    // warchief's rally surfaces it.
    let store = ctx.ws.root().join(RELICS_DIR_NAME);
    let bead = ctx
        .relics
        .create(
            &store,
            "escalation",
            NewIssue::new(args.subject.clone())
                .with_description(args.message.clone())
                .with_assignee(warchief.clone())
                .with_label("escalation"),
        )
        .await?;

    EventLog::new(ctx.ws.events_path()).emit(
        EventKind::Escalation {
            bead: bead.as_str().to_string(),
        },
        Some(&from),
    );

    // Best-effort drum so an attached warchief hears about it now.
    let note = NewMessage::new(warchief, format!("ESCALATION: {}", args.subject), args.message)
        .kind(MessageKind::Escalation);
    if let Err(e) = ctx.drums.send(&from, note).await {
        tracing::warn!(error = %e, "escalation drum failed; bead still filed");
    }

    println!("escalated as {}", bead);
    Ok(())
}
