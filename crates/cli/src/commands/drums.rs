// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hd drums` - Message bus passthrough

use crate::context::Context;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::{Args, Subcommand};
use hd_adapters::MessageBus;
use hd_core::{Message, MessageKind, NewMessage};

#[derive(Args)]
pub struct DrumsArgs {
    #[command(subcommand)]
    pub command: DrumsCommand,
}

#[derive(Subcommand)]
pub enum DrumsCommand {
    /// Send a message
    Send {
        /// Recipient address (e.g. `greenplace/toast`, `warchief/`)
        to: String,
        /// Subject line
        #[arg(short, long)]
        subject: String,
        /// Body
        #[arg(short, long, default_value = "")]
        message: String,
    },
    /// List your inbox
    Inbox {
        /// Only unread messages
        #[arg(long)]
        unread: bool,
    },
    /// Read one message (marks it read)
    Read { id: String },
    /// Delete a message
    Delete { id: String },
    /// Reply to a message
    Reply {
        id: String,
        /// Body
        #[arg(short, long)]
        message: String,
    },
    /// List a thread
    Thread { id: String },
    /// Unread teaser (used by rally; exits 1 when empty)
    Check {
        /// Teaser formatted for runtime injection
        #[arg(long)]
        inject: bool,
    },
}

fn own_address(ctx: &Context) -> Result<String> {
    ctx.location
        .role
        .address()
        .map(|a| a.into_inner())
        .ok_or_else(|| anyhow::anyhow!("no agent here; drums need an agent address"))
}

fn render_message(message: &Message, full: bool) {
    let marker = if message.read { ' ' } else { '*' };
    println!(
        "{} {}  {}  {}  {}",
        marker,
        message.id,
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.from,
        message.subject
    );
    if full && !message.body.is_empty() {
        println!("{}", message.body);
    }
}

pub async fn handle(command: DrumsCommand, ctx: &Context, format: OutputFormat) -> Result<()> {
    let me = own_address(ctx)?;
    match command {
        DrumsCommand::Send {
            to,
            subject,
            message,
        } => {
            let id = ctx
                .drums
                .send(&me, NewMessage::new(to, subject, message))
                .await?;
            println!("sent {}", id);
        }
        DrumsCommand::Inbox { unread } => {
            let messages = if unread {
                ctx.drums.list_unread(&me).await?
            } else {
                ctx.drums.list(&me).await?
            };
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&messages)?);
                return Ok(());
            }
            if messages.is_empty() {
                println!("No messages");
                return Err(ExitError::silent(1).into());
            }
            for message in &messages {
                render_message(message, false);
            }
        }
        DrumsCommand::Read { id } => {
            let message = ctx.drums.get(&me, &id).await?;
            render_message(&message, true);
            ctx.drums.mark_read(&me, &id).await?;
        }
        DrumsCommand::Delete { id } => {
            ctx.drums.delete(&me, &id).await?;
            println!("deleted {}", id);
        }
        DrumsCommand::Reply { id, message } => {
            let original = ctx.drums.get(&me, &id).await?;
            let mut reply = NewMessage::new(
                original.from.clone(),
                format!("Re: {}", original.subject),
                message,
            )
            .kind(MessageKind::Note);
            reply.reply_to = Some(id);
            let new_id = ctx.drums.send(&me, reply).await?;
            println!("sent {}", new_id);
        }
        DrumsCommand::Thread { id } => {
            let messages = ctx.drums.list_by_thread(&me, &id).await?;
            if messages.is_empty() {
                println!("No messages in thread {}", id);
                return Err(ExitError::silent(1).into());
            }
            for message in &messages {
                render_message(message, false);
            }
        }
        DrumsCommand::Check { inject } => match ctx.drums.check_teaser(&me).await? {
            Some(teaser) => {
                if inject {
                    println!("<unread-drums>{}</unread-drums>", teaser);
                } else {
                    println!("{}", teaser);
                }
            }
            None => {
                return Err(ExitError::silent(1).into());
            }
        },
    }
    Ok(())
}
