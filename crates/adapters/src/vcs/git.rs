// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git adapter shelling out to the `git` binary.

use super::{UncommittedWork, Vcs, VcsError, VcsStatus};
use crate::subprocess::{run_with_timeout, GIT_TIMEOUT, GIT_WORKTREE_TIMEOUT};
use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Git adapter
#[derive(Clone, Default)]
pub struct GitVcs;

impl GitVcs {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
        op: &str,
    ) -> Result<Output, VcsError> {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(repo).args(args);
        run_with_timeout(cmd, timeout, op)
            .await
            .map_err(VcsError::Unavailable)
    }

    async fn run_checked(
        &self,
        repo: &Path,
        args: &[&str],
        timeout: Duration,
        op: &str,
    ) -> Result<Output, VcsError> {
        let output = self.run(repo, args, timeout, op).await?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                op: op.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Parse `git status --porcelain` output.
fn parse_porcelain(output: &str) -> VcsStatus {
    let mut status = VcsStatus::default();
    for line in output.lines() {
        if line.len() < 4 {
            continue;
        }
        let code = &line[..2];
        let path = line[3..].to_string();
        if code == "??" {
            status.untracked.push(path);
            continue;
        }
        let mut chars = code.chars();
        let x = chars.next().unwrap_or(' ');
        let y = chars.next().unwrap_or(' ');
        if x == 'A' || y == 'A' {
            status.added.push(path);
        } else if x == 'D' || y == 'D' {
            status.deleted.push(path);
        } else if "MRCT".contains(x) || "MRCT".contains(y) {
            status.modified.push(path);
        }
    }
    status
}

#[async_trait]
impl Vcs for GitVcs {
    async fn current_branch(&self, repo: &Path) -> Result<String, VcsError> {
        let output = self
            .run_checked(
                repo,
                &["rev-parse", "--abbrev-ref", "HEAD"],
                GIT_TIMEOUT,
                "rev-parse",
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.run_checked(repo, &["checkout", branch], GIT_TIMEOUT, "checkout")
            .await?;
        Ok(())
    }

    async fn pull(&self, repo: &Path) -> Result<(), VcsError> {
        self.run_checked(repo, &["pull", "--ff-only"], GIT_TIMEOUT, "pull")
            .await?;
        Ok(())
    }

    async fn fetch(&self, repo: &Path) -> Result<(), VcsError> {
        self.run_checked(repo, &["fetch"], GIT_TIMEOUT, "fetch").await?;
        Ok(())
    }

    async fn status(&self, repo: &Path) -> Result<VcsStatus, VcsError> {
        let output = self
            .run_checked(repo, &["status", "--porcelain"], GIT_TIMEOUT, "status")
            .await?;
        Ok(parse_porcelain(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn check_uncommitted(&self, repo: &Path) -> Result<UncommittedWork, VcsError> {
        let status = self.status(repo).await?;

        let stash_output = self
            .run_checked(repo, &["stash", "list"], GIT_TIMEOUT, "stash list")
            .await?;
        let stashes = String::from_utf8_lossy(&stash_output.stdout)
            .lines()
            .filter(|l| !l.trim().is_empty())
            .count();

        // Commits the upstream has not seen. Without an upstream, count
        // commits unreachable from any remote ref instead.
        let unpushed_commits = {
            let upstream = self
                .run(
                    repo,
                    &["rev-list", "--count", "@{upstream}..HEAD"],
                    GIT_TIMEOUT,
                    "rev-list upstream",
                )
                .await?;
            let counted = if upstream.status.success() {
                String::from_utf8_lossy(&upstream.stdout).trim().parse().ok()
            } else {
                let no_remote = self
                    .run(
                        repo,
                        &["rev-list", "--count", "HEAD", "--not", "--remotes"],
                        GIT_TIMEOUT,
                        "rev-list remotes",
                    )
                    .await?;
                if no_remote.status.success() {
                    String::from_utf8_lossy(&no_remote.stdout).trim().parse().ok()
                } else {
                    None
                }
            };
            counted.unwrap_or(0)
        };

        Ok(UncommittedWork {
            status,
            stashes,
            unpushed_commits,
        })
    }

    async fn worktree_add_existing_force(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
    ) -> Result<(), VcsError> {
        let path_str = path.display().to_string();
        self.run_checked(
            repo,
            &["worktree", "add", "--force", &path_str, branch],
            GIT_WORKTREE_TIMEOUT,
            "worktree add",
        )
        .await?;
        Ok(())
    }

    async fn worktree_add_new_branch(
        &self,
        repo: &Path,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), VcsError> {
        let path_str = path.display().to_string();
        self.run_checked(
            repo,
            &["worktree", "add", "--force", "-b", branch, &path_str, base],
            GIT_WORKTREE_TIMEOUT,
            "worktree add -b",
        )
        .await?;
        Ok(())
    }

    async fn worktree_remove(&self, repo: &Path, path: &Path) -> Result<(), VcsError> {
        let path_str = path.display().to_string();
        self.run_checked(
            repo,
            &["worktree", "remove", "--force", &path_str],
            GIT_WORKTREE_TIMEOUT,
            "worktree remove",
        )
        .await?;
        Ok(())
    }

    async fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), VcsError> {
        self.run_checked(repo, &["branch", "-D", branch], GIT_TIMEOUT, "branch -D")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
