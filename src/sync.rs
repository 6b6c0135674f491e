//! Two-way reconciliation of task maps.
//!
//! Scalar fields follow last-writer-wins on `updated_at`. Tags are
//! accumulative and merge by set union. The two rules are applied
//! independently: a stale copy can still contribute tags.
//!
//! Inputs are expected to satisfy `created_at <= updated_at`. Nothing is
//! validated; a copy that violates it is ordered by its raw `updated_at`.

use crate::config::TieBreak;
use crate::models::{Task, TaskMap};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Result of reconciling a local and a remote task map
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Canonical view holding every id seen on either side
    pub merged: TaskMap,
    /// Tasks the remote side is missing
    pub to_create_remote: Vec<Task>,
    /// Tasks the remote side holds a stale copy of
    pub to_update_remote: Vec<Task>,
    pub to_create_local: Vec<Task>,
    pub to_update_local: Vec<Task>,
}

impl MergeOutcome {
    /// True when neither side has anything to write
    pub fn is_converged(&self) -> bool {
        self.pending_writes() == 0
    }

    pub fn pending_writes(&self) -> usize {
        self.to_create_remote.len()
            + self.to_update_remote.len()
            + self.to_create_local.len()
            + self.to_update_local.len()
    }
}

/// Side whose scalar fields won a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Winner {
    Local,
    Remote,
}

/// Merges task maps under a fixed tie-break policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    tie_break: TieBreak,
}

impl Reconciler {
    pub fn new(tie_break: TieBreak) -> Self {
        Reconciler { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Merge two maps into one, plus the writes each side needs to catch up
    pub fn merge(&self, local: &TaskMap, remote: &TaskMap) -> MergeOutcome {
        let ids: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();
        let mut outcome = MergeOutcome {
            merged: TaskMap::with_capacity(ids.len()),
            ..Default::default()
        };

        for id in ids {
            let merged = match (local.get(id), remote.get(id)) {
                (Some(local_task), None) => {
                    let task = keyed(id, local_task);
                    outcome.to_create_remote.push(task.clone());
                    task
                }
                (None, Some(remote_task)) => {
                    let task = keyed(id, remote_task);
                    outcome.to_create_local.push(task.clone());
                    task
                }
                (Some(local_task), Some(remote_task)) => {
                    let merged = self.resolve_keyed(id, local_task, remote_task);
                    if !remote_task.same_content(&merged) {
                        outcome.to_update_remote.push(merged.clone());
                    }
                    if !local_task.same_content(&merged) {
                        outcome.to_update_local.push(merged.clone());
                    }
                    merged
                }
                (None, None) => continue,
            };
            outcome.merged.insert(id.clone(), merged);
        }

        info!(
            total = outcome.merged.len(),
            create_remote = outcome.to_create_remote.len(),
            update_remote = outcome.to_update_remote.len(),
            create_local = outcome.to_create_local.len(),
            update_local = outcome.to_update_local.len(),
            "merged task lists"
        );

        outcome
    }

    /// Combine two copies of the same task into one, keeping the local id
    pub fn resolve(&self, local: &Task, remote: &Task) -> Task {
        self.resolve_keyed(&local.id, local, remote)
    }

    /// Resolve two copies stored under `key`; the result carries `key` as its id
    fn resolve_keyed(&self, key: &str, local: &Task, remote: &Task) -> Task {
        let winner = self.pick_winner(local, remote);
        let source = match winner {
            Winner::Local => local,
            Winner::Remote => remote,
        };

        debug!(
            id = key,
            ?winner,
            local_updated_at = %local.updated_at,
            remote_updated_at = %remote.updated_at,
            "resolved task conflict"
        );

        Task {
            id: key.to_string(),
            title: source.title.clone(),
            description: source.description.clone(),
            priority: source.priority,
            status: source.status,
            due_date: source.due_date,
            tags: local.tags.union(&remote.tags).cloned().collect(),
            created_at: local.created_at.min(remote.created_at),
            updated_at: local.updated_at.max(remote.updated_at),
        }
    }

    fn pick_winner(&self, local: &Task, remote: &Task) -> Winner {
        match local.updated_at.cmp(&remote.updated_at) {
            Ordering::Greater => Winner::Local,
            Ordering::Less => Winner::Remote,
            Ordering::Equal => match self.tie_break {
                TieBreak::PreferRemote => Winner::Remote,
                TieBreak::PreferLocal => Winner::Local,
            },
        }
    }
}

/// Copy a task, forcing its id to the map key it was stored under
fn keyed(key: &str, task: &Task) -> Task {
    let mut task = task.clone();
    if task.id != key {
        debug!(key, id = %task.id, "task id differs from map key, using key");
        task.id = key.to_string();
    }
    task
}

/// Merge local and remote task maps, preferring remote on timestamp ties
pub fn merge_task_lists(local: &TaskMap, remote: &TaskMap) -> MergeOutcome {
    Reconciler::default().merge(local, remote)
}

/// Resolve two copies of one task, preferring remote on timestamp ties
pub fn resolve_task_conflict(local: &Task, remote: &Task) -> Task {
    Reconciler::default().resolve(local, remote)
}
