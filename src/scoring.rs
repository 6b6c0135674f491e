//! Importance scoring and ranking.
//!
//! Every entry point takes `now` explicitly so rankings are reproducible.

use crate::config::ScoringWeights;
use crate::models::Task;
use chrono::{DateTime, TimeDelta, Utc};
use std::cmp::Ordering;

impl ScoringWeights {
    /// Score a single task. Higher is more important.
    pub fn score(&self, task: &Task, now: DateTime<Utc>) -> f64 {
        let base = f64::from(task.priority.code()) * self.priority_weight;

        // An unrepresentable horizon disables the due-soon boost
        let horizon = TimeDelta::try_hours(self.due_soon_hours);
        let boost = match task.due_date {
            Some(_) if task.is_overdue(now) => self.overdue_boost,
            Some(due) if horizon.is_some_and(|h| due - now <= h) => self.due_soon_boost,
            _ => 0.0,
        };

        base + boost
    }

    /// Order by descending score, then `created_at`, then id
    pub fn sort_by_importance<'a>(&self, tasks: &'a [Task], now: DateTime<Utc>) -> Vec<&'a Task> {
        let mut scored: Vec<(f64, &Task)> = tasks.iter().map(|t| (self.score(t, now), t)).collect();
        scored.sort_by(|(sa, a), (sb, b)| compare_ranked(*sa, a, *sb, b));
        scored.into_iter().map(|(_, t)| t).collect()
    }

    /// The `limit` most important tasks that are not done
    pub fn top_priority<'a>(
        &self,
        tasks: &'a [Task],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<&'a Task> {
        if limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &Task)> = tasks
            .iter()
            .filter(|t| !t.is_done())
            .map(|t| (self.score(t, now), t))
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| compare_ranked(*sa, a, *sb, b));
        scored.into_iter().take(limit).map(|(_, t)| t).collect()
    }
}

fn compare_ranked(score_a: f64, a: &Task, score_b: f64, b: &Task) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Score a task with the default weights
pub fn calculate_task_score(task: &Task, now: DateTime<Utc>) -> f64 {
    ScoringWeights::default().score(task, now)
}

/// Rank tasks by importance with the default weights
pub fn sort_tasks_by_importance(tasks: &[Task], now: DateTime<Utc>) -> Vec<&Task> {
    ScoringWeights::default().sort_by_importance(tasks, now)
}

/// Up to `limit` open tasks ranked by importance with the default weights
pub fn get_top_priority_tasks(tasks: &[Task], limit: usize, now: DateTime<Utc>) -> Vec<&Task> {
    ScoringWeights::default().top_priority(tasks, limit, now)
}
