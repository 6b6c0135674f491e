pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod scoring;
pub mod sync;

pub use config::{Config, ScoringWeights, TieBreak};
pub use error::{Result, TaskError};
pub use models::*;
pub use parser::parse_task_from_text;
pub use scoring::{calculate_task_score, get_top_priority_tasks, sort_tasks_by_importance};
pub use sync::{MergeOutcome, Reconciler, merge_task_lists, resolve_task_conflict};
