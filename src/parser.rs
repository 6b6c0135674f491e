//! Free-form text to `Task`.
//!
//! Grammar, one whitespace-separated token at a time:
//! - `@tag` adds a tag
//! - `!N` or `!name` sets the priority (1=low .. 4=urgent)
//! - `#keyword` sets the due date (`today`, `tomorrow`, `next_week`, weekday names)
//! - anything else is part of the title
//!
//! Unrecognized marker values are ignored and the previous value is kept.

use crate::models::{Task, TaskPriority};
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use tracing::debug;

/// Build a task from a line of text such as `"Buy milk @shopping !2 #tomorrow"`
pub fn parse_task_from_text(text: &str, now: DateTime<Utc>) -> Task {
    let mut title_parts = Vec::new();
    let mut tags = Vec::new();
    let mut priority = TaskPriority::default();
    let mut due_date = None;

    for token in text.split_whitespace() {
        if let Some(tag) = token.strip_prefix('@') {
            if !tag.is_empty() {
                tags.push(tag);
            }
        } else if let Some(value) = token.strip_prefix('!') {
            match TaskPriority::parse(value) {
                Some(parsed) => priority = parsed,
                None => debug!(token, "ignoring unknown priority"),
            }
        } else if let Some(value) = token.strip_prefix('#') {
            match parse_due_date(value, now) {
                Some(parsed) => due_date = Some(parsed),
                None => debug!(token, "ignoring unknown date keyword"),
            }
        } else {
            title_parts.push(token);
        }
    }

    let mut task = Task::new(title_parts.join(" "), now)
        .with_priority(priority)
        .with_tags(tags);
    task.due_date = due_date;
    task
}

/// Resolve a date keyword to midnight (UTC) of the matching day
pub fn parse_due_date(keyword: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let keyword = keyword.to_lowercase();
    match keyword.as_str() {
        "today" => Some(midnight(now)),
        "tomorrow" => now.checked_add_days(Days::new(1)).map(midnight),
        "next_week" => now.checked_add_days(Days::new(7)).map(midnight),
        other => weekday_from_name(other).and_then(|weekday| get_next_weekday(now, weekday)),
    }
}

/// Next occurrence of `target` strictly after today, at midnight.
/// `None` past the end of the representable date range.
pub fn get_next_weekday(now: DateTime<Utc>, target: Weekday) -> Option<DateTime<Utc>> {
    let current = now.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let days_ahead = match (wanted + 7 - current) % 7 {
        0 => 7,
        n => n,
    };
    now.checked_add_days(Days::new(u64::from(days_ahead))).map(midnight)
}

/// Full or three-letter English weekday name, case-insensitive
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.to_lowercase().as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}
