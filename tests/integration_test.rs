use chrono::{DateTime, Duration, TimeZone, Utc};
use std::io::Write;
use tasksync::{
    Config, TaskMap, TaskPriority, TaskStatus, TaskUpdate, TieBreak, get_top_priority_tasks,
    merge_task_lists, parse_task_from_text, sort_tasks_by_importance, tasks_from_json,
    tasks_to_json,
};
use tempfile::NamedTempFile;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap()
}

#[test]
fn test_parse_merge_and_rank() {
    init_tracing();

    // Local side: two tasks typed in by the user
    let groceries = parse_task_from_text("Buy milk @shopping !2 #tomorrow", now());
    let report = parse_task_from_text("Finish report !urgent @work", now());
    let mut local = TaskMap::new();
    local.insert(groceries.id.clone(), groceries.clone());
    local.insert(report.id.clone(), report.clone());

    // Remote side: has seen the report, edited it later, and owns a third task
    let mut remote_report = report.clone();
    remote_report.apply(
        &TaskUpdate {
            status: Some(TaskStatus::Done),
            add_tags: vec!["q1".to_string()],
            ..Default::default()
        },
        now() + Duration::hours(1),
    );
    let taxes = parse_task_from_text("File taxes !low #today", now() - Duration::days(2));
    let mut remote = TaskMap::new();
    remote.insert(remote_report.id.clone(), remote_report.clone());
    remote.insert(taxes.id.clone(), taxes.clone());

    let outcome = merge_task_lists(&local, &remote);

    assert_eq!(outcome.merged.len(), 3);
    assert_eq!(outcome.to_create_remote.len(), 1);
    assert_eq!(outcome.to_create_remote[0].id, groceries.id);
    assert_eq!(outcome.to_create_local.len(), 1);
    assert_eq!(outcome.to_create_local[0].id, taxes.id);
    assert!(outcome.to_update_remote.is_empty());
    assert_eq!(outcome.to_update_local.len(), 1);

    let merged_report = &outcome.merged[&report.id];
    assert_eq!(merged_report.status, TaskStatus::Done);
    assert!(merged_report.tags.contains("work"));
    assert!(merged_report.tags.contains("q1"));

    let canonical: Vec<_> = outcome.merged.values().cloned().collect();
    let top = get_top_priority_tasks(&canonical, 10, now());
    assert_eq!(top.len(), 2);
    // Milk is due tomorrow, taxes were due two days ago
    assert_eq!(top[0].id, groceries.id);
    assert_eq!(top[1].id, taxes.id);

    // Both sides converge once the instructions are applied
    let mut local_after = local.clone();
    for task in outcome.to_create_local.iter().chain(&outcome.to_update_local) {
        local_after.insert(task.id.clone(), task.clone());
    }
    let mut remote_after = remote.clone();
    for task in outcome.to_create_remote.iter().chain(&outcome.to_update_remote) {
        remote_after.insert(task.id.clone(), task.clone());
    }
    assert!(merge_task_lists(&local_after, &remote_after).is_converged());
}

#[test]
fn test_sort_fixture_urgent_first() {
    let tasks = vec![
        parse_task_from_text("High Priority !high", now()),
        parse_task_from_text("Medium Priority Due Soon !medium #tomorrow", now()),
        parse_task_from_text("Low Priority Overdue !low", now())
            .with_due_date(now() - Duration::days(1)),
        parse_task_from_text("Medium Priority Done !2", now()).with_status(TaskStatus::Done),
        parse_task_from_text("Urgent Priority !4", now()),
    ];

    let sorted = sort_tasks_by_importance(&tasks, now());
    assert_eq!(sorted[0].title, "Urgent Priority");
    assert_eq!(sorted[0].priority, TaskPriority::Urgent);
    assert_eq!(sorted[4].title, "Medium Priority Done");

    let again = sort_tasks_by_importance(&tasks, now());
    let titles = |v: &[&tasksync::Task]| v.iter().map(|t| t.title.clone()).collect::<Vec<_>>();
    assert_eq!(titles(&sorted), titles(&again));
}

#[test]
fn test_config_file_drives_tie_break() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"tie_break": "prefer_local", "scoring": {{"due_soon_hours": 24}}}}"#
    )
    .unwrap();
    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.tie_break, TieBreak::PreferLocal);

    let local_task = parse_task_from_text("Local title", now());
    let mut remote_task = local_task.clone();
    remote_task.title = "Remote title".to_string();

    let mut local = TaskMap::new();
    local.insert(local_task.id.clone(), local_task.clone());
    let mut remote = TaskMap::new();
    remote.insert(remote_task.id.clone(), remote_task);

    let outcome = config.reconciler().merge(&local, &remote);
    assert_eq!(outcome.merged[&local_task.id].title, "Local title");
    assert_eq!(outcome.to_update_remote.len(), 1);
    assert!(outcome.to_update_local.is_empty());

    let due_in_30h = local_task.clone().with_due_date(now() + Duration::hours(30));
    let plain = local_task.clone();
    assert_eq!(
        config.scoring().score(&due_in_30h, now()),
        config.scoring().score(&plain, now())
    );
}

#[test]
fn test_json_exchange_round_trip() {
    let task = parse_task_from_text("Water plants @home !3 #sat", now());
    let mut map = TaskMap::new();
    map.insert(task.id.clone(), task.clone());

    let json = tasks_to_json(&map).unwrap();
    let loaded = tasks_from_json(&json).unwrap();

    let outcome = merge_task_lists(&map, &loaded);
    assert!(outcome.is_converged());
    assert_eq!(loaded[&task.id], task);
}
