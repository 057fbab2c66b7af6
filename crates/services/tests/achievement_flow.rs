use std::sync::Arc;

use services::{Clock, ProgressService};
use storage::repository::{InMemoryRepository, ProgressRepository, TaskRepository};
use stride_core::model::{
    AchievementId, AchievementKind, Category, Difficulty, ProgressRecord, Task, TaskId, UserId,
};
use stride_core::time::fixed_now;

fn build_task(id: u64, category: Category) -> Task {
    Task::new(
        TaskId::new(id),
        format!("Task {id}"),
        "",
        category,
        Difficulty::Easy,
        "10 minutes",
    )
    .unwrap()
}

fn build_service(repo: &InMemoryRepository) -> ProgressService {
    ProgressService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

#[tokio::test]
async fn tenth_task_unlocks_the_first_task_badge() {
    let repo = InMemoryRepository::new();
    let user = UserId::new("user_123");
    let tasks: Vec<Task> = (1..=10)
        .map(|id| build_task(id, Category::Productivity))
        .collect();
    repo.put_tasks(&user, tasks).await.unwrap();
    let service = build_service(&repo);

    for id in 1..=9 {
        let outcome = service.toggle_task(&user, TaskId::new(id)).await.unwrap();
        assert!(outcome.newly_unlocked.is_empty());
    }

    let outcome = service.toggle_task(&user, TaskId::new(10)).await.unwrap();
    assert!(
        outcome
            .newly_unlocked
            .contains(&AchievementId::new("tasks_10"))
    );
}

#[tokio::test]
async fn catch_up_crossing_two_thresholds_reports_both_in_order() {
    let repo = InMemoryRepository::new();
    let user = UserId::new("user_123");
    repo.put_tasks(&user, vec![build_task(1, Category::Habits)])
        .await
        .unwrap();

    // a record carried over from elsewhere: 24 completions, badges never evaluated
    let mut record = ProgressRecord::new(user.clone());
    record.total_tasks_completed = 24;
    repo.put_record(&record).await.unwrap();

    let service = build_service(&repo);
    let outcome = service.toggle_task(&user, TaskId::new(1)).await.unwrap();

    assert_eq!(outcome.progress.total_tasks_completed, 25);
    assert_eq!(
        outcome.newly_unlocked,
        vec![
            AchievementId::new("tasks_10"),
            AchievementId::new("tasks_25"),
        ]
    );
}

#[tokio::test]
async fn unlocks_survive_dropping_back_below_threshold() {
    let repo = InMemoryRepository::new();
    let user = UserId::new("user_123");
    let tasks: Vec<Task> = (1..=10)
        .map(|id| build_task(id, Category::Discipline))
        .collect();
    repo.put_tasks(&user, tasks).await.unwrap();
    let service = build_service(&repo);

    for id in 1..=10 {
        service.toggle_task(&user, TaskId::new(id)).await.unwrap();
    }

    // un-complete one: the counter drops to 9, the badge stays
    let outcome = service.toggle_task(&user, TaskId::new(10)).await.unwrap();
    assert_eq!(outcome.progress.total_tasks_completed, 9);

    let view = service.get_achievements(&user).await.unwrap();
    let tasks_group = view
        .groups
        .iter()
        .find(|group| group.kind == AchievementKind::Tasks)
        .unwrap();
    let badge = tasks_group
        .achievements
        .iter()
        .find(|item| item.id == AchievementId::new("tasks_10"))
        .unwrap();
    assert!(badge.unlocked);
    assert!(badge.unlocked_at.is_some());
}

#[tokio::test]
async fn achievements_view_is_grouped_and_totalled() {
    let repo = InMemoryRepository::new();
    let user = UserId::new("user_123");
    let service = build_service(&repo);

    service.record_note_shared(&user).await.unwrap();

    let view = service.get_achievements(&user).await.unwrap();
    assert_eq!(view.groups.len(), 3);
    assert_eq!(
        view.groups
            .iter()
            .map(|group| group.kind)
            .collect::<Vec<_>>(),
        vec![
            AchievementKind::Streak,
            AchievementKind::Tasks,
            AchievementKind::Notes,
        ]
    );
    assert_eq!(view.unlocked, 1);
    assert!(view.total >= 9);

    let notes_group = view
        .groups
        .iter()
        .find(|group| group.kind == AchievementKind::Notes)
        .unwrap();
    assert_eq!(notes_group.unlocked, 1);
}

#[tokio::test]
async fn snapshot_serializes_with_snake_case_tags() {
    let repo = InMemoryRepository::new();
    let user = UserId::new("user_123");
    repo.put_tasks(&user, vec![build_task(1, Category::GoalSetting)])
        .await
        .unwrap();
    let service = build_service(&repo);

    let outcome = service.toggle_task(&user, TaskId::new(1)).await.unwrap();
    let json = serde_json::to_value(&outcome.progress).unwrap();

    assert_eq!(json["streak_status"], "new_streak");
    assert_eq!(json["categories_completed"]["goal_setting"], 1);
    assert_eq!(json["user_id"], "user_123");
    assert_eq!(json["completion_percent"], 100);
}
