use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use stride_core::achievements;
use stride_core::model::{
    AchievementId, AchievementKind, Category, ProgressRecord, Task, UserId,
};
use stride_core::streak::StreakStatus;

/// Presentation-agnostic snapshot of a user's progress.
///
/// This is intentionally **not** a UI view-model: timestamps and dates stay
/// typed, and the only pre-rendered string is `streak_message`, which is
/// derived from the status tag so the two can never disagree. It serializes
/// cleanly, so a JSON-over-HTTP binding can return it as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub user_id: UserId,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completion_date: Option<NaiveDate>,
    pub streak_status: StreakStatus,
    pub streak_message: String,
    pub today_completed: u32,
    pub today_total: u32,
    pub completion_percent: u8,
    pub all_tasks_completed_today: bool,
    pub total_tasks_completed: u32,
    pub categories_completed: BTreeMap<Category, u32>,
    pub notes_shared: u32,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            current_streak: record.current_streak,
            longest_streak: record.longest_streak,
            last_completion_date: record.last_completion_date,
            streak_status: record.streak_status,
            streak_message: record.streak_status.message(record.current_streak),
            today_completed: record.today_completed,
            today_total: record.today_total,
            completion_percent: record.completion_percent(),
            all_tasks_completed_today: record.all_tasks_completed_today,
            total_tasks_completed: record.total_tasks_completed,
            categories_completed: record.categories_completed.clone(),
            notes_shared: record.notes_shared,
        }
    }
}

/// Outcome of toggling a task's completion state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToggleOutcome {
    pub task: Task,
    pub progress: ProgressSnapshot,
    pub newly_unlocked: Vec<AchievementId>,
}

/// One catalog entry with a user's unlock state attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementItem {
    pub id: AchievementId,
    pub title: String,
    pub icon: String,
    pub threshold: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Achievements of one kind, catalog-ordered, with unlock tallies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementGroup {
    pub kind: AchievementKind,
    pub achievements: Vec<AchievementItem>,
    pub unlocked: usize,
    pub total: usize,
}

/// A user's achievements grouped by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementsView {
    pub groups: Vec<AchievementGroup>,
    pub unlocked: usize,
    pub total: usize,
}

impl AchievementsView {
    /// Builds the grouped view from a record whose achievement map mirrors
    /// the catalog (callers run evaluation first).
    ///
    /// Entries missing from the map are shown locked rather than skipped, so
    /// the view is total over the catalog either way.
    #[must_use]
    pub fn from_record(record: &ProgressRecord) -> Self {
        let mut groups = Vec::with_capacity(AchievementKind::ALL.len());
        for kind in AchievementKind::ALL {
            let achievements: Vec<AchievementItem> = achievements::catalog_for(kind)
                .map(|def| {
                    let state = record.achievements.get(&def.achievement_id());
                    AchievementItem {
                        id: def.achievement_id(),
                        title: def.title.to_string(),
                        icon: def.icon.to_string(),
                        threshold: def.threshold,
                        unlocked: state.is_some_and(|s| s.unlocked),
                        unlocked_at: state.and_then(|s| s.unlocked_at),
                    }
                })
                .collect();

            let unlocked = achievements.iter().filter(|item| item.unlocked).count();
            let total = achievements.len();
            groups.push(AchievementGroup {
                kind,
                achievements,
                unlocked,
                total,
            });
        }

        let unlocked = groups.iter().map(|group| group.unlocked).sum();
        let total = groups.iter().map(|group| group.total).sum();
        Self {
            groups,
            unlocked,
            total,
        }
    }
}
