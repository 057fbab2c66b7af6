use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::achievement::{AchievementId, AchievementState};
use crate::model::ids::UserId;
use crate::model::task::Category;
use crate::streak::StreakStatus;

/// Per-user progress record: streak state, cumulative counters, and
/// achievement unlocks.
///
/// Created lazily on first access and mutated only through the streak
/// transition functions and the counter helpers below; the record itself
/// stays a plain data shape so stores can move it around freely.
///
/// Invariants maintained by the transition functions:
/// - `current_streak <= longest_streak`
/// - category tallies never go below zero
/// - achievement unlocks are never revoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Last calendar date on which *all* of that day's tasks were completed.
    pub last_completion_date: Option<NaiveDate>,
    pub total_tasks_completed: u32,
    pub categories_completed: BTreeMap<Category, u32>,
    pub today_completed: u32,
    pub today_total: u32,
    pub all_tasks_completed_today: bool,
    pub notes_shared: u32,
    pub streak_status: StreakStatus,
    pub achievements: BTreeMap<AchievementId, AchievementState>,
}

impl ProgressRecord {
    /// A fresh record with all counters at zero and no streak.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_completion_date: None,
            total_tasks_completed: 0,
            categories_completed: BTreeMap::new(),
            today_completed: 0,
            today_total: 0,
            all_tasks_completed_today: false,
            notes_shared: 0,
            streak_status: StreakStatus::NoStreak,
            achievements: BTreeMap::new(),
        }
    }

    /// Percentage of today's task set completed, 0-100.
    ///
    /// A day with no tasks reports 0 rather than dividing by zero.
    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        if self.today_total == 0 {
            return 0;
        }
        let completed = self.today_completed.min(self.today_total);
        let percent = (u64::from(completed) * 100) / u64::from(self.today_total);
        percent as u8
    }

    /// Tally a task completion into the cumulative and per-day counters.
    pub fn record_task_completed(&mut self, category: Category) {
        self.total_tasks_completed += 1;
        self.today_completed += 1;
        *self.categories_completed.entry(category).or_insert(0) += 1;
    }

    /// Undo a task completion from the cumulative and per-day counters.
    ///
    /// All counters floor at zero; un-completing more than was completed
    /// is tolerated, not an error.
    pub fn record_task_uncompleted(&mut self, category: Category) {
        self.total_tasks_completed = self.total_tasks_completed.saturating_sub(1);
        self.today_completed = self.today_completed.saturating_sub(1);
        if let Some(count) = self.categories_completed.get_mut(&category) {
            *count = count.saturating_sub(1);
        }
    }

    /// Cumulative completions recorded for a category.
    #[must_use]
    pub fn category_count(&self, category: Category) -> u32 {
        self.categories_completed.get(&category).copied().unwrap_or(0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
