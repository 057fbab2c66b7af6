use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::TaskId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,
}

/// Error type for parsing a category tag from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    raw: String,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.raw)
    }
}

impl std::error::Error for ParseCategoryError {}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Closed set of personal-development categories.
///
/// Matches the assessment question catalog: every task and every assessment
/// question carries exactly one of these tags, and per-category completion
/// tallies are keyed by them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Habits,
    Emotions,
    Productivity,
    Discipline,
    GoalSetting,
    TimeManagement,
    Mindset,
    Environment,
    PhysicalHealth,
    SocialInfluences,
}

impl Category {
    /// Returns the snake_case tag used on the wire and in tallies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Habits => "habits",
            Category::Emotions => "emotions",
            Category::Productivity => "productivity",
            Category::Discipline => "discipline",
            Category::GoalSetting => "goal_setting",
            Category::TimeManagement => "time_management",
            Category::Mindset => "mindset",
            Category::Environment => "environment",
            Category::PhysicalHealth => "physical_health",
            Category::SocialInfluences => "social_influences",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "habits" => Ok(Category::Habits),
            "emotions" => Ok(Category::Emotions),
            "productivity" => Ok(Category::Productivity),
            "discipline" => Ok(Category::Discipline),
            "goal_setting" => Ok(Category::GoalSetting),
            "time_management" => Ok(Category::TimeManagement),
            "mindset" => Ok(Category::Mindset),
            "environment" => Ok(Category::Environment),
            "physical_health" => Ok(Category::PhysicalHealth),
            "social_influences" => Ok(Category::SocialInfluences),
            _ => Err(ParseCategoryError { raw: s.to_string() }),
        }
    }
}

//
// ─── DIFFICULTY & STATUS ───────────────────────────────────────────────────────
//

/// Coarse difficulty rating attached to recommended tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion state of a task within the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

//
// ─── TASK ──────────────────────────────────────────────────────────────────────
//

/// A single daily task assigned to a user.
///
/// Tasks carry the recommendation metadata they were created with (category,
/// difficulty, duration estimate) plus their completion state for the day.
/// The estimated duration is free-form text ("5-15 minutes") because that is
/// how recommendations describe it; nothing schedules against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    category: Category,
    difficulty: Difficulty,
    estimated_duration: String,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new pending task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the title is blank.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        estimated_duration: impl Into<String>,
    ) -> Result<Self, TaskError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            category,
            difficulty,
            estimated_duration: estimated_duration.into(),
            status: TaskStatus::Pending,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn estimated_duration(&self) -> &str {
        &self.estimated_duration
    }

    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Marks the task completed at the given time.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Reverts the task to pending, clearing the completion timestamp.
    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
        self.completed_at = None;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
