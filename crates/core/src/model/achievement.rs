use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── ACHIEVEMENT ID ────────────────────────────────────────────────────────────
//

/// Identifier of an achievement definition (e.g. `tasks_10`).
///
/// Ids are stable string tags shared between the static catalog and each
/// user's unlock map.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AchievementId(String);

impl AchievementId {
    /// Creates a new `AchievementId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AchievementId({})", self.0)
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Which cumulative counter an achievement watches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Unlocked by `current_streak` reaching the threshold.
    Streak,
    /// Unlocked by `total_tasks_completed` reaching the threshold.
    Tasks,
    /// Unlocked by `notes_shared` reaching the threshold.
    Notes,
}

impl AchievementKind {
    /// All kinds, in the order evaluation (and grouped views) iterate them.
    pub const ALL: [AchievementKind; 3] = [
        AchievementKind::Streak,
        AchievementKind::Tasks,
        AchievementKind::Notes,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementKind::Streak => "streak",
            AchievementKind::Tasks => "tasks",
            AchievementKind::Notes => "notes",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ─── DEFINITION & STATE ────────────────────────────────────────────────────────
//

/// One entry of the static achievement catalog.
///
/// Definitions are value objects in an immutable table loaded once; user
/// records never store them, only `AchievementState` keyed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub kind: AchievementKind,
    pub threshold: u32,
}

impl AchievementDefinition {
    /// The definition's id as an owned `AchievementId`.
    #[must_use]
    pub fn achievement_id(&self) -> AchievementId {
        AchievementId::new(self.id)
    }
}

/// Per-user unlock state for one achievement definition.
///
/// Unlocking is one-way: once `unlocked` is true it stays true even if the
/// triggering counter later decreases.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementState {
    /// A fresh, locked state mirroring a catalog entry.
    #[must_use]
    pub fn locked() -> Self {
        Self::default()
    }

    /// Unlocks the achievement at the given time.
    ///
    /// Idempotent: an already-unlocked state keeps its original timestamp.
    pub fn unlock(&mut self, at: DateTime<Utc>) {
        if !self.unlocked {
            self.unlocked = true;
            self.unlocked_at = Some(at);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
