use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ProgressRecord;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Closed set of streak states a progress record can be in.
///
/// Each status owns its user-facing message template (see [`StreakStatus::message`]),
/// so the status tag and the message can never drift apart.
///
/// - `NoStreak`: no active streak; nothing completed yet, or the streak broke
/// - `NewStreak`: today's full completion started a streak at day 1
/// - `Increased`: today's full completion extended an existing streak
/// - `Decreased`: un-completing a task retracted a counted day
/// - `Maintained`: today is fully complete and already counted
/// - `AtRisk`: an active streak with today's tasks still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    NoStreak,
    NewStreak,
    Increased,
    Decreased,
    Maintained,
    AtRisk,
}

impl StreakStatus {
    /// Returns the snake_case tag used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StreakStatus::NoStreak => "no_streak",
            StreakStatus::NewStreak => "new_streak",
            StreakStatus::Increased => "increased",
            StreakStatus::Decreased => "decreased",
            StreakStatus::Maintained => "maintained",
            StreakStatus::AtRisk => "at_risk",
        }
    }

    /// Renders the user-facing message for this status at the given streak count.
    #[must_use]
    pub fn message(self, streak: u32) -> String {
        match self {
            StreakStatus::NoStreak => {
                "Complete all tasks today to start a streak!".to_string()
            }
            StreakStatus::NewStreak => {
                "Great start! You're on day 1 of a new streak.".to_string()
            }
            StreakStatus::Increased => {
                format!("Streak increased to {streak} days. Keep it going!")
            }
            StreakStatus::Decreased => {
                format!("Streak decreased to {streak} days. Finish today's tasks to build it back up!")
            }
            StreakStatus::Maintained => {
                format!("All tasks complete! Your {streak}-day streak is safe.")
            }
            StreakStatus::AtRisk => {
                format!("Complete today's tasks to keep your {streak}-day streak alive!")
            }
        }
    }
}

impl fmt::Display for StreakStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for parsing a streak status tag from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStreakStatusError {
    raw: String,
}

impl fmt::Display for ParseStreakStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown streak status: {}", self.raw)
    }
}

impl std::error::Error for ParseStreakStatusError {}

impl FromStr for StreakStatus {
    type Err = ParseStreakStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_streak" => Ok(StreakStatus::NoStreak),
            "new_streak" => Ok(StreakStatus::NewStreak),
            "increased" => Ok(StreakStatus::Increased),
            "decreased" => Ok(StreakStatus::Decreased),
            "maintained" => Ok(StreakStatus::Maintained),
            "at_risk" => Ok(StreakStatus::AtRisk),
            _ => Err(ParseStreakStatusError { raw: s.to_string() }),
        }
    }
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Day-rollover check, applied at the start of every read or mutation.
///
/// Resets the streak to zero when the last fully-completed day is further
/// back than yesterday: the previous day went incomplete, so the chain is
/// broken and can only restart at 1. A record with no completion date is
/// normalized to the zero-streak defaults (idempotent safety net against
/// inconsistent earlier writes).
///
/// The last completion date is authoritative for "was the previous day
/// completed". `all_tasks_completed_today` only describes the current day,
/// so on any date change it is stale by definition and gets cleared here.
pub fn apply_rollover(record: &mut ProgressRecord, today: NaiveDate) {
    match record.last_completion_date {
        None => {
            record.current_streak = 0;
            record.streak_status = StreakStatus::NoStreak;
        }
        // Today already counted; the flag is current, nothing to do.
        Some(last) if last == today => {}
        Some(last) => {
            record.all_tasks_completed_today = false;
            // Yesterday completed keeps the chain alive; anything older broke it.
            if gap_days(last, today) != 1 {
                record.current_streak = 0;
                record.streak_status = StreakStatus::NoStreak;
                record.last_completion_date = None;
            }
        }
    }
}

/// Applies a full-set completion: today's task set just transitioned from
/// incomplete to complete.
///
/// - last completion yesterday: the streak extends by one
/// - last completion today: the day is already counted, nothing to add
/// - anything else (gap > 1 day, or no completion on record): the streak
///   restarts at 1
///
/// `longest_streak` is raised to match afterwards, and a zero streak is
/// forced to 1 (a completed day always counts as at least one).
pub fn record_full_completion(record: &mut ProgressRecord, today: NaiveDate) {
    match record.last_completion_date {
        Some(last) if last == today => {
            record.streak_status = StreakStatus::Maintained;
        }
        Some(last) if gap_days(last, today) == 1 => {
            record.current_streak += 1;
            record.streak_status = StreakStatus::Increased;
        }
        _ => {
            record.current_streak = 1;
            record.streak_status = StreakStatus::NewStreak;
        }
    }

    if record.current_streak == 0 {
        record.current_streak = 1;
        record.streak_status = StreakStatus::NewStreak;
    }

    record.longest_streak = record.longest_streak.max(record.current_streak);
    record.last_completion_date = Some(today);
    record.all_tasks_completed_today = true;
}

/// Retracts a counted completion: a task was un-completed while the full
/// day's set was complete.
///
/// The streak drops by one, and the last completion date rolls back a day
/// (or clears entirely when the streak empties) so that re-completing the
/// set restores the exact pre-retraction state through the normal
/// yesterday/unset branches of [`record_full_completion`].
pub fn retract_full_completion(record: &mut ProgressRecord) {
    if record.current_streak > 1 {
        record.current_streak -= 1;
        record.streak_status = StreakStatus::Decreased;
        record.last_completion_date = record
            .last_completion_date
            .and_then(|d| d.pred_opt());
    } else {
        record.current_streak = 0;
        record.streak_status = StreakStatus::NoStreak;
        record.last_completion_date = None;
    }
    record.all_tasks_completed_today = false;
}

/// Derives the status for read-only progress queries, independent of the
/// toggle transitions.
#[must_use]
pub fn derive_status(record: &ProgressRecord) -> StreakStatus {
    if record.all_tasks_completed_today {
        if record.current_streak == 0 {
            // Completed day with no counted streak; report it as new.
            StreakStatus::NewStreak
        } else {
            StreakStatus::Maintained
        }
    } else if record.current_streak > 0 {
        StreakStatus::AtRisk
    } else {
        StreakStatus::NoStreak
    }
}

fn gap_days(last: NaiveDate, today: NaiveDate) -> i64 {
    today.signed_duration_since(last).num_days()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
