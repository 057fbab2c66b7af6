use chrono::{DateTime, Utc};

use crate::model::{
    AchievementDefinition, AchievementId, AchievementKind, AchievementState, ProgressRecord,
};

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The fixed achievement catalog, kind-major and ascending by threshold.
const CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "streak_3",
        title: "On a Roll",
        icon: "🔥",
        kind: AchievementKind::Streak,
        threshold: 3,
    },
    AchievementDefinition {
        id: "streak_7",
        title: "Week Warrior",
        icon: "🗓️",
        kind: AchievementKind::Streak,
        threshold: 7,
    },
    AchievementDefinition {
        id: "streak_30",
        title: "Monthly Master",
        icon: "🏆",
        kind: AchievementKind::Streak,
        threshold: 30,
    },
    AchievementDefinition {
        id: "tasks_10",
        title: "Getting Started",
        icon: "⭐",
        kind: AchievementKind::Tasks,
        threshold: 10,
    },
    AchievementDefinition {
        id: "tasks_25",
        title: "Task Tackler",
        icon: "💪",
        kind: AchievementKind::Tasks,
        threshold: 25,
    },
    AchievementDefinition {
        id: "tasks_100",
        title: "Century Club",
        icon: "🏅",
        kind: AchievementKind::Tasks,
        threshold: 100,
    },
    AchievementDefinition {
        id: "notes_1",
        title: "First Note",
        icon: "📝",
        kind: AchievementKind::Notes,
        threshold: 1,
    },
    AchievementDefinition {
        id: "notes_5",
        title: "Note Taker",
        icon: "📚",
        kind: AchievementKind::Notes,
        threshold: 5,
    },
    AchievementDefinition {
        id: "notes_20",
        title: "Daily Journalist",
        icon: "✍️",
        kind: AchievementKind::Notes,
        threshold: 20,
    },
];

/// The full achievement catalog.
#[must_use]
pub fn catalog() -> &'static [AchievementDefinition] {
    CATALOG
}

/// Catalog entries of one kind, in ascending threshold order.
pub fn catalog_for(kind: AchievementKind) -> impl Iterator<Item = &'static AchievementDefinition> {
    CATALOG.iter().filter(move |def| def.kind == kind)
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// The cumulative counter an achievement kind watches on a record.
#[must_use]
pub fn counter_for(record: &ProgressRecord, kind: AchievementKind) -> u32 {
    match kind {
        AchievementKind::Streak => record.current_streak,
        AchievementKind::Tasks => record.total_tasks_completed,
        AchievementKind::Notes => record.notes_shared,
    }
}

/// Evaluates the catalog against a record's counters, unlocking anything
/// newly at or over threshold.
///
/// Missing map entries are initialized locked first, so the record's map
/// always mirrors the catalog after a call. Unlocking is monotonic: already
/// unlocked entries are never touched, whatever the counters now say.
///
/// Returns the newly unlocked ids, ascending by threshold within each kind,
/// so crossing two thresholds in one call (e.g. the 10th and 25th task in a
/// batch catch-up) reports both, smallest first.
pub fn evaluate(record: &mut ProgressRecord, now: DateTime<Utc>) -> Vec<AchievementId> {
    for def in CATALOG {
        record
            .achievements
            .entry(def.achievement_id())
            .or_insert_with(AchievementState::locked);
    }

    let mut newly_unlocked = Vec::new();
    for kind in AchievementKind::ALL {
        let counter = counter_for(record, kind);
        for def in catalog_for(kind) {
            if counter < def.threshold {
                continue;
            }
            let id = def.achievement_id();
            if let Some(state) = record.achievements.get_mut(&id) {
                if !state.unlocked {
                    state.unlock(now);
                    newly_unlocked.push(id);
                }
            }
        }
    }

    newly_unlocked
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use crate::time::fixed_now;
    use std::collections::HashSet;

    fn build_record() -> ProgressRecord {
        ProgressRecord::new(UserId::new("user_123"))
    }

    #[test]
    fn catalog_ids_are_unique() {
        let ids: HashSet<_> = CATALOG.iter().map(|def| def.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn catalog_thresholds_ascend_within_each_kind() {
        for kind in AchievementKind::ALL {
            let thresholds: Vec<u32> = catalog_for(kind).map(|def| def.threshold).collect();
            assert!(!thresholds.is_empty());
            assert!(thresholds.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn evaluate_initializes_every_entry_locked() {
        let mut record = build_record();
        let newly = evaluate(&mut record, fixed_now());

        assert!(newly.is_empty());
        assert_eq!(record.achievements.len(), CATALOG.len());
        assert!(record.achievements.values().all(|state| !state.unlocked));
    }

    #[test]
    fn counter_at_threshold_unlocks() {
        let mut record = build_record();
        record.total_tasks_completed = 10;

        let newly = evaluate(&mut record, fixed_now());

        assert_eq!(newly, vec![AchievementId::new("tasks_10")]);
        let state = &record.achievements[&AchievementId::new("tasks_10")];
        assert!(state.unlocked);
        assert_eq!(state.unlocked_at, Some(fixed_now()));
    }

    #[test]
    fn crossing_two_thresholds_reports_both_ascending() {
        let mut record = build_record();
        record.total_tasks_completed = 25;

        let newly = evaluate(&mut record, fixed_now());

        assert_eq!(
            newly,
            vec![
                AchievementId::new("tasks_10"),
                AchievementId::new("tasks_25"),
            ]
        );
    }

    #[test]
    fn already_unlocked_entries_are_not_reported_again() {
        let mut record = build_record();
        record.total_tasks_completed = 10;
        evaluate(&mut record, fixed_now());

        record.total_tasks_completed = 11;
        let newly = evaluate(&mut record, fixed_now());
        assert!(newly.is_empty());
    }

    #[test]
    fn unlocks_survive_counter_decreases() {
        let mut record = build_record();
        record.total_tasks_completed = 10;
        evaluate(&mut record, fixed_now());

        record.total_tasks_completed = 3;
        let newly = evaluate(&mut record, fixed_now());

        assert!(newly.is_empty());
        assert!(record.achievements[&AchievementId::new("tasks_10")].unlocked);
    }

    #[test]
    fn streak_and_note_kinds_watch_their_own_counters() {
        let mut record = build_record();
        record.current_streak = 3;
        record.notes_shared = 1;

        let newly = evaluate(&mut record, fixed_now());

        assert_eq!(
            newly,
            vec![
                AchievementId::new("streak_3"),
                AchievementId::new("notes_1"),
            ]
        );
    }
}
