use std::sync::Arc;

use tracing::{debug, info};

use storage::repository::{InMemoryRepository, ProgressRepository, TaskRepository};
use stride_core::Clock;
use stride_core::achievements;
use stride_core::model::{AchievementId, ProgressRecord, Task, TaskId, UserId};
use stride_core::streak;

use super::locks::UserLocks;
use super::view::{AchievementsView, ProgressSnapshot, ToggleOutcome};
use crate::error::ProgressServiceError;

//
// ─── RESET POLICY ──────────────────────────────────────────────────────────────
//

/// Whether an explicit reset also clears achievement unlocks.
///
/// Unlocks are normally permanent, so the default keeps them across a
/// reset; `ClearAchievements` is for callers that want a true blank slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    #[default]
    PreserveAchievements,
    ClearAchievements,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// The progress tracker: streak transitions and achievement unlocks for
/// per-user daily task completion.
///
/// This service owns:
/// - the time source (`Clock`)
/// - repository access
/// - per-user mutual exclusion (mutations on one user never interleave)
///
/// Every operation starts with the day-rollover check, so a record read on
/// a new calendar day is already normalized before anything else looks at it.
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    tasks: Arc<dyn TaskRepository>,
    locks: UserLocks,
    reset_policy: ResetPolicy,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Self {
        Self {
            clock,
            progress,
            tasks,
            locks: UserLocks::new(),
            reset_policy: ResetPolicy::default(),
        }
    }

    /// Convenience constructor backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        let repo = InMemoryRepository::new();
        Self::new(clock, Arc::new(repo.clone()), Arc::new(repo))
    }

    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    #[must_use]
    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    /// Current streak/today/total view for a user, creating the record on
    /// first access.
    ///
    /// Read-only in effect: repeated calls without an interleaving mutation
    /// return identical snapshots.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn get_progress(
        &self,
        user: &UserId,
    ) -> Result<ProgressSnapshot, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let mut record = self.progress.get_or_create(user).await?;
        streak::apply_rollover(&mut record, self.clock.today());
        record.streak_status = streak::derive_status(&record);
        self.progress.put_record(&record).await?;

        Ok(ProgressSnapshot::from_record(&record))
    }

    /// Flips a task between pending and completed, applying the resulting
    /// streak transition and achievement evaluation.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::TaskNotFound` if the task is not in
    /// the user's set, or `Storage` on repository failures.
    pub async fn toggle_task(
        &self,
        user: &UserId,
        task_id: TaskId,
    ) -> Result<ToggleOutcome, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let today = self.clock.today();

        let mut record = self.progress.get_or_create(user).await?;
        streak::apply_rollover(&mut record, today);

        let mut tasks = self.tasks.list_tasks(user).await?;
        let index = tasks
            .iter()
            .position(|task| task.id() == task_id)
            .ok_or_else(|| ProgressServiceError::TaskNotFound {
                user: user.clone(),
                task: task_id,
            })?;

        let was_all_complete = tasks.iter().all(Task::is_completed);

        if record.today_total == 0 {
            record.today_total = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        }

        let category = tasks[index].category();
        if tasks[index].is_completed() {
            tasks[index].mark_pending();
            record.record_task_uncompleted(category);
            if was_all_complete {
                streak::retract_full_completion(&mut record);
                debug!(
                    "Completion retracted for {}: streak now {}",
                    user, record.current_streak
                );
            }
        } else {
            tasks[index].mark_completed(now);
            record.record_task_completed(category);
        }

        let all_complete = tasks.iter().all(Task::is_completed);
        if all_complete && !was_all_complete {
            streak::record_full_completion(&mut record, today);
            info!(
                "Daily set completed for {}: streak {}",
                user, record.current_streak
            );
        }

        let newly_unlocked = achievements::evaluate(&mut record, now);
        if !newly_unlocked.is_empty() {
            info!(
                "Unlocked {} achievement(s) for {}",
                newly_unlocked.len(),
                user
            );
        }

        let task = tasks[index].clone();
        self.tasks.upsert_task(user, &task).await?;
        self.progress.put_record(&record).await?;

        Ok(ToggleOutcome {
            task,
            progress: ProgressSnapshot::from_record(&record),
            newly_unlocked,
        })
    }

    /// Records that the user shared a daily note and re-runs achievement
    /// evaluation.
    ///
    /// The at-most-once-per-day rule is the note store's to enforce; this
    /// operation just counts.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn record_note_shared(
        &self,
        user: &UserId,
    ) -> Result<Vec<AchievementId>, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let mut record = self.progress.get_or_create(user).await?;
        streak::apply_rollover(&mut record, self.clock.today());

        record.notes_shared += 1;
        let newly_unlocked = achievements::evaluate(&mut record, self.clock.now());
        self.progress.put_record(&record).await?;

        debug!(
            "Note shared by {}: {} total",
            user, record.notes_shared
        );
        Ok(newly_unlocked)
    }

    /// Reinitializes a user's record to defaults.
    ///
    /// Achievement unlocks survive or are wiped according to the service's
    /// [`ResetPolicy`].
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn reset_progress(
        &self,
        user: &UserId,
    ) -> Result<ProgressSnapshot, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let old = self.progress.get_or_create(user).await?;
        let mut fresh = ProgressRecord::new(user.clone());
        if self.reset_policy == ResetPolicy::PreserveAchievements {
            fresh.achievements = old.achievements;
        }
        self.progress.put_record(&fresh).await?;

        info!("Progress reset for {}", user);
        Ok(ProgressSnapshot::from_record(&fresh))
    }

    /// Rolls the user's task set into a new day: every task reverts to
    /// pending and the per-day counters restart.
    ///
    /// Called at the day boundary (e.g. on the first request of a new
    /// calendar day) by the surrounding service.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn refresh_day(
        &self,
        user: &UserId,
    ) -> Result<ProgressSnapshot, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let mut record = self.progress.get_or_create(user).await?;
        streak::apply_rollover(&mut record, self.clock.today());

        let mut tasks = self.tasks.list_tasks(user).await?;
        for task in &mut tasks {
            task.mark_pending();
        }
        record.today_total = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        record.today_completed = 0;
        record.all_tasks_completed_today = false;
        record.streak_status = streak::derive_status(&record);

        self.tasks.put_tasks(user, tasks).await?;
        self.progress.put_record(&record).await?;

        info!("Day refreshed for {}", user);
        Ok(ProgressSnapshot::from_record(&record))
    }

    /// The user's achievements grouped by kind, with catalog entries
    /// lazily initialized and evaluation re-run first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on repository failures.
    pub async fn get_achievements(
        &self,
        user: &UserId,
    ) -> Result<AchievementsView, ProgressServiceError> {
        let lock = self.locks.lock_for(user)?;
        let _guard = lock.lock().await;

        let mut record = self.progress.get_or_create(user).await?;
        streak::apply_rollover(&mut record, self.clock.today());
        achievements::evaluate(&mut record, self.clock.now());
        self.progress.put_record(&record).await?;

        Ok(AchievementsView::from_record(&record))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::StorageError;
    use stride_core::model::{Category, Difficulty};
    use stride_core::streak::StreakStatus;
    use stride_core::time::fixed_clock;

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

    async fn seed_service(task_count: u64) -> (ProgressService, UserId) {
        let repo = InMemoryRepository::new();
        let user = UserId::new("user_123");
        let tasks: Vec<Task> = (1..=task_count)
            .map(|id| build_task(id, Category::Habits))
            .collect();
        repo.put_tasks(&user, tasks).await.unwrap();

        let service = ProgressService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        (service, user)
    }

    #[tokio::test]
    async fn toggle_unknown_task_is_not_found() {
        let (service, user) = seed_service(1).await;
        let err = service
            .toggle_task(&user, TaskId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressServiceError::TaskNotFound { task, .. } if task == TaskId::new(99)
        ));
    }

    #[tokio::test]
    async fn toggle_against_an_empty_task_set_is_not_found() {
        let (service, user) = seed_service(0).await;
        let err = service.toggle_task(&user, TaskId::new(1)).await.unwrap_err();
        assert!(matches!(err, ProgressServiceError::TaskNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_task_set_reports_zero_percent() {
        let (service, user) = seed_service(0).await;
        let snapshot = service.get_progress(&user).await.unwrap();
        assert_eq!(snapshot.today_total, 0);
        assert_eq!(snapshot.completion_percent, 0);
    }

    #[tokio::test]
    async fn get_progress_is_idempotent() {
        let (service, user) = seed_service(3).await;
        service.toggle_task(&user, TaskId::new(1)).await.unwrap();

        let first = service.get_progress(&user).await.unwrap();
        let second = service.get_progress(&user).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn completing_the_whole_set_starts_a_streak() {
        let (service, user) = seed_service(3).await;

        for id in 1..=2 {
            let outcome = service.toggle_task(&user, TaskId::new(id)).await.unwrap();
            assert!(!outcome.progress.all_tasks_completed_today);
        }

        let outcome = service.toggle_task(&user, TaskId::new(3)).await.unwrap();
        assert_eq!(outcome.progress.current_streak, 1);
        assert_eq!(outcome.progress.longest_streak, 1);
        assert_eq!(outcome.progress.streak_status, StreakStatus::NewStreak);
        assert!(outcome.progress.all_tasks_completed_today);
        assert_eq!(outcome.progress.completion_percent, 100);
    }

    #[tokio::test]
    async fn toggle_round_trip_restores_counters_and_streak() {
        let (service, user) = seed_service(2).await;
        service.toggle_task(&user, TaskId::new(1)).await.unwrap();
        let completed = service.toggle_task(&user, TaskId::new(2)).await.unwrap();
        assert_eq!(completed.progress.current_streak, 1);

        let reverted = service.toggle_task(&user, TaskId::new(2)).await.unwrap();
        assert!(!reverted.task.is_completed());
        assert_eq!(reverted.progress.current_streak, 0);
        assert_eq!(reverted.progress.streak_status, StreakStatus::NoStreak);
        assert_eq!(reverted.progress.today_completed, 1);
        assert_eq!(reverted.progress.total_tasks_completed, 1);
        assert_eq!(
            reverted.progress.categories_completed.get(&Category::Habits),
            Some(&1)
        );
    }

    #[tokio::test]
    async fn note_sharing_unlocks_the_first_note_badge() {
        let (service, user) = seed_service(1).await;
        let newly = service.record_note_shared(&user).await.unwrap();
        assert_eq!(newly, vec![AchievementId::new("notes_1")]);

        // counting continues, but no re-unlock
        let newly = service.record_note_shared(&user).await.unwrap();
        assert!(newly.is_empty());
    }

    #[tokio::test]
    async fn reset_preserves_achievements_by_default() {
        let (service, user) = seed_service(1).await;
        service.record_note_shared(&user).await.unwrap();

        let snapshot = service.reset_progress(&user).await.unwrap();
        assert_eq!(snapshot.notes_shared, 0);
        assert_eq!(snapshot.current_streak, 0);

        let view = service.get_achievements(&user).await.unwrap();
        assert_eq!(view.unlocked, 1);
    }

    #[tokio::test]
    async fn reset_can_clear_achievements_when_configured() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("user_123");
        repo.put_tasks(&user, vec![build_task(1, Category::Habits)])
            .await
            .unwrap();
        let service = ProgressService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )
        .with_reset_policy(ResetPolicy::ClearAchievements);
        assert_eq!(service.reset_policy(), ResetPolicy::ClearAchievements);

        service.record_note_shared(&user).await.unwrap();
        service.reset_progress(&user).await.unwrap();

        let view = service.get_achievements(&user).await.unwrap();
        assert_eq!(view.unlocked, 0);
    }

    #[tokio::test]
    async fn storage_errors_pass_through() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl ProgressRepository for FailingStore {
            async fn get_or_create(
                &self,
                _user: &UserId,
            ) -> Result<ProgressRecord, StorageError> {
                Err(StorageError::Connection("down".into()))
            }

            async fn put_record(&self, _record: &ProgressRecord) -> Result<(), StorageError> {
                Err(StorageError::Connection("down".into()))
            }
        }

        let service = ProgressService::new(
            fixed_clock(),
            Arc::new(FailingStore),
            Arc::new(InMemoryRepository::new()),
        );
        let err = service
            .get_progress(&UserId::new("user_123"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressServiceError::Storage(_)));
    }
}
