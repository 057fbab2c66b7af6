mod achievement;
mod ids;
mod progress;
mod task;

pub use achievement::{AchievementDefinition, AchievementId, AchievementKind, AchievementState};
pub use ids::{ParseIdError, TaskId, UserId};
pub use progress::ProgressRecord;
pub use task::{Category, Difficulty, ParseCategoryError, Task, TaskError, TaskStatus};
