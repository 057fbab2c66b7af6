#![forbid(unsafe_code)]

pub mod error;
pub mod progress;

pub use stride_core::Clock;

pub use error::ProgressServiceError;
pub use progress::{
    AchievementGroup, AchievementItem, AchievementsView, ProgressService, ProgressSnapshot,
    ResetPolicy, ToggleOutcome,
};
