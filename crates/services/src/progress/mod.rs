mod locks;
mod service;
mod view;

pub use service::{ProgressService, ResetPolicy};
pub use view::{
    AchievementGroup, AchievementItem, AchievementsView, ProgressSnapshot, ToggleOutcome,
};
