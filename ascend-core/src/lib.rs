//! ascend-core: task-template model, admin form state and submission workflow
//! for the Ascend admin tools.

pub mod column;
pub mod form;
pub mod gate;
pub mod submission;
pub mod task;
pub mod validation;

pub use column::LifeColumn;
pub use form::{coerce_xp, RewardField, TaskForm};
pub use gate::{AccessGate, GATE_CODE, WRONG_PASSWORD};
pub use submission::{
    AdminSession, SinkError, SubmitOutcome, SubmitPhase, TaskSink, CREATED_MESSAGE, UNKNOWN_ERROR,
};
pub use task::{Frequency, TaskSubmission, XpReward, MAX_REWARD_XP, MIN_REWARD_XP};
pub use validation::{validate, ValidationError, MAX_REWARDS, MIN_REWARDS};
