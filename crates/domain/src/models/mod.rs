//! Domain models for the help desk backend.

pub mod auth;
pub mod schedule;
pub mod schedule_generation;
pub mod scheduler_config;
pub mod shift_template;
pub mod solver;
pub mod transcript;
pub mod user;

pub use auth::{AuthContext, RefreshToken, SingleUseToken, TokenPurpose, TokenRejection};
pub use schedule::{Schedule, ScheduleError};
pub use schedule_generation::{GenerationError, GenerationStatus, ScheduleGeneration};
pub use scheduler_config::{SchedulerConfig, SchedulerConfigError, SchedulerConfigInput};
pub use shift_template::{CourseDemand, ShiftTemplate, ShiftTemplateError, ShiftTemplateInput};
pub use solver::{
    AvailabilityWindow, GenerateScheduleRequest, GenerateScheduleResponse, SolverAssignment,
    SolverAssistant, SolverConfig, SolverMetadata, SolverShift, SolverStatus,
};
pub use transcript::{TranscriptCourse, TranscriptRecord};
pub use user::{Registration, Role, User, UserError};
