//! Application services and external service integrations.

pub mod auth;
pub mod email;
pub mod generation;
pub mod scheduler_client;
pub mod scheduler_configs;
pub mod schedules;
pub mod shift_templates;
pub mod transcripts;

pub use auth::{AuthError, AuthService, AuthSettings, TokenPair};
pub use email::build_email_sender;
pub use generation::{GenerateSchedule, ScheduleGenerationService};
pub use scheduler_client::HttpSchedulerClient;
pub use scheduler_configs::SchedulerConfigService;
pub use schedules::{NewSchedule, ScheduleService, ScheduleServiceError, ScheduleTransition};
pub use shift_templates::ShiftTemplateService;
pub use transcripts::HttpTranscriptExtractor;
