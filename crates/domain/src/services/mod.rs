//! Collaborator contracts used by the application services.
//!
//! Each contract has a mock implementation for development and testing.

pub mod email;
pub mod scheduler;
pub mod transcripts;

pub use email::{
    render, EmailError, EmailMessage, EmailSender, EmailTemplate, MockEmailSender, RenderedEmail,
};
pub use scheduler::{MockSchedulerClient, SchedulerClient, SchedulerError};
pub use transcripts::{MockTranscriptExtractor, TranscriptError, TranscriptExtractor};
