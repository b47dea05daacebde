//! Domain layer for the help desk backend.
//!
//! This crate contains:
//! - Aggregates (User, tokens, Schedule, ScheduleGeneration, ShiftTemplate, SchedulerConfig)
//! - Aggregate validation errors
//! - Solver and transcript wire types
//! - Collaborator contracts (email, scheduler, transcripts) with mock implementations

pub mod models;
pub mod services;
