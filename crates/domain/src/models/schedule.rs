//! Schedule aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised by the schedule aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid title provided")]
    InvalidTitle,

    #[error("effective from must be before effective to and not equal")]
    InvalidEffectivePeriod,

    #[error("archived schedules cannot be activated")]
    ArchivedActivation,
}

/// A published roster of shift assignments.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    #[serde(rename = "schedule_id")]
    pub id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub assignments: Value,
    pub availability_metadata: Value,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub effective_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler_metadata: Option<Value>,
}

/// Checks that `effective_from` is strictly before `effective_to` when set.
pub fn validate_effective_period(
    effective_from: NaiveDate,
    effective_to: Option<NaiveDate>,
) -> Result<(), ScheduleError> {
    match effective_to {
        Some(to) if effective_from >= to => Err(ScheduleError::InvalidEffectivePeriod),
        _ => Ok(()),
    }
}

impl Schedule {
    /// Creates an inactive schedule with empty assignments.
    pub fn new(
        title: &str,
        created_by: Uuid,
        effective_from: NaiveDate,
        effective_to: Option<NaiveDate>,
    ) -> Result<Self, ScheduleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ScheduleError::InvalidTitle);
        }
        validate_effective_period(effective_from, effective_to)?;

        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            is_active: false,
            assignments: Value::Object(Default::default()),
            availability_metadata: Value::Object(Default::default()),
            created_at: Utc::now(),
            created_by,
            updated_at: None,
            archived_at: None,
            effective_from,
            effective_to,
            generation_id: None,
            scheduler_metadata: None,
        })
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Returns whether the call changed anything.
    pub fn activate(&mut self) -> Result<bool, ScheduleError> {
        if self.is_archived() {
            return Err(ScheduleError::ArchivedActivation);
        }
        if self.is_active {
            return Ok(false);
        }
        self.is_active = true;
        Ok(true)
    }

    /// Returns whether the call changed anything.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        true
    }

    /// Archiving also deactivates. Returns whether the call changed anything.
    pub fn archive(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_archived() {
            return false;
        }
        self.is_active = false;
        self.archived_at = Some(now);
        true
    }

    /// Returns whether the call changed anything.
    pub fn unarchive(&mut self) -> bool {
        if !self.is_archived() {
            return false;
        }
        self.archived_at = None;
        true
    }
}
