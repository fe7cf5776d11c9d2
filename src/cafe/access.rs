// Access desk: scan → student → meal period → meal record

use super::api::CafeApi;
use super::meal_period::MealWindow;
use super::models::{MealType, Student};
use super::roster::StudentRoster;
use super::scan::normalize_scan;
use crate::error::{ClientError, Result};

/// Result of one check-in attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AccessOutcome {
    /// Nothing usable in the scanned text
    InvalidScan,

    NotFound {
        student_id: String,
    },

    Closed {
        student: Student,
        next: MealType,
    },

    Allowed {
        student: Student,
        meal: MealType,
    },

    /// The API refused a second meal in the same period
    AlreadyServed {
        student: Student,
        meal: MealType,
    },

    Failed {
        student: Student,
        reason: String,
    },
}

impl AccessOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessOutcome::Allowed { .. })
    }

    pub fn student(&self) -> Option<&Student> {
        match self {
            AccessOutcome::Closed { student, .. }
            | AccessOutcome::Allowed { student, .. }
            | AccessOutcome::AlreadyServed { student, .. }
            | AccessOutcome::Failed { student, .. } => Some(student),
            AccessOutcome::InvalidScan | AccessOutcome::NotFound { .. } => None,
        }
    }

    /// Operator-facing message
    pub fn message(&self) -> String {
        match self {
            AccessOutcome::InvalidScan => "❌ Please enter or scan a Student ID".to_string(),
            AccessOutcome::NotFound { student_id } => {
                format!("❌ Student not found ({})", student_id)
            }
            AccessOutcome::Closed { next, .. } => {
                format!("❌ Café is closed now. Next: {}", next.schedule_label())
            }
            AccessOutcome::Allowed { student, meal } => {
                format!("✅ {} - {}", student.name, meal)
            }
            AccessOutcome::AlreadyServed { student, meal } => {
                format!("❌ {} already used {} for this period", student.name, meal)
            }
            AccessOutcome::Failed { reason, .. } => {
                format!("❌ Error processing meal: {}", reason)
            }
        }
    }
}

/// Check-in workflow for one café station
pub struct AccessDesk {
    api: CafeApi,
    roster: StudentRoster,
}

impl AccessDesk {
    pub fn new(api: CafeApi, roster: StudentRoster) -> Self {
        Self { api, roster }
    }

    pub fn api(&self) -> &CafeApi {
        &self.api
    }

    pub fn roster(&self) -> &StudentRoster {
        &self.roster
    }

    /// Check a scan in against the current local meal window
    pub async fn check_in(&self, raw_scan: &str) -> Result<AccessOutcome> {
        self.check_in_during(raw_scan, MealWindow::now()).await
    }

    /// Check a scan in against an explicit meal window
    ///
    /// Errors are returned only when the operator has to act (log in again,
    /// fix connectivity); everything else is an `AccessOutcome`.
    pub async fn check_in_during(
        &self,
        raw_scan: &str,
        window: MealWindow,
    ) -> Result<AccessOutcome> {
        let Some(student_id) = normalize_scan(raw_scan) else {
            return Ok(AccessOutcome::InvalidScan);
        };

        let Some(student) = self.roster.lookup(&self.api, &student_id).await? else {
            tracing::info!(student_id = %student_id, "Unknown student");
            return Ok(AccessOutcome::NotFound { student_id });
        };

        let meal = match window {
            MealWindow::Open(meal) => meal,
            MealWindow::Closed { next } => {
                tracing::info!(student_id = %student_id, "Scan outside meal hours");
                return Ok(AccessOutcome::Closed { student, next });
            }
        };

        let outcome = match self.api.record_meal(student.id, meal).await {
            Ok(log) => {
                tracing::info!(
                    student_id = %student_id,
                    meal = %meal,
                    log_id = log.log_id,
                    "Meal recorded"
                );
                AccessOutcome::Allowed { student, meal }
            }
            Err(ClientError::Api { status: 400, message }) => {
                tracing::info!(
                    student_id = %student_id,
                    meal = %meal,
                    reason = %message,
                    "Meal already served this period"
                );
                AccessOutcome::AlreadyServed { student, meal }
            }
            Err(e) if e.requires_login() || matches!(e, ClientError::Network(_)) => {
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(student_id = %student_id, error = %e, "Failed to record meal");
                AccessOutcome::Failed {
                    student,
                    reason: e.to_string(),
                }
            }
        };

        Ok(outcome)
    }
}
