// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate, NaiveTime};
use std::fmt;

use shared_models::error::AppError;
use shared_utils::time::{hhmm, hhmm_option, hhmm_vec};

use crate::services::availability::BookedInterval;

/// Longest appointment or booking accepted from clients.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub price: f64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Occupied interval `[start_time, start_time + duration)` as seen by the
    /// slot calculator.
    pub fn booked_interval(&self) -> BookedInterval {
        BookedInterval::new(self.start_time, self.duration_minutes.max(0) as u32)
    }

    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Only scheduled appointments move on; every other status is final.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self == AppointmentStatus::Scheduled && next != AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[serde(alias = "consulta")]
    Consultation,

    #[serde(alias = "retorno", alias = "followup")]
    FollowUp,

    #[serde(alias = "avaliacao", alias = "assessment")]
    Evaluation,

    #[serde(alias = "sessao", alias = "therapy")]
    TherapySession,

    #[serde(alias = "procedimento")]
    Procedure,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Evaluation => write!(f, "evaluation"),
            AppointmentType::TherapySession => write!(f, "therapy_session"),
            AppointmentType::Procedure => write!(f, "procedure"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub price: f64,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        validate_duration(self.duration_minutes)?;
        validate_price(self.price)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub professional_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<AppointmentType>,
    pub price: Option<f64>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        if let Some(duration) = self.duration_minutes {
            validate_duration(duration)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Whether applying this update can change the mirrored ledger entry.
    pub fn touches_billing(&self) -> bool {
        self.price.is_some() || self.date.is_some() || self.professional_id.is_some()
    }
}

fn validate_duration(duration_minutes: i32) -> Result<(), AppointmentError> {
    let minutes = u32::try_from(duration_minutes).unwrap_or(0);
    validate_minutes(minutes)
}

fn validate_minutes(minutes: u32) -> Result<(), AppointmentError> {
    if minutes == 0 || minutes > MAX_DURATION_MINUTES {
        return Err(AppointmentError::ValidationError(format!(
            "Duration must be between 1 and {} minutes",
            MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppointmentError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppointmentError::ValidationError("Price cannot be negative".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    pub date: Option<NaiveDate>,
    pub professional_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub professional_id: Option<Uuid>,
    /// Length of the appointment being scheduled. When given, candidates
    /// are checked for full interval overlap instead of start containment.
    pub duration: Option<u32>,
}

impl AvailabilityQuery {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        match self.duration {
            Some(duration) => validate_minutes(duration),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookedSlot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeSlotsRequest {
    pub date: Option<NaiveDate>,
    #[serde(with = "hhmm_vec")]
    pub candidates: Vec<NaiveTime>,
    #[serde(default)]
    pub booked: Vec<BookedSlot>,
}

impl ComputeSlotsRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        self.booked
            .iter()
            .try_for_each(|slot| validate_minutes(slot.duration))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClosureReason {
    Sunday,
    Holiday,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: Option<NaiveDate>,
    #[serde(with = "hhmm_vec")]
    pub slots: Vec<NaiveTime>,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ClosureReason>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Professional not found")]
    ProfessionalNotFound,

    #[error("Professional is inactive")]
    ProfessionalInactive,

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Billing error: {0}")]
    BillingError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::ProfessionalNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::ProfessionalInactive
            | AppointmentError::InvalidStatusTransition(_) => AppError::Conflict(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::BillingError(msg) | AppointmentError::DatabaseError(msg) => {
                AppError::Database(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn appointment_type_accepts_local_aliases() {
        let parsed: AppointmentType = serde_json::from_value(json!("retorno")).unwrap();
        assert_eq!(parsed, AppointmentType::FollowUp);
        assert_eq!(serde_json::to_value(parsed).unwrap(), "follow_up");
    }

    #[test]
    fn create_request_rejects_bad_duration_and_price() {
        let request: CreateAppointmentRequest = serde_json::from_value(json!({
            "patient_id": Uuid::new_v4(),
            "professional_id": Uuid::new_v4(),
            "date": "2026-10-19",
            "start_time": "09:00",
            "duration_minutes": 50,
            "appointment_type": "consultation",
            "price": 200.0
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let mut zero = request.clone();
        zero.duration_minutes = 0;
        assert!(zero.validate().is_err());

        let mut negative = request;
        negative.price = -1.0;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn malformed_time_is_rejected_at_the_boundary() {
        let result = serde_json::from_value::<ComputeSlotsRequest>(json!({
            "candidates": ["08:00", "9 o'clock"],
            "booked": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn slot_durations_are_bounded() {
        let request: ComputeSlotsRequest = serde_json::from_value(json!({
            "candidates": ["08:00"],
            "booked": [{ "time": "08:00", "duration": 0 }]
        }))
        .unwrap();
        assert_matches!(request.validate(), Err(AppointmentError::ValidationError(_)));

        let request: ComputeSlotsRequest = serde_json::from_value(json!({
            "candidates": ["08:00"],
            "booked": [{ "time": "08:00", "duration": u32::MAX }]
        }))
        .unwrap();
        assert_matches!(request.validate(), Err(AppointmentError::ValidationError(_)));

        let query = AvailabilityQuery {
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            professional_id: None,
            duration: Some(0),
        };
        assert_matches!(query.validate(), Err(AppointmentError::ValidationError(_)));
        assert!(AvailabilityQuery { duration: Some(MAX_DURATION_MINUTES), ..query.clone() }.validate().is_ok());
        assert!(AvailabilityQuery { duration: None, ..query }.validate().is_ok());
    }

    #[test]
    fn only_scheduled_appointments_change_status() {
        use AppointmentStatus::*;

        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!NoShow.can_transition_to(Scheduled));
        assert!(!Cancelled.can_transition_to(Scheduled));
        assert!(!Scheduled.can_transition_to(Scheduled));
    }

    #[test]
    fn update_tracks_billing_fields() {
        assert!(!UpdateAppointmentRequest { notes: Some("x".into()), ..Default::default() }.touches_billing());
        assert!(UpdateAppointmentRequest { price: Some(90.0), ..Default::default() }.touches_billing());
    }
}
