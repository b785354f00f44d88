use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// LEDGER
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    AppointmentRevenue,
    OtherRevenue,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::AppointmentRevenue => write!(f, "appointment_revenue"),
            TransactionKind::OtherRevenue => write!(f, "other_revenue"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// A ledger line. Transactions are created and deleted, never edited.
///
/// `professional_role` is captured when an appointment's revenue is
/// recorded so the split does not move if staff titles change later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub appointment_id: Option<Uuid>,
    pub professional_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub appointment_id: Option<Uuid>,
    pub professional_role: Option<String>,
}

impl CreateTransactionRequest {
    pub fn validate(&self) -> Result<(), FinanceError> {
        if self.description.trim().is_empty() {
            return Err(FinanceError::ValidationError("Description is required".to_string()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(FinanceError::ValidationError("Amount must be greater than zero".to_string()));
        }
        if self.kind == TransactionKind::AppointmentRevenue && self.appointment_id.is_none() {
            return Err(FinanceError::ValidationError(
                "Appointment revenue must reference an appointment".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub kind: Option<TransactionKind>,
}

// ==============================================================================
// REPORTING
// ==============================================================================

/// Calendar month selection; `month` is zero-based (0 = January) as on
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSelection {
    pub month: u32,
    pub year: i32,
}

impl MonthSelection {
    pub fn new(month: u32, year: i32) -> Result<Self, FinanceError> {
        let selection = Self { month, year };
        selection.first_day()?;
        Ok(selection)
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month0(),
            year: date.year(),
        }
    }

    /// Resolves optional query parameters, defaulting to the month of `today`.
    pub fn resolve(month: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<Self, FinanceError> {
        let current = Self::containing(today);
        Self::new(month.unwrap_or(current.month), year.unwrap_or(current.year))
    }

    pub fn first_day(&self) -> Result<NaiveDate, FinanceError> {
        let month = if self.month < 12 { self.month + 1 } else { 0 };
        NaiveDate::from_ymd_opt(self.year, month, 1).ok_or_else(|| {
            FinanceError::ValidationError(format!(
                "Invalid month selection {}/{} (month must be 0-11)",
                self.month, self.year
            ))
        })
    }

    /// First day of the following month (exclusive upper bound).
    pub fn end_exclusive(&self) -> Result<NaiveDate, FinanceError> {
        self.first_day()?
            .checked_add_months(Months::new(1))
            .ok_or_else(|| FinanceError::ValidationError("Month out of range".to_string()))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month
    }

    pub fn months_back(&self, count: u32) -> Result<Self, FinanceError> {
        let first = self
            .first_day()?
            .checked_sub_months(Months::new(count))
            .ok_or_else(|| FinanceError::ValidationError("Month out of range".to_string()))?;
        Ok(Self::containing(first))
    }

    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month + 1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub clinic_total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub total_billed_from_appointments: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub label: String,
    pub month: u32,
    pub year: i32,
    #[serde(flatten)]
    pub summary: MonthlySummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinanceReport {
    pub month: u32,
    pub year: i32,
    pub summary: MonthlySummary,
    pub series: Vec<MonthBucket>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinanceError {
    #[error("Transaction not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<FinanceError> for AppError {
    fn from(err: FinanceError) -> Self {
        match err {
            FinanceError::NotFound => AppError::NotFound(err.to_string()),
            FinanceError::ValidationError(msg) => AppError::ValidationError(msg),
            FinanceError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
