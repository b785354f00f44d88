use chrono::{Local, NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{
    CreateTransactionRequest, FinanceError, FinanceReport, MonthSelection, Transaction,
    TransactionKind, TransactionQuery,
};
use crate::services::revenue::{monthly_summary, six_month_series, SERIES_MONTHS};

fn db_error(err: anyhow::Error) -> FinanceError {
    FinanceError::DatabaseError(err.to_string())
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Transaction>, FinanceError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Transaction>, _>>()
        .map_err(|e| FinanceError::DatabaseError(e.to_string()))
}

pub struct FinanceService {
    supabase: SupabaseClient,
}

impl FinanceService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
        auth_token: &str,
    ) -> Result<Transaction, FinanceError> {
        request.validate()?;
        debug!("Recording {} of {:.2} on {}", request.kind, request.amount, request.date);

        let transaction_data = json!({
            "date": request.date,
            "description": request.description.trim(),
            "amount": request.amount,
            "kind": request.kind,
            "appointment_id": request.appointment_id,
            "professional_role": request.professional_role,
            "created_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/transactions",
                Some(auth_token),
                Some(transaction_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        let transaction = parse_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| FinanceError::DatabaseError("Failed to record transaction".to_string()))?;

        info!("Transaction {} recorded ({})", transaction.id, transaction.kind);
        Ok(transaction)
    }

    /// Mirrors an appointment's price into the ledger, snapshotting the
    /// professional's role for the revenue split.
    pub async fn record_appointment_revenue(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        price: f64,
        professional_role: &str,
        description: String,
        auth_token: &str,
    ) -> Result<Transaction, FinanceError> {
        self.create_transaction(
            CreateTransactionRequest {
                date,
                description,
                amount: price,
                kind: TransactionKind::AppointmentRevenue,
                appointment_id: Some(appointment_id),
                professional_role: Some(professional_role.to_string()),
            },
            auth_token,
        )
        .await
    }

    pub async fn remove_appointment_transactions(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), FinanceError> {
        debug!("Removing ledger entries for appointment {}", appointment_id);

        let path = format!("/rest/v1/transactions?appointment_id=eq.{}", appointment_id);
        self.supabase
            .delete(&path, Some(auth_token))
            .await
            .map_err(db_error)
    }

    pub async fn list_transactions(
        &self,
        query: TransactionQuery,
        auth_token: &str,
    ) -> Result<Vec<Transaction>, FinanceError> {
        let selection = MonthSelection::resolve(query.month, query.year, Local::now().date_naive())?;

        let mut path = format!(
            "/rest/v1/transactions?date=gte.{}&date=lt.{}&order=date.asc",
            selection.first_day()?,
            selection.end_exclusive()?,
        );
        if let Some(kind) = query.kind {
            path.push_str(&format!("&kind=eq.{}", kind));
        }

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)
    }

    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        auth_token: &str,
    ) -> Result<(), FinanceError> {
        let path = format!("/rest/v1/transactions?id=eq.{}", transaction_id);

        let existing: Vec<Value> = self.supabase
            .request(Method::GET, &format!("{}&select=id", path), Some(auth_token), None)
            .await
            .map_err(db_error)?;
        if existing.is_empty() {
            return Err(FinanceError::NotFound);
        }

        self.supabase
            .delete(&path, Some(auth_token))
            .await
            .map_err(db_error)?;

        info!("Transaction {} deleted", transaction_id);
        Ok(())
    }

    /// Monthly summary plus the rolling six-month series ending at `selection`.
    pub async fn report(
        &self,
        selection: MonthSelection,
        auth_token: &str,
    ) -> Result<FinanceReport, FinanceError> {
        let window_start = selection.months_back(SERIES_MONTHS - 1)?.first_day()?;
        let window_end = selection.end_exclusive()?;
        debug!("Building finance report for {} ({} to {})", selection.label(), window_start, window_end);

        let path = format!(
            "/rest/v1/transactions?date=gte.{}&date=lt.{}",
            window_start, window_end
        );
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;
        let transactions = parse_rows(result)?;

        Ok(FinanceReport {
            month: selection.month,
            year: selection.year,
            summary: monthly_summary(&transactions, selection),
            series: six_month_series(&transactions, selection)?,
        })
    }
}
