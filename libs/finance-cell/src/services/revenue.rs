//! Clinic revenue split and monthly aggregation.
//!
//! Everything here is pure: callers fetch the ledger and hand it in.

use crate::models::{FinanceError, MonthBucket, MonthSelection, MonthlySummary, Transaction, TransactionKind};

/// Role whose appointments are billed entirely to the clinic.
pub const FULL_SHARE_ROLE: &str = "Psicólogo";
/// Prices strictly above this pay a percentage commission instead of the flat fee.
pub const COMMISSION_THRESHOLD: f64 = 150.0;
pub const COMMISSION_PERCENT: f64 = 20.0;
pub const FLAT_CLINIC_FEE: f64 = 50.0;

pub const SERIES_MONTHS: u32 = 6;

/// The clinic's share of one appointment's price.
pub fn clinic_share(price: f64, professional_role: &str) -> f64 {
    if professional_role.trim() == FULL_SHARE_ROLE {
        price
    } else if price > COMMISSION_THRESHOLD {
        price * COMMISSION_PERCENT / 100.0
    } else {
        FLAT_CLINIC_FEE
    }
}

/// Aggregates the transactions dated inside `selection`; anything outside
/// the month is ignored.
///
/// Appointment revenue without a recorded role is split with the
/// commission rule.
pub fn monthly_summary(transactions: &[Transaction], selection: MonthSelection) -> MonthlySummary {
    let mut summary = MonthlySummary::default();

    for transaction in transactions.iter().filter(|t| selection.contains(t.date)) {
        match transaction.kind {
            TransactionKind::AppointmentRevenue => {
                let role = transaction.professional_role.as_deref().unwrap_or_default();
                summary.clinic_total_revenue += clinic_share(transaction.amount, role);
                summary.total_billed_from_appointments += transaction.amount;
            }
            TransactionKind::OtherRevenue => summary.clinic_total_revenue += transaction.amount,
            TransactionKind::Expense => summary.total_expenses += transaction.amount,
        }
    }

    summary.net_profit = summary.clinic_total_revenue - summary.total_expenses;
    summary
}

/// Six calendar-month buckets, oldest first, ending with `selection`.
pub fn six_month_series(
    transactions: &[Transaction],
    selection: MonthSelection,
) -> Result<Vec<MonthBucket>, FinanceError> {
    (0..SERIES_MONTHS)
        .rev()
        .map(|back| {
            let month = selection.months_back(back)?;
            Ok(MonthBucket {
                label: month.label(),
                month: month.month,
                year: month.year,
                summary: monthly_summary(transactions, month),
            })
        })
        .collect()
}
