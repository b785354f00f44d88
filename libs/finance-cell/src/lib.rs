pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::finance_routes;
pub use services::revenue::{clinic_share, monthly_summary, six_month_series};
pub use services::FinanceService;
