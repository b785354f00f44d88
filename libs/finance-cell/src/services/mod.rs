pub mod ledger;
pub mod revenue;

pub use ledger::FinanceService;
