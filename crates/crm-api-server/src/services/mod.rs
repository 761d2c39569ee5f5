pub mod import;
pub mod reports;

pub use import::ImportService;
pub use reports::ReportsService;
