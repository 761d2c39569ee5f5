pub mod parser;
pub mod writer;

pub use parser::{parse_client_rows, parse_lead_rows, parse_table, Cell, LeadRow};
