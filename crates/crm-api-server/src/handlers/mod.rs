pub mod auth;
pub mod clients;
pub mod followups;
pub mod health;
pub mod leads;
pub mod notes;
pub mod reports;
pub mod tasks;
pub mod team;
