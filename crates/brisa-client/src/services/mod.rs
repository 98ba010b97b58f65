pub mod admin;
pub mod agenda;
pub mod ledger;
pub mod report;
