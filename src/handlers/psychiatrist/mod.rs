// handlers/psychiatrist/mod.rs - care-team endpoints (/api/psychiatrist/*)

pub mod patients;
pub mod reports;
