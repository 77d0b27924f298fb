#![warn(missing_docs)]
//! Sentinela tracks occupational-health documents (PCMSO, LTCAT, PGR) for
//! companies and their branches, classifies expiry from contract termination
//! dates, and throttles repeat alerts.

pub mod config;
pub mod engine;
pub mod history;
pub mod models;
pub mod persistence;
pub mod reports;
pub mod test_helpers;
