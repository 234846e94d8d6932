pub mod admin;
pub mod connection;
pub mod migrations;
pub mod repositories;
pub mod seed;

pub use admin::{initialize, status_report, AdminError, InitReport, LawyerSummary, StatusReport};
pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use seed::{SeedResult, SEED_LAWYERS};
