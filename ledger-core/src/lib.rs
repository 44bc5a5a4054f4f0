pub mod calculations;
pub mod db;
pub mod models;
pub mod service;

pub use db::repository::{LedgerRepository, RepositoryError};
pub use models::*;
