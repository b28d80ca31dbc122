pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod queries;
pub mod scenario;
pub mod schema;
pub mod transaction;
