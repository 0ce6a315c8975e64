pub mod connection;
pub mod repositories;
pub mod schema;
pub(crate) mod rows;

pub use connection::{Database, DbConnection, DbPool};
