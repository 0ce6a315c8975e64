pub mod models;
pub mod requests;
pub mod transport;

pub use models::*;
pub use requests::*;
pub use transport::*;
