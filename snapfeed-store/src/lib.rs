// Library exports for snapfeed-store
// The migrate tools and any outer API layer consume these modules

pub mod clock;
pub mod config;
pub mod db;
pub mod diagram;
pub mod error;

pub use clock::{Clock, FixedClock, SharedClock, SystemClock};
pub use db::{Database, DbPool};
pub use error::{ConstraintKind, StoreError, StoreResult};
