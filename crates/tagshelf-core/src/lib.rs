pub mod config;
pub mod error;
pub mod persist;
pub mod prelude;
pub mod query;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod tags;
pub mod track;

pub use config::*;
pub use error::*;
pub use session::*;
pub use store::*;
