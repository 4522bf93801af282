pub mod config;
mod error;
pub mod recommendation;
pub mod tag;
pub mod tracing;
pub mod user;

pub use error::HandlerError;
