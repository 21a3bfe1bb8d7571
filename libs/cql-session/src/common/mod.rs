//! Common types shared across the session layer

pub mod error;

pub use error::{SessionError, SessionResult};
