//! Session module: persisted authentication state
//!
//! A saved browser session (`auth.json`) is read once at startup and written
//! into each browsing context before that context navigates anywhere. A
//! context that navigates first would load its first page unauthenticated.

mod auth_state;
mod storage_file;

pub use auth_state::{load, try_load, AuthState};
