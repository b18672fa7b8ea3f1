//! HTTP surface: envelopes, session cookie, handlers, router.

pub mod cookies;
pub mod handlers;
pub mod server;
pub mod types;

pub use server::{router, serve, AppState};
