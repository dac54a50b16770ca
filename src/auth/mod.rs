//! Authentication module for the login/session gate.
//!
//! The feed is only reachable once a session exists; the check itself is a
//! plain credential comparison against the demo account, persisted to disk
//! so the gate survives restarts. No tokens, no expiry.

pub mod session;

pub use session::{Session, SessionData};
