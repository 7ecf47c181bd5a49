//! # Actix Middleware Library
//!
//! Session plumbing shared by Nova's Actix services.
//!
//! ## Modules
//! - `session_auth`: resolves the caller's session into an explicit [`AuthContext`]

pub mod session_auth;

pub use session_auth::{
    AuthContext, SessionAuth, SessionClaims, SessionError, SessionKeys, SessionUser,
};
