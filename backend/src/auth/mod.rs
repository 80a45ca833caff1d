//! Identity provider verification and the session bridge.

pub mod jwks;
pub mod session;

pub use jwks::{session_token, AuthError, Identity, JwksClient};
pub use session::{Session, SessionBridge, SessionError};
