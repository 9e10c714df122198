//! # Relyon Core
//!
//! `relyon-core` provides the foundational capabilities shared by the relyon crates:
//! the error type, the secure random source used for CSRF handles, and the
//! per-request session capability the login flow reads and writes.

#![warn(missing_docs)]

/// Errors that can occur during the authentication process.
pub mod error;

/// Opaque state handle generation.
pub mod handle;

/// Secure random byte sources.
pub mod random;

/// The per-request session capability.
pub mod session;

pub use error::AuthError;
pub use handle::{generate_handle, HANDLE_LEN};
pub use random::{OsRandom, RandomSource};
pub use session::RequestSession;
