use crate::error::AuthError;
use rand::rngs::OsRng;
use rand::TryRngCore;
use std::sync::Arc;

/// A source of cryptographically secure random bytes.
///
/// The login flow only ever asks for bytes through this trait so tests can
/// substitute a deterministic source.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError>;
}

/// Random source backed by the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError> {
        let mut rng = OsRng;
        rng.try_fill_bytes(dest)
            .map_err(|e| AuthError::Entropy(e.to_string()))
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Arc<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError> {
        (**self).fill_bytes(dest)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), AuthError> {
        (**self).fill_bytes(dest)
    }
}
