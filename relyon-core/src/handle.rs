use crate::error::AuthError;
use crate::random::RandomSource;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Length in characters of every generated state handle.
pub const HANDLE_LEN: usize = 24;

// 18 bytes encode to exactly 24 base64 characters with no padding.
const HANDLE_BYTES: usize = HANDLE_LEN / 4 * 3;

/// Generate an opaque, URL-safe state handle.
///
/// The handle carries 144 bits of entropy drawn from `random` and is encoded
/// with the base64url alphabet, so it can be embedded in a query string as is.
pub fn generate_handle(random: &dyn RandomSource) -> Result<String, AuthError> {
    let mut bytes = [0u8; HANDLE_BYTES];
    random.fill_bytes(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
