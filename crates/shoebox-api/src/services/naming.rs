//! Random, collision-free file names
//!
//! A name is a URL-safe base64 token of 8 to 16 random bytes (11 to 22
//! characters) followed by `.` and the file extension.

use base64::Engine;
use rand::Rng;
use shoebox_storage::{Storage, StorageResult};

const MIN_TOKEN_BYTES: usize = 8;
const MAX_TOKEN_BYTES: usize = 16;
const MIN_TOKEN_CHARS: usize = 11;
const MAX_TOKEN_CHARS: usize = 22;

pub struct NameGenerator;

impl NameGenerator {
    /// Draw names until one is not present in `storage`.
    ///
    /// The check is only valid at the instant it is made; callers must write
    /// right after and treat an `AlreadyExists` write as a reason to draw again.
    pub async fn generate(storage: &dyn Storage, extension: &str) -> StorageResult<String> {
        loop {
            let name = format!("{}.{}", random_token(), extension);
            if !storage.exists(&name).await? {
                return Ok(name);
            }
            tracing::debug!(file_name = %name, "Generated name already taken, drawing again");
        }
    }
}

/// URL-safe token from the thread-local CSPRNG.
pub fn random_token() -> String {
    let mut rng = rand::rng();
    let len = rng.random_range(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES);
    let mut bytes = [0u8; MAX_TOKEN_BYTES];
    rng.fill(&mut bytes[..len]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes[..len])
}

/// Whether `name` has the shape of a generated name: `[A-Za-z0-9_-]{11,22}.<ext>`
/// with a non-empty alphanumeric extension.
pub fn is_generated_name(name: &str) -> bool {
    let Some((token, extension)) = name.rsplit_once('.') else {
        return false;
    };

    (MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&token.len())
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        && !extension.is_empty()
        && extension.bytes().all(|b| b.is_ascii_alphanumeric())
}
