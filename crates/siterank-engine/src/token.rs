//! Unique token generation.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand_core::{OsRng, RngCore as _};
use siterank_core::catalog::UniqueToken;

/// Entropy of the random suffix. Uniqueness relies on this alone; there is no
/// retry on collision.
const SUFFIX_BYTES: usize = 32;

pub fn generate(url: &str) -> UniqueToken {
  let mut bytes = [0u8; SUFFIX_BYTES];
  OsRng.fill_bytes(&mut bytes);
  UniqueToken::from_parts(url, &URL_SAFE_NO_PAD.encode(bytes))
}
