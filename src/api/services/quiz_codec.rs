//! Reversible obfuscation of quiz payloads.
//!
//! Question, options and answer are base64-encoded on the wire so casual
//! inspection of API traffic does not reveal answers. This is obfuscation,
//! not encryption.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub fn encode(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

pub fn decode(value: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(value)
        .context("payload is not valid base64")?;
    String::from_utf8(bytes).context("decoded payload is not valid UTF-8")
}
