//! Payload transport encoding.
//!
//! nwaku's REST API carries message payloads as standard, padded base64.

#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded payload is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn encode(text: &str) -> String {
    base64::encode(text.as_bytes())
}

pub fn try_decode(encoded: &str) -> Result<String, CodecError> {
    let bytes = base64::decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decodes a payload received from a node.
///
/// Never fails: malformed input is logged and yields an empty string, so a
/// single bad payload doesn't abort a polling loop.
pub fn decode(encoded: &str) -> String {
    try_decode(encoded).unwrap_or_else(|err| {
        tracing::error!("failed to decode payload: {err}");
        String::new()
    })
}
