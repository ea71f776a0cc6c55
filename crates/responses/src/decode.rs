use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::value::RawValue;
use thiserror::Error;

/// Why a response body could not be turned into a typed result.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was empty or whitespace only.
    #[error("empty response body")]
    Empty,
    /// The body is JSON but not an object, which no response type accepts.
    #[error("expected a JSON object, body starts with `{0}`")]
    NotAnObject(char),
    /// The body is not valid JSON or does not fit the expected types.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The node answered with an error envelope instead of a result.
    #[error("node returned an error: {0}")]
    Rpc(String),
}

/// A typed snapshot of one HTTP response.
///
/// Absent and `null` fields decode to their zero value, so only structurally broken bodies
/// fail.
pub trait Response: DeserializeOwned {
    /// Decode raw response bytes.
    fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        decode(raw)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope<'a> {
    #[serde(borrow, default)]
    error: Option<&'a RawValue>,
    #[serde(borrow, default)]
    result: Option<&'a RawValue>,
}

/// Decode `raw` into `T`, rejecting anything that is not a JSON object or that carries an
/// error envelope in place of a result.
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    let first = raw.iter().copied().find(|b| !b.is_ascii_whitespace()).ok_or(DecodeError::Empty)?;
    if first != b'{' {
        return Err(DecodeError::NotAnObject(char::from(first)));
    }

    let envelope: ErrorEnvelope<'_> = serde_json::from_slice(raw)?;
    if let (Some(err), None) = (envelope.error, envelope.result) {
        return Err(DecodeError::Rpc(err.get().to_owned()));
    }

    Ok(serde_json::from_slice(raw)?)
}

/// Treat an explicit `null` like an absent field.
pub(crate) fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
