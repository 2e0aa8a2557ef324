//! JSON wire codec.
//!
//! Values of any shape go through `serde`; the codec never inspects them.
//! `unmarshal_into` leaves the destination untouched when decoding fails.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CallError;

pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CallError> {
    serde_json::to_vec(value).map_err(CallError::Encoding)
}

pub fn unmarshal<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CallError> {
    serde_json::from_slice(bytes).map_err(CallError::Decoding)
}

/// Decode `bytes` into a caller-provided slot.
pub fn unmarshal_into<T: DeserializeOwned>(bytes: &[u8], destination: &mut T) -> Result<(), CallError> {
    *destination = unmarshal(bytes)?;
    Ok(())
}
