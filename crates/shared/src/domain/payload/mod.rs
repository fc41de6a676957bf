use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Request body whose decoding outcome is held back until the caller has
/// been checked. Only a JSON object is accepted; arrays and scalars are
/// never read as structs.
#[derive(Debug)]
pub struct Payload<T>(Result<T>);

impl<T: DeserializeOwned> Payload<T> {
    pub fn decode(body: &[u8]) -> Self {
        Payload(decode_object(body))
    }
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> Result<T> {
        self.0
    }
}

impl<T> From<T> for Payload<T> {
    fn from(value: T) -> Self {
        Payload(Ok(value))
    }
}

fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "request body is not valid JSON");
        invalid_body()
    })?;
    if !value.is_object() {
        return Err(invalid_body());
    }
    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "request body has the wrong shape");
        invalid_body()
    })
}

pub fn invalid_body() -> ApiError {
    ApiError::InvalidInput("Invalid JSON body".into())
}
