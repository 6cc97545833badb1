//! Multipart form decoding.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::debug;

use crate::error::ApiError;

/// Named parts of a multipart body, read fully into memory.
///
/// The upload limit is enforced by the router's body limit layer.
#[derive(Debug, Default)]
pub struct FormData {
    parts: HashMap<String, Bytes>,
}

impl FormData {
    /// Read every named part. Later parts replace earlier ones of the same name.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut parts = HashMap::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let data = field.bytes().await?;
            debug!("Form part '{name}': {} bytes", data.len());
            parts.insert(name, data);
        }
        Ok(Self { parts })
    }

    /// Binary part, treating an empty part as absent.
    pub fn take_bytes(&mut self, name: &str) -> Option<Bytes> {
        self.parts.remove(name).filter(|data| !data.is_empty())
    }

    /// Text part, treating an empty part as absent.
    pub fn take_text(&mut self, name: &'static str) -> Result<Option<String>, ApiError> {
        match self.take_bytes(name) {
            None => Ok(None),
            Some(data) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|_| ApiError::InvalidField(name)),
        }
    }

    /// Text part that must be present. An empty value is accepted.
    pub fn require_text(&mut self, name: &'static str) -> Result<String, ApiError> {
        let data = self
            .parts
            .remove(name)
            .ok_or(ApiError::MissingField(name))?;
        String::from_utf8(data.to_vec()).map_err(|_| ApiError::InvalidField(name))
    }
}
