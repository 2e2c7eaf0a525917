//! Failure reporting: the diff bundle and the attachment sink.

use crate::result::CotejarResult;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Attachment name used for the diff bundle.
pub const ATTACHMENT_NAME: &str = "Screenshot diff";

/// Attachment type marking the bundle as an image-diff payload.
pub const ATTACHMENT_TYPE: &str = "application/vnd.allure.image.diff";

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Expected/actual/diff triplet encoded as PNG data URIs.
///
/// Serializes to the wire shape report viewers consume:
/// `{"expected": "data:image/png;base64,...", "actual": ..., "diff": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffBundle {
    /// Baseline image data URI
    pub expected: String,
    /// Candidate image data URI
    pub actual: String,
    /// Diff canvas data URI
    pub diff: String,
}

impl DiffBundle {
    /// Build a bundle from the three raw PNG byte buffers.
    #[must_use]
    pub fn new(expected_png: &[u8], actual_png: &[u8], diff_png: &[u8]) -> Self {
        Self {
            expected: data_uri(expected_png),
            actual: data_uri(actual_png),
            diff: data_uri(diff_png),
        }
    }

    /// Serialize the bundle to JSON bytes for attachment.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> CotejarResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn data_uri(png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    format!("{DATA_URI_PREFIX}{encoded}")
}

/// Fire-and-forget attachment sink of the host reporting system.
pub trait ReportSink: Send + Sync {
    /// Hand `bytes` to the report under `name` with the given type.
    fn attach(&self, bytes: &[u8], name: &str, attachment_type: &str);
}

/// Sink that discards every attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NullSink {
    /// Create a discarding sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ReportSink for NullSink {
    fn attach(&self, _bytes: &[u8], _name: &str, _attachment_type: &str) {}
}

/// One recorded attachment.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Attachment name
    pub name: String,
    /// Attachment type
    pub attachment_type: String,
    /// Raw payload
    pub bytes: Vec<u8>,
}

/// Sink that records attachments for inspection in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything attached so far.
    #[must_use]
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments
            .lock()
            .map_or_else(|_| Vec::new(), |a| a.clone())
    }

    /// Number of attachments recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attachments.lock().map_or(0, |a| a.len())
    }

    /// Whether nothing has been attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for MemorySink {
    fn attach(&self, bytes: &[u8], name: &str, attachment_type: &str) {
        if let Ok(mut attachments) = self.attachments.lock() {
            attachments.push(Attachment {
                name: name.to_string(),
                attachment_type: attachment_type.to_string(),
                bytes: bytes.to_vec(),
            });
        }
    }
}
