//! Grading provider trait — the boundary to the external grading service.
//!
//! Implemented by the `quizmark-providers` crate. Providers return the
//! service's reply text verbatim; interpreting it is the normalizer's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::QUESTION_COUNT;

/// Trait for grading backends.
///
/// An `Err` means the call itself failed outright (network, auth, quota)
/// and no reply text exists; the caller must not invoke the normalizer in
/// that case.
#[async_trait]
pub trait GradingProvider: Send + Sync + std::fmt::Debug {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Submit answers for grading and return the raw reply.
    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<GradeResponse>;
}

/// A grading request: the submitter's answers plus optional photos of
/// handwritten work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    /// Submitter display name, included in the prompt for context only.
    pub nickname: String,
    /// The raw text answers, one per question.
    pub answers: [String; QUESTION_COUNT],
    /// Supplementary images, forwarded to the service as-is.
    #[serde(default)]
    pub images: Vec<ImageAttachment>,
}

/// An uploaded answer image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAttachment {
    /// MIME type as reported by the uploader (e.g. "image/png").
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Raw reply from a grading call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeResponse {
    /// The complete textual reply, unparsed.
    pub raw_text: String,
    /// Model that produced the reply.
    pub model: String,
    /// Request latency in milliseconds.
    pub latency_ms: u64,
}
