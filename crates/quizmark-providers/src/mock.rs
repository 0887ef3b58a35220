//! Mock grading provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizmark_core::traits::{GradeRequest, GradeResponse, GradingProvider};

/// Default canned reply: a well-formed grading object.
const DEFAULT_REPLY: &str =
    r#"{"scores":[50,50,50],"feedback":"mock grading","per_question_feedback":["","",""]}"#;

/// A mock grading backend for exercising the orchestration flow without
/// real API calls. Returns a fixed raw reply and records what it was asked.
#[derive(Debug)]
pub struct MockGrader {
    reply: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<GradeRequest>>,
}

impl MockGrader {
    /// Create a mock that always returns the given raw reply text.
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of grading calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<GradeRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockGrader {
    fn default() -> Self {
        Self::with_fixed_reply(DEFAULT_REPLY)
    }
}

#[async_trait]
impl GradingProvider for MockGrader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn grade(&self, request: &GradeRequest) -> anyhow::Result<GradeResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        Ok(GradeResponse {
            raw_text: self.reply.clone(),
            model: "mock".to_string(),
            latency_ms: 1,
        })
    }
}
