//! Core data model types for quizmark.
//!
//! These are the fundamental types the entire quizmark system uses to
//! represent grading outcomes and persisted submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of short-answer questions on the quiz.
pub const QUESTION_COUNT: usize = 3;

/// A validated grading outcome.
///
/// Produced exclusively by [`crate::normalize::normalize`]. The fixed-size
/// arrays make the shape invariant structural: every result carries exactly
/// one score and one feedback entry per question, no matter how mangled the
/// upstream reply was, so no consumer needs to special-case shorter or
/// longer sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Per-question scores. Intended range is 0..=100, but values outside
    /// it are stored as-is; only the array shape is enforced.
    pub scores: [i64; QUESTION_COUNT],
    /// Overall narrative feedback.
    pub feedback: String,
    /// Per-question feedback. Entries may be empty.
    pub per_question_feedback: [String; QUESTION_COUNT],
}

/// One persisted submission: a submitter's answers combined with the
/// normalized grading outcome.
///
/// The serialized camelCase field names are the wire contract: the results
/// dashboard reads these exact keys and relies on the 3-element array
/// shapes of `answers`, `scores`, and `perQuestionFeedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Monotonically increasing id assigned by the caller at creation
    /// time. Primary key for deletion.
    pub id: i64,
    /// Display name chosen by the submitter. Untrusted, stored as-is.
    pub nickname: String,
    /// The raw text answers, one per question.
    pub answers: [String; QUESTION_COUNT],
    /// Copied from the grading result.
    pub scores: [i64; QUESTION_COUNT],
    /// Copied from the grading result.
    pub feedback: String,
    /// Copied from the grading result.
    pub per_question_feedback: [String; QUESTION_COUNT],
    /// Fixed at append time, never mutated.
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Combine submitter metadata with a grading result into a record
    /// ready for the store.
    pub fn from_grading(
        id: i64,
        nickname: String,
        answers: [String; QUESTION_COUNT],
        result: GradingResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            nickname,
            answers,
            scores: result.scores,
            feedback: result.feedback,
            per_question_feedback: result.per_question_feedback,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_submission() -> Submission {
        Submission::from_grading(
            1700000000000,
            "mina".into(),
            ["FEOL first".into(), "1T1C".into(), "yield is ratio".into()],
            GradingResult {
                scores: [80, 65, 90],
                feedback: "Solid overall.".into(),
                per_question_feedback: ["good".into(), "ok".into(), "great".into()],
            },
            Utc::now(),
        )
    }

    #[test]
    fn submission_wire_field_names() {
        let json = serde_json::to_value(sample_submission()).unwrap();
        let obj = json.as_object().unwrap();

        for key in [
            "id",
            "nickname",
            "answers",
            "scores",
            "feedback",
            "perQuestionFeedback",
            "createdAt",
        ] {
            assert!(obj.contains_key(key), "missing wire field: {key}");
        }
        assert_eq!(obj.len(), 7);
        assert_eq!(obj["scores"].as_array().unwrap().len(), QUESTION_COUNT);
        assert_eq!(
            obj["perQuestionFeedback"].as_array().unwrap().len(),
            QUESTION_COUNT
        );
    }

    #[test]
    fn submission_serde_roundtrip() {
        let submission = sample_submission();
        let json = serde_json::to_string(&submission).unwrap();
        let deserialized: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, submission);
    }

    #[test]
    fn from_grading_copies_all_result_fields() {
        let submission = sample_submission();
        assert_eq!(submission.scores, [80, 65, 90]);
        assert_eq!(submission.feedback, "Solid overall.");
        assert_eq!(submission.per_question_feedback[2], "great");
    }
}
