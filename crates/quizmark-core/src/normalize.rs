//! Grading reply normalizer.
//!
//! The grading service is asked for raw JSON and routinely returns it
//! wrapped in markdown fences, prefixed with prose, or cut off mid-object.
//! [`normalize`] turns any such reply into a structurally valid
//! [`GradingResult`]. Cheap precise interpretations are tried before
//! substring recovery; when nothing parses, a synthetic fallback preserves
//! the raw text for manual review. It never fails, so callers have no
//! error branch to write.

use serde_json::Value;

use crate::model::{GradingResult, QUESTION_COUNT};

/// Feedback prefix used when the reply could not be parsed at all. The raw
/// reply is appended verbatim so a human can still recover it.
const UNPARSEABLE_FEEDBACK_PREFIX: &str =
    "The grading reply could not be parsed as JSON. The raw reply follows:\n\n";

const UNPARSEABLE_FIRST_NOTE: &str = "Check the raw reply included in the overall feedback.";

/// Normalize a raw grading-service reply into a valid [`GradingResult`].
///
/// Total function: every input, including garbage, yields a result with
/// exactly [`QUESTION_COUNT`] scores and feedback entries.
pub fn normalize(raw: &str) -> GradingResult {
    let mut cleaned = raw.trim();
    if cleaned.starts_with("```") {
        cleaned = strip_code_fence(cleaned);
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => coerce(&value),
        Err(_) => match recover_embedded_object(cleaned) {
            Some(value) => coerce(&value),
            None => unparseable(raw),
        },
    }
}

/// Remove a markdown code fence: drop the opening line (fence plus optional
/// language tag) and everything from the last fence marker onward. A
/// missing closing fence leaves the tail untouched.
fn strip_code_fence(mut text: &str) -> &str {
    if let Some(newline) = text.find('\n') {
        text = &text[newline + 1..];
    }
    if let Some(fence) = text.rfind("```") {
        text = &text[..fence];
    }
    text.trim()
}

/// Second-chance parse: the substring from the first `{` to the last `}`,
/// inclusive, when the reply buries the object in surrounding noise.
fn recover_embedded_object(text: &str) -> Option<Value> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last < first {
        return None;
    }
    serde_json::from_str(&text[first..=last]).ok()
}

/// Coerce a parsed JSON value into the expected schema, substituting
/// defaults field by field. A malformed `scores` array is replaced
/// wholesale, never partially repaired.
fn coerce(value: &Value) -> GradingResult {
    let scores = value
        .get("scores")
        .and_then(score_array)
        .unwrap_or([0; QUESTION_COUNT]);

    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let per_question_feedback = value
        .get("per_question_feedback")
        .and_then(feedback_array)
        .unwrap_or_default();

    GradingResult {
        scores,
        feedback,
        per_question_feedback,
    }
}

fn score_array(value: &Value) -> Option<[i64; QUESTION_COUNT]> {
    let entries = value.as_array()?;
    if entries.len() != QUESTION_COUNT {
        return None;
    }
    let mut scores = [0i64; QUESTION_COUNT];
    for (slot, entry) in scores.iter_mut().zip(entries) {
        *slot = entry.as_i64()?;
    }
    Some(scores)
}

fn feedback_array(value: &Value) -> Option<[String; QUESTION_COUNT]> {
    let entries = value.as_array()?;
    if entries.len() != QUESTION_COUNT {
        return None;
    }
    let mut feedback: [String; QUESTION_COUNT] = Default::default();
    for (slot, entry) in feedback.iter_mut().zip(entries) {
        *slot = entry.as_str()?.to_string();
    }
    Some(feedback)
}

fn unparseable(raw: &str) -> GradingResult {
    GradingResult {
        scores: [0; QUESTION_COUNT],
        feedback: format!("{UNPARSEABLE_FEEDBACK_PREFIX}{raw}"),
        per_question_feedback: [
            UNPARSEABLE_FIRST_NOTE.to_string(),
            String::new(),
            String::new(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_passes_through() {
        let result = normalize(
            r#"{"scores":[10,20,30],"feedback":"ok","per_question_feedback":["a","b","c"]}"#,
        );
        assert_eq!(result.scores, [10, 20, 30]);
        assert_eq!(result.feedback, "ok");
        assert_eq!(
            result.per_question_feedback,
            ["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn fenced_json_matches_unwrapped() {
        let unwrapped =
            r#"{"scores":[0,0,0],"feedback":"x","per_question_feedback":["","",""]}"#;
        let fenced = format!("```json\n{unwrapped}\n```");
        assert_eq!(normalize(&fenced), normalize(unwrapped));
    }

    #[test]
    fn fence_without_language_tag() {
        let fenced =
            "```\n{\"scores\":[1,2,3],\"feedback\":\"f\",\"per_question_feedback\":[\"a\",\"b\",\"c\"]}\n```";
        assert_eq!(normalize(fenced).scores, [1, 2, 3]);
    }

    #[test]
    fn truncated_fence_still_parses() {
        // Opening fence but the reply was cut off before the closing one.
        let fenced = "```json\n{\"scores\":[7,8,9],\"feedback\":\"cut\",\"per_question_feedback\":[\"\",\"\",\"\"]}";
        let result = normalize(fenced);
        assert_eq!(result.scores, [7, 8, 9]);
        assert_eq!(result.feedback, "cut");
    }

    #[test]
    fn garbage_yields_fallback_embedding_raw_text() {
        let result = normalize("garbage not json at all");
        assert_eq!(result.scores, [0, 0, 0]);
        assert!(result.feedback.contains("garbage not json at all"));
        assert!(!result.per_question_feedback[0].is_empty());
        assert_eq!(result.per_question_feedback[1], "");
        assert_eq!(result.per_question_feedback[2], "");
    }

    #[test]
    fn embedded_object_recovered_from_noise() {
        let result = normalize(
            r#"noise {"scores":[5,5,5],"feedback":"f","per_question_feedback":["1","2","3"]} trailing"#,
        );
        assert_eq!(result.scores, [5, 5, 5]);
        assert_eq!(result.feedback, "f");
    }

    #[test]
    fn wrong_length_scores_replaced_wholesale() {
        let result = normalize(r#"{"scores":[1,2],"feedback":"f"}"#);
        assert_eq!(result.scores, [0, 0, 0]);
        assert_eq!(result.feedback, "f");
    }

    #[test]
    fn non_integer_score_entry_degrades_whole_array() {
        let result = normalize(r#"{"scores":[10,"twenty",30],"feedback":"f"}"#);
        assert_eq!(result.scores, [0, 0, 0]);
    }

    #[test]
    fn out_of_range_scores_pass_through_unclamped() {
        let result = normalize(r#"{"scores":[150,-3,40],"feedback":"f"}"#);
        assert_eq!(result.scores, [150, -3, 40]);
    }

    #[test]
    fn missing_fields_default() {
        let result = normalize(r#"{"scores":[1,2,3]}"#);
        assert_eq!(result.feedback, "");
        assert_eq!(result.per_question_feedback, ["", "", ""]);
    }

    #[test]
    fn wrong_shape_per_question_feedback_defaults() {
        let result =
            normalize(r#"{"scores":[1,2,3],"feedback":"f","per_question_feedback":["only one"]}"#);
        assert_eq!(result.per_question_feedback, ["", "", ""]);
    }

    #[test]
    fn top_level_non_object_coerces_to_defaults() {
        let result = normalize("42");
        assert_eq!(result.scores, [0, 0, 0]);
        assert_eq!(result.feedback, "");
    }

    #[test]
    fn empty_input_yields_fallback() {
        let result = normalize("");
        assert_eq!(result.scores, [0, 0, 0]);
        assert!(result.feedback.starts_with(UNPARSEABLE_FEEDBACK_PREFIX));
    }

    #[test]
    fn whitespace_padding_is_ignored() {
        let result = normalize(
            "  \n {\"scores\":[9,9,9],\"feedback\":\"w\",\"per_question_feedback\":[\"\",\"\",\"\"]} \n ",
        );
        assert_eq!(result.scores, [9, 9, 9]);
    }

    #[test]
    fn brace_pair_in_wrong_order_falls_back() {
        let result = normalize("} no object here {");
        assert_eq!(result.scores, [0, 0, 0]);
        assert!(result.feedback.contains("} no object here {"));
    }
}
