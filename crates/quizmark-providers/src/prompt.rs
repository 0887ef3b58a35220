//! Grading prompt construction.
//!
//! The rubric instructs the model to answer with raw JSON only. Models do
//! not reliably obey, which is why the core normalizer exists; the rubric
//! just makes the clean path the common one.

use quizmark_core::traits::GradeRequest;

/// Grading rubric sent ahead of every answer sheet.
pub const RUBRIC: &str = r#"You are a strict semiconductor teacher.
You will grade 3 short-answer questions about semiconductor concepts.

You MUST follow these rules strictly:
- Score each question from 0 to 100.
- If an answer is clearly off-topic, random text, or meaningless characters, you MUST give that question a score of 0.
- If an answer is extremely short (less than 5 words) and does not contain any relevant technical content, you MUST give that question a score of 0.
- Do not be generous. Only give scores above 0 when the student shows some understanding of the concept.
- If the student confuses concepts completely, heavily penalize the score.

You MUST return ONLY a raw JSON object, with NO markdown, NO code fences, NO extra text.
The JSON format must be exactly:

{
  "scores": [number, number, number],
  "feedback": "overall feedback, 3-5 sentences",
  "per_question_feedback": [
    "feedback for Q1",
    "feedback for Q2",
    "feedback for Q3"
  ]
}

Question 1: Explain the difference between FEOL and BEOL, and why high-temperature steps are only possible during FEOL.
Key points:
- FEOL: transistor/device formation, Si/SiO2/poly, tolerates high temperature (oxidation, annealing)
- BEOL: metal interconnect/vias/dielectrics, Cu/Al/low-k, no high temperature (metal diffusion/melting, organic dielectric damage)

Question 2: Explain how a DRAM cell stores 0 and 1, and why refresh is required.
Key points:
- 1T1C structure, charge on the capacitor encodes 0/1
- leakage current drains the charge, so periodic refresh is required
- mentioning wordline/bitline/sense amplifier earns extra credit

Question 3: Explain what semiconductor yield is, why it matters, and at least two main reasons it drops.
Key points:
- yield = fraction of good dies per wafer
- directly drives unit cost
- particles, process non-uniformity, equipment drift, design issues
"#;

/// Render the submitter's answers into the text block that follows the
/// rubric.
pub fn build_answer_sheet(request: &GradeRequest) -> String {
    let mut sheet = format!("Nickname: {}\n\nAnswers:\n", request.nickname);
    for (i, answer) in request.answers.iter().enumerate() {
        sheet.push_str(&format!("Q{}: {}\n", i + 1, answer));
    }
    sheet.push_str(
        "\nIf images are provided, you may use them only as supplementary context, \
         but grading should be based mainly on the text answers.\n",
    );
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_sheet_numbers_all_questions() {
        let request = GradeRequest {
            nickname: "mina".into(),
            answers: ["one".into(), "two".into(), "three".into()],
            images: vec![],
        };
        let sheet = build_answer_sheet(&request);
        assert!(sheet.contains("Nickname: mina"));
        assert!(sheet.contains("Q1: one"));
        assert!(sheet.contains("Q2: two"));
        assert!(sheet.contains("Q3: three"));
    }

    #[test]
    fn rubric_demands_raw_json() {
        assert!(RUBRIC.contains("raw JSON object"));
        assert!(RUBRIC.contains("per_question_feedback"));
    }
}
