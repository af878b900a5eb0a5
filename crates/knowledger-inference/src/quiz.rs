//! Quiz-question synthesis: prompt contract, strict parsing, and
//! answer-choice shuffling.
//!
//! The model proposes four choices with its own correct index. Models tend to
//! place the correct answer first, so the proposed order is reshuffled and
//! the correct index recomputed before the question is shown.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use knowledger_core::{defaults, Error, Result};

/// Build the quiz-synthesis prompt for one ibit.
pub fn quiz_prompt(ibit_text: &str) -> String {
    format!(
        r#"Based on this information, create a multiple-choice quiz question:

Information: {ibit_text}

Create a question that tests knowledge about this information. Provide:
1. A clear question
2. Four answer options (A, B, C, D)
3. Only ONE option should be correct
4. Make the incorrect options plausible but clearly wrong

Respond ONLY with valid JSON in this exact format:
{{
  "question": "Your question here?",
  "options": ["Option A", "Option B", "Option C", "Option D"],
  "correct_index": 0
}}

The correct_index should be 0, 1, 2, or 3 indicating which option is correct."#
    )
}

/// A parsed, not-yet-shuffled question proposal from the model.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizProposal {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Parse a model response into a [`QuizProposal`], strictly.
///
/// All three keys are required, `correct_index` must point inside `options`,
/// and at most [`defaults::QUIZ_CHOICES`] options are accepted; anything else
/// is total synthesis failure.
pub fn parse_quiz_response(content: &str) -> Result<QuizProposal> {
    let stripped = crate::extraction::strip_code_fence(content);
    let proposal: QuizProposal = serde_json::from_str(stripped)
        .map_err(|e| Error::Inference(format!("Unparsable quiz response: {}", e)))?;

    if proposal.options.is_empty() || proposal.correct_index >= proposal.options.len() {
        return Err(Error::Inference(format!(
            "Quiz correct_index {} out of range for {} options",
            proposal.correct_index,
            proposal.options.len()
        )));
    }
    if proposal.options.len() > defaults::QUIZ_CHOICES {
        return Err(Error::Inference(format!(
            "Quiz proposal has {} options, at most {} allowed",
            proposal.options.len(),
            defaults::QUIZ_CHOICES
        )));
    }
    Ok(proposal)
}

/// Shuffle answer choices and recompute the correct index.
pub fn shuffle_choices<R: Rng>(
    mut options: Vec<String>,
    correct_index: usize,
    rng: &mut R,
) -> (Vec<String>, usize) {
    let correct = options[correct_index].clone();
    options.shuffle(rng);
    let new_index = options
        .iter()
        .position(|o| *o == correct)
        .unwrap_or(0);
    (options, new_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn proposal_json() -> &'static str {
        r#"{
            "question": "When did the Berlin Wall fall?",
            "options": ["1989", "1991", "1987", "1990"],
            "correct_index": 0
        }"#
    }

    #[test]
    fn test_parse_quiz_response() {
        let proposal = parse_quiz_response(proposal_json()).unwrap();
        assert_eq!(proposal.question, "When did the Berlin Wall fall?");
        assert_eq!(proposal.options.len(), 4);
        assert_eq!(proposal.correct_index, 0);
    }

    #[test]
    fn test_parse_quiz_response_fenced() {
        let fenced = format!("```json\n{}\n```", proposal_json());
        assert!(parse_quiz_response(&fenced).is_ok());
    }

    #[test]
    fn test_parse_quiz_response_missing_key_fails() {
        let content = r#"{"question": "Q?", "options": ["a", "b"]}"#;
        assert!(parse_quiz_response(content).is_err());
    }

    #[test]
    fn test_parse_quiz_response_index_out_of_range_fails() {
        let content = r#"{"question": "Q?", "options": ["a", "b"], "correct_index": 2}"#;
        assert!(parse_quiz_response(content).is_err());
    }

    #[test]
    fn test_parse_quiz_response_too_many_options_fails() {
        let content = r#"{
            "question": "Q?",
            "options": ["a", "b", "c", "d", "e"],
            "correct_index": 4
        }"#;
        assert!(parse_quiz_response(content).is_err());
    }

    #[test]
    fn test_parse_quiz_response_fewer_than_four_options_is_accepted() {
        let content = r#"{"question": "Q?", "options": ["a", "b", "c"], "correct_index": 1}"#;
        let proposal = parse_quiz_response(content).unwrap();
        assert_eq!(proposal.options.len(), 3);
    }

    #[test]
    fn test_shuffle_tracks_correct_answer() {
        let options = vec![
            "right".to_string(),
            "wrong1".to_string(),
            "wrong2".to_string(),
            "wrong3".to_string(),
        ];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (shuffled, index) = shuffle_choices(options.clone(), 0, &mut rng);
            assert_eq!(shuffled[index], "right");
            assert_eq!(shuffled.len(), 4);
        }
    }

    #[test]
    fn test_shuffle_moves_correct_answer_off_first_position() {
        let options = vec![
            "right".to_string(),
            "wrong1".to_string(),
            "wrong2".to_string(),
            "wrong3".to_string(),
        ];

        // Over many seeds the correct answer must not always stay first.
        let mut moved = false;
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (_, index) = shuffle_choices(options.clone(), 0, &mut rng);
            if index != 0 {
                moved = true;
                break;
            }
        }
        assert!(moved);
    }

    #[test]
    fn test_quiz_prompt_embeds_text() {
        let prompt = quiz_prompt("The wall fell in 1989.");
        assert!(prompt.contains("Information: The wall fell in 1989."));
        assert!(prompt.contains("correct_index"));
    }
}
