use async_openai::{Client, config::OpenAIConfig};
use serde::Deserialize;

use crate::question::{Question, QuestionError};

use super::response::{request_single_text_response, strip_code_fence};

const QUIZ_MODEL: &str = "gpt-5-nano";

/// Kept low so the model favors consistent, parseable output over creative
/// variation.
pub const GENERATION_TEMPERATURE: f32 = 0.5;

const SYSTEM_PROMPT: &str = r#"
You write multiple-choice quiz questions at an introductory (100-level) STEM difficulty.
You respond with a single JSON object and nothing else.
"#;

fn build_user_prompt(topic: &str) -> String {
    format!(
        "Generate a 100-level STEM question on the topic '{topic}'. \
         Provide the response in the following JSON format:\n\
         {{\n\
         \x20   \"question\": \"Your question here?\",\n\
         \x20   \"choices\": [\"option1\", \"option2\", \"option3\", \"option4\"],\n\
         \x20   \"correct_answer\": \"correct_option\",\n\
         \x20   \"explanation\": \"Explanation of the correct answer.\"\n\
         }}\n\
         The choices array must contain exactly four options and correct_answer \
         must match one of them verbatim."
    )
}

/// The wire shape of a quiz response. Every field is optional so a partial
/// record can be reported with the exact names that are missing instead of
/// being silently defaulted.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: Option<String>,
    choices: Option<Vec<String>>,
    correct_answer: Option<String>,
    explanation: Option<String>,
}

/// Ask the backend for one question on `topic` and validate the reply.
/// Stateless: one outbound call, no retries.
pub async fn request_question(
    client: &Client<OpenAIConfig>,
    topic: &str,
) -> Result<Question, QuestionError> {
    let user_prompt = build_user_prompt(topic);
    let raw = request_single_text_response(
        client,
        QUIZ_MODEL,
        GENERATION_TEMPERATURE,
        SYSTEM_PROMPT,
        &user_prompt,
    )
    .await
    .map_err(|err| QuestionError::BackendCallFailed(format!("{err:#}")))?;

    parse_question(&raw)
}

pub(crate) fn parse_question(raw: &str) -> Result<Question, QuestionError> {
    let cleaned = strip_code_fence(raw);
    let record: RawQuestion =
        serde_json::from_str(cleaned).map_err(|err| QuestionError::MalformedResponse {
            raw: raw.to_string(),
            diagnostic: err.to_string(),
        })?;

    let RawQuestion {
        question,
        choices,
        correct_answer,
        explanation,
    } = record;

    let mut missing = Vec::new();
    if question.is_none() {
        missing.push("question");
    }
    if choices.is_none() {
        missing.push("choices");
    }
    if correct_answer.is_none() {
        missing.push("correct_answer");
    }
    if explanation.is_none() {
        missing.push("explanation");
    }

    let (Some(question), Some(choices), Some(correct_answer), Some(explanation)) =
        (question, choices, correct_answer, explanation)
    else {
        return Err(QuestionError::IncompleteResponse { missing });
    };

    Question::new(question, choices, correct_answer, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTROPY_JSON: &str = r#"{
        "question": "What is entropy?",
        "choices": ["A measure of disorder", "A force", "A type of energy", "A particle"],
        "correct_answer": "A measure of disorder",
        "explanation": "Entropy quantifies disorder in a system."
    }"#;

    #[test]
    fn valid_response_round_trips_exactly() {
        let question = parse_question(ENTROPY_JSON).unwrap();
        assert_eq!(question.text, "What is entropy?");
        assert_eq!(
            question.choices,
            vec![
                "A measure of disorder",
                "A force",
                "A type of energy",
                "A particle"
            ]
        );
        assert_eq!(question.correct_answer, "A measure of disorder");
        assert_eq!(
            question.explanation,
            "Entropy quantifies disorder in a system."
        );
    }

    #[test]
    fn fenced_response_parses_identically() {
        let fenced = format!("```json\n{ENTROPY_JSON}\n```");
        assert_eq!(
            parse_question(&fenced).unwrap(),
            parse_question(ENTROPY_JSON).unwrap()
        );
    }

    #[test]
    fn missing_explanation_is_named() {
        let raw = r#"{
            "question": "What is entropy?",
            "choices": ["a", "b", "c", "d"],
            "correct_answer": "a"
        }"#;
        match parse_question(raw).unwrap_err() {
            QuestionError::IncompleteResponse { missing } => {
                assert_eq!(missing, vec!["explanation"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_field_is_treated_as_missing() {
        let raw = r#"{
            "question": "What?",
            "choices": ["a", "b"],
            "correct_answer": "a",
            "explanation": null
        }"#;
        match parse_question(raw).unwrap_err() {
            QuestionError::IncompleteResponse { missing } => {
                assert_eq!(missing, vec!["explanation"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_missing_field_is_reported() {
        match parse_question("{}").unwrap_err() {
            QuestionError::IncompleteResponse { missing } => {
                assert_eq!(
                    missing,
                    vec!["question", "choices", "correct_answer", "explanation"]
                )
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_text_is_malformed_not_a_panic() {
        match parse_question("not json at all").unwrap_err() {
            QuestionError::MalformedResponse { raw, diagnostic } => {
                assert_eq!(raw, "not json at all");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dangling_correct_answer_is_rejected() {
        let raw = r#"{
            "question": "What?",
            "choices": ["a", "b", "c", "d"],
            "correct_answer": "e",
            "explanation": ""
        }"#;
        assert!(matches!(
            parse_question(raw).unwrap_err(),
            QuestionError::InconsistentAnswer { .. }
        ));
    }

    #[test]
    fn choice_order_is_preserved() {
        let raw = r#"{
            "question": "Pick the last letter.",
            "choices": ["z", "y", "x", "w"],
            "correct_answer": "w",
            "explanation": ""
        }"#;
        let question = parse_question(raw).unwrap();
        assert_eq!(question.choices, vec!["z", "y", "x", "w"]);
    }

    #[test]
    fn user_prompt_names_the_topic_and_shape() {
        let prompt = build_user_prompt("thermodynamics");
        assert!(prompt.contains("'thermodynamics'"));
        for field in ["question", "choices", "correct_answer", "explanation"] {
            assert!(prompt.contains(field), "prompt is missing {field}");
        }
    }
}
