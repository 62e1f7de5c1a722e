use thiserror::Error;

use crate::llm::secrets::API_KEY_ENV;

/// A validated multiple-choice question. Choice order is preserved exactly as
/// the backend returned it, since it is the order shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl Question {
    pub fn new(
        text: String,
        choices: Vec<String>,
        correct_answer: String,
        explanation: String,
    ) -> Result<Self, QuestionError> {
        let mut missing = Vec::new();
        if text.trim().is_empty() {
            missing.push("question");
        }
        if choices.len() < 2 {
            missing.push("choices");
        }
        if !missing.is_empty() {
            return Err(QuestionError::IncompleteResponse { missing });
        }

        if !choices.iter().any(|choice| *choice == correct_answer) {
            return Err(QuestionError::InconsistentAnswer {
                answer: correct_answer,
            });
        }

        Ok(Question {
            text,
            choices,
            correct_answer,
            explanation,
        })
    }

    /// Case-sensitive, matching the backend contract that `correct_answer`
    /// is one of `choices` verbatim.
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error(
        "OpenAI API key is not configured. Set {} or run `quizzer llm --set <KEY>`.",
        API_KEY_ENV
    )]
    BackendUnavailable,
    #[error("question request failed: {0}")]
    BackendCallFailed(String),
    #[error("model response was not valid JSON: {diagnostic}\nraw response:\n{raw}")]
    MalformedResponse { raw: String, diagnostic: String },
    #[error("model response is missing required field(s): {}", missing.join(", "))]
    IncompleteResponse { missing: Vec<&'static str> },
    #[error("correct answer {answer:?} is not one of the choices")]
    InconsistentAnswer { answer: String },
}
