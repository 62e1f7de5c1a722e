use crate::question::Question;

/// Where the interactive session currently is. An incorrect answer keeps the
/// question on screen so the user can try again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingTopic,
    QuestionDisplayed,
    AnsweredCorrect,
    AnsweredIncorrect,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

/// The single mutable record behind the quiz UI. Owned and mutated only by
/// the session loop; never persisted.
#[derive(Debug)]
pub struct QuizSession {
    pub topic: String,
    pub question: Option<Question>,
    pub selected: usize,
    pub phase: Phase,
    pub awaiting_next_question: bool,
    pub questions_served: usize,
}

impl QuizSession {
    pub fn new() -> Self {
        QuizSession {
            topic: String::new(),
            question: None,
            selected: 0,
            phase: Phase::AwaitingTopic,
            awaiting_next_question: false,
            questions_served: 0,
        }
    }

    /// Install a freshly fetched question. Selection resets so every question
    /// starts from a clean set of controls.
    pub fn show_question(&mut self, question: Question) {
        self.question = Some(question);
        self.selected = 0;
        self.phase = Phase::QuestionDisplayed;
        self.awaiting_next_question = false;
        self.questions_served += 1;
    }

    /// Drop back to topic entry, clearing the current question.
    pub fn reset_topic(&mut self) {
        self.topic.clear();
        self.question = None;
        self.selected = 0;
        self.phase = Phase::AwaitingTopic;
        self.awaiting_next_question = false;
    }

    pub fn select_previous(&mut self) {
        if self.can_answer() && self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn select_next(&mut self) {
        let Some(question) = &self.question else {
            return;
        };
        if self.can_answer() && self.selected + 1 < question.choices.len() {
            self.selected += 1;
        }
    }

    /// Compare the selected choice against the correct answer and advance the
    /// phase machine. Returns `None` when there is nothing to answer.
    pub fn submit_answer(&mut self) -> Option<AnswerOutcome> {
        if !self.can_answer() {
            return None;
        }
        let question = self.question.as_ref()?;
        let choice = question.choices.get(self.selected)?;

        if question.is_correct(choice) {
            self.phase = Phase::AnsweredCorrect;
            self.awaiting_next_question = true;
            Some(AnswerOutcome::Correct)
        } else {
            self.phase = Phase::AnsweredIncorrect;
            self.awaiting_next_question = false;
            Some(AnswerOutcome::Incorrect)
        }
    }

    /// A follow-up fetch is only offered after a correct answer.
    pub fn next_question_allowed(&self) -> bool {
        self.awaiting_next_question && self.phase == Phase::AnsweredCorrect
    }

    pub fn quit(&mut self) {
        self.phase = Phase::Quit;
    }

    fn can_answer(&self) -> bool {
        matches!(
            self.phase,
            Phase::QuestionDisplayed | Phase::AnsweredIncorrect
        )
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entropy_question() -> Question {
        Question::new(
            "What is entropy?".into(),
            vec![
                "A measure of disorder".into(),
                "A force".into(),
                "A type of energy".into(),
                "A particle".into(),
            ],
            "A measure of disorder".into(),
            "Entropy quantifies disorder in a system.".into(),
        )
        .unwrap()
    }

    fn session_with_question() -> QuizSession {
        let mut session = QuizSession::new();
        session.topic = "thermodynamics".into();
        session.show_question(entropy_question());
        session
    }

    #[test]
    fn new_session_awaits_topic() {
        let session = QuizSession::new();
        assert_eq!(session.phase, Phase::AwaitingTopic);
        assert!(session.question.is_none());
        assert!(!session.awaiting_next_question);
    }

    #[test]
    fn showing_a_question_enters_displayed_phase() {
        let session = session_with_question();
        assert_eq!(session.phase, Phase::QuestionDisplayed);
        assert_eq!(session.selected, 0);
        assert_eq!(session.questions_served, 1);
    }

    #[test]
    fn correct_answer_unlocks_next_question() {
        let mut session = session_with_question();
        let outcome = session.submit_answer();
        assert_eq!(outcome, Some(AnswerOutcome::Correct));
        assert_eq!(session.phase, Phase::AnsweredCorrect);
        assert!(session.awaiting_next_question);
        assert!(session.next_question_allowed());
    }

    #[test]
    fn incorrect_answer_surfaces_explanation_and_allows_retry() {
        let mut session = session_with_question();
        session.select_next();
        let outcome = session.submit_answer();
        assert_eq!(outcome, Some(AnswerOutcome::Incorrect));
        assert_eq!(session.phase, Phase::AnsweredIncorrect);
        assert!(!session.awaiting_next_question);
        assert!(!session.next_question_allowed());

        // Retry with the right choice.
        session.select_previous();
        assert_eq!(session.submit_answer(), Some(AnswerOutcome::Correct));
    }

    #[test]
    fn selection_is_clamped_to_choices() {
        let mut session = session_with_question();
        session.select_previous();
        assert_eq!(session.selected, 0);
        for _ in 0..10 {
            session.select_next();
        }
        assert_eq!(session.selected, 3);
    }

    #[test]
    fn answering_is_locked_after_a_correct_answer() {
        let mut session = session_with_question();
        session.submit_answer();
        assert_eq!(session.submit_answer(), None);
        session.select_next();
        assert_eq!(session.selected, 0);
    }

    #[test]
    fn next_question_resets_selection_and_flag() {
        let mut session = session_with_question();
        session.select_next();
        session.select_next();
        session.submit_answer();
        session.select_previous();
        session.select_previous();
        session.submit_answer();
        assert!(session.next_question_allowed());

        session.show_question(entropy_question());
        assert_eq!(session.selected, 0);
        assert!(!session.awaiting_next_question);
        assert_eq!(session.questions_served, 2);
    }

    #[test]
    fn reset_topic_clears_the_question() {
        let mut session = session_with_question();
        session.reset_topic();
        assert_eq!(session.phase, Phase::AwaitingTopic);
        assert!(session.question.is_none());
        assert!(session.topic.is_empty());
    }

    #[test]
    fn quit_is_terminal() {
        let mut session = session_with_question();
        session.quit();
        assert_eq!(session.phase, Phase::Quit);
        assert_eq!(session.submit_answer(), None);
    }

    #[test]
    fn submit_without_question_is_a_no_op() {
        let mut session = QuizSession::new();
        assert_eq!(session.submit_answer(), None);
        assert_eq!(session.phase, Phase::AwaitingTopic);
    }
}
