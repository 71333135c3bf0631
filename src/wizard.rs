//! Follow-up wizard — the per-conversation state machine that walks a
//! classified complaint through its category's follow-up questions.
//!
//! Progresses linearly: one `submit_answer` per question, cursor advancing by
//! exactly one, never backwards. No operation blocks or performs I/O; the
//! surrounding layer owns the session exclusively and re-renders
//! `current_question` after each transition.

use serde::Serialize;

use crate::catalog::CategoryCatalog;
use crate::error::WizardError;

/// Mutable per-conversation wizard state.
///
/// Created by [`WizardSession::start`] the moment a complaint is classified
/// into a known category; discarded once complete and the answers are read
/// out, or when the conversation is abandoned. Answers live in a vector
/// parallel to `questions`, so reading them back always yields question order
/// and duplicate prompts keep distinct slots.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSession {
    category: String,
    questions: Vec<String>,
    answers: Vec<String>,
    cursor: usize,
}

impl WizardSession {
    /// Start a wizard for a classified category.
    ///
    /// The category is matched case-insensitively against the catalog. An
    /// unknown category is an explicit, routine refusal — the caller records
    /// only the primary fields — not a state of the machine.
    ///
    /// The question list is copied out of the catalog, so a session is
    /// unaffected by anything that happens to the catalog afterwards.
    pub fn start(category: &str, catalog: &CategoryCatalog) -> Result<Self, WizardError> {
        let entry = catalog
            .get(category)
            .ok_or_else(|| WizardError::UnknownCategory {
                category: category.trim().to_string(),
            })?;

        let questions = entry.questions.clone();
        let answers = vec![String::new(); questions.len()];
        Ok(Self {
            category: entry.name.clone(),
            questions,
            answers,
            cursor: 0,
        })
    }

    /// The catalog's display name for the active category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The next unanswered question, or `None` once every question has been
    /// answered. Pure read.
    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.cursor).map(String::as_str)
    }

    /// Record `text` as the answer to the current question and advance the
    /// cursor by one.
    ///
    /// Empty text is accepted — a skip and an empty answer are the same thing
    /// here; the distinction, if any, is the caller's choice of text. Calling
    /// this after completion is a caller bug and is rejected rather than
    /// silently dropped.
    pub fn submit_answer(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        if self.cursor >= self.questions.len() {
            return Err(WizardError::AlreadyComplete {
                total: self.questions.len(),
            });
        }
        self.answers[self.cursor] = text.into();
        self.cursor += 1;
        Ok(())
    }

    /// Skip the current question, leaving its answer empty.
    pub fn skip(&mut self) -> Result<(), WizardError> {
        self.submit_answer(String::new())
    }

    /// Answer every remaining question at once, in question order.
    ///
    /// For callers that collect all answers before submitting. The count must
    /// match the number of unanswered questions exactly, otherwise the caller
    /// has no way to know some answers were dropped.
    pub fn submit_all<I>(&mut self, answers: I) -> Result<(), WizardError>
    where
        I: IntoIterator<Item = String>,
    {
        let answers: Vec<String> = answers.into_iter().collect();
        let expected = self.remaining();
        if answers.len() != expected {
            return Err(WizardError::AnswerCountMismatch {
                expected,
                got: answers.len(),
            });
        }
        for answer in answers {
            self.submit_answer(answer)?;
        }
        Ok(())
    }

    /// True once every question has been answered.
    pub fn is_complete(&self) -> bool {
        self.cursor == self.questions.len()
    }

    /// Index of the next unanswered question.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of questions in this session.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Number of questions still unanswered.
    pub fn remaining(&self) -> usize {
        self.questions.len() - self.cursor
    }

    /// Ordered `(question, answer)` pairs. Unanswered questions carry their
    /// empty placeholder.
    pub fn answers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Consume the session, yielding the ordered `(question, answer)` pairs
    /// for persistence.
    pub fn into_answers(self) -> Vec<(String, String)> {
        self.questions.into_iter().zip(self.answers).collect()
    }
}
