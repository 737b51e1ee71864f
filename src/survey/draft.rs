//! Stepwise survey creation dialogue.
//!
//! The creator first picks a question count, then alternates between
//! entering a question text and its comma-separated options until the
//! count is reached.

use super::SurveyLimits;
use crate::error::SurveyError;
use crate::models::{MemberId, Question, SurveyDefinition};
use std::collections::HashSet;
use tracing::debug;

/// Current step of the creation dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    AskQuestionCount,
    AskQuestionText,
    AskQuestionOptions,
}

/// What the dialogue needs next after an accepted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftStep {
    /// Ask for the text of question `number` (1-based).
    AskQuestionText { number: usize },
    /// Ask for the options of question `number` (1-based).
    AskQuestionOptions { number: usize },
    /// All questions are complete.
    Finalized(SurveyDefinition),
}

/// An in-progress survey owned by its creator.
#[derive(Debug, Clone)]
pub struct SurveyDraft {
    creator: MemberId,
    phase: DraftPhase,
    target_count: Option<usize>,
    pending_text: Option<String>,
    questions: Vec<Question>,
}

impl SurveyDraft {
    pub fn new(creator: MemberId) -> Self {
        Self {
            creator,
            phase: DraftPhase::AskQuestionCount,
            target_count: None,
            pending_text: None,
            questions: Vec::new(),
        }
    }

    pub fn creator(&self) -> MemberId {
        self.creator
    }

    #[allow(dead_code)] // Inspection accessor
    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    /// Question count chosen by the creator, once set.
    #[allow(dead_code)] // Inspection accessor
    pub fn target_count(&self) -> Option<usize> {
        self.target_count
    }

    /// Questions completed so far.
    #[allow(dead_code)] // Inspection accessor
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Feed one message from the creator into the dialogue.
    ///
    /// On error the phase and collected data are unchanged.
    pub fn submit(&mut self, input: &str, limits: &SurveyLimits) -> Result<DraftStep, SurveyError> {
        let input = input.trim();

        match self.phase {
            DraftPhase::AskQuestionCount => {
                let count = parse_question_count(input, limits.max_questions)?;
                debug!("Draft by {} will have {} questions", self.creator, count);
                self.target_count = Some(count);
                self.phase = DraftPhase::AskQuestionText;
                Ok(DraftStep::AskQuestionText { number: 1 })
            }
            DraftPhase::AskQuestionText => {
                if input.is_empty() {
                    return Err(SurveyError::EmptyQuestionText);
                }
                self.pending_text = Some(input.to_string());
                self.phase = DraftPhase::AskQuestionOptions;
                Ok(DraftStep::AskQuestionOptions {
                    number: self.questions.len() + 1,
                })
            }
            DraftPhase::AskQuestionOptions => {
                let options = parse_options(input, limits)?;
                let text = self.pending_text.take().unwrap_or_default();
                self.questions.push(Question { text, options });

                let target = self.target_count.unwrap_or(1);
                if self.questions.len() < target {
                    self.phase = DraftPhase::AskQuestionText;
                    Ok(DraftStep::AskQuestionText {
                        number: self.questions.len() + 1,
                    })
                } else {
                    debug!("Draft by {} finalized", self.creator);
                    Ok(DraftStep::Finalized(SurveyDefinition::new(
                        std::mem::take(&mut self.questions),
                    )))
                }
            }
        }
    }
}

/// Parse the question count, accepting `1..=max`.
fn parse_question_count(input: &str, max: usize) -> Result<usize, SurveyError> {
    match input.parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => Ok(n),
        _ => Err(SurveyError::InvalidQuestionCount { max }),
    }
}

/// Split and validate a comma-separated option list.
pub fn parse_options(input: &str, limits: &SurveyLimits) -> Result<Vec<String>, SurveyError> {
    let (min, max) = (limits.min_options, limits.max_options);
    let options: Vec<String> = input.split(',').map(|o| o.trim().to_string()).collect();

    if options.len() < min || options.len() > max {
        return Err(SurveyError::InvalidOptionCount { min, max });
    }

    if options.iter().any(|o| o.is_empty()) {
        return Err(SurveyError::EmptyOption { min, max });
    }

    if let Some(option) = options.iter().find(|o| o.len() > limits.max_option_bytes) {
        return Err(SurveyError::OptionTooLong {
            option: option.clone(),
            max_bytes: limits.max_option_bytes,
        });
    }

    let mut seen = HashSet::new();
    for option in &options {
        if !seen.insert(option.as_str()) {
            return Err(SurveyError::DuplicateOption {
                option: option.clone(),
            });
        }
    }

    Ok(options)
}
