//! Survey distribution.
//!
//! Every member walks the question list independently. A member's cursor
//! advances by one per accepted answer and is removed after the last
//! question.

use super::ResponseLedger;
use crate::error::SurveyError;
use crate::models::{MemberId, Question, SurveyDefinition};
use std::collections::HashMap;
use tracing::{debug, info};

/// Where a member goes after an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Deliver the question at this index.
    Question(usize),
    /// The member has answered every question.
    Completed,
}

/// Result of an accepted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answered {
    /// False when the ledger already held an answer for this question.
    pub counted: bool,
    pub next: NextStep,
}

/// A finalized survey being answered by the community.
#[derive(Debug, Clone)]
pub struct Distribution {
    creator: MemberId,
    definition: SurveyDefinition,
    cursors: HashMap<MemberId, usize>,
    recipients: usize,
    ledger: ResponseLedger,
}

impl Distribution {
    /// Open a cursor at the first question for every recipient.
    pub fn begin(creator: MemberId, definition: SurveyDefinition, recipients: &[MemberId]) -> Self {
        let cursors = if definition.is_empty() {
            HashMap::new()
        } else {
            recipients.iter().map(|id| (*id, 0)).collect()
        };

        info!(
            "Distributing {}-question survey from {} to {} members",
            definition.len(),
            creator,
            recipients.len()
        );

        Self {
            creator,
            definition,
            cursors,
            recipients: recipients.len(),
            ledger: ResponseLedger::new(),
        }
    }

    pub fn creator(&self) -> MemberId {
        self.creator
    }

    pub fn definition(&self) -> &SurveyDefinition {
        &self.definition
    }

    pub fn ledger(&self) -> &ResponseLedger {
        &self.ledger
    }

    /// Number of members the survey was sent to.
    pub fn recipients(&self) -> usize {
        self.recipients
    }

    /// Number of recipients who passed the last question.
    pub fn completed(&self) -> usize {
        self.recipients - self.cursors.len()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.definition.get(index)
    }

    /// Current question index of a member, if still progressing.
    pub fn cursor(&self, member: MemberId) -> Option<usize> {
        self.cursors.get(&member).copied()
    }

    pub fn is_progressing(&self, member: MemberId) -> bool {
        self.cursors.contains_key(&member)
    }

    /// Members that still have an open cursor, ordered.
    pub fn pending_members(&self) -> Vec<MemberId> {
        let mut pending: Vec<_> = self.cursors.keys().copied().collect();
        pending.sort();
        pending
    }

    /// Check an answer against the member's current question.
    ///
    /// A rejected answer leaves the cursor where it was.
    pub fn submit_answer(&mut self, member: MemberId, raw: &str) -> Result<Answered, SurveyError> {
        let index = self.cursor(member).ok_or(SurveyError::NoPendingQuestion)?;
        let question = self
            .definition
            .get(index)
            .ok_or(SurveyError::NoPendingQuestion)?;

        let answer = raw.trim();
        if !question.accepts(answer) {
            return Err(SurveyError::InvalidOption {
                options: question.options.clone(),
            });
        }

        let counted = self.ledger.record(member, &question.text, answer);
        if !counted {
            debug!("Member {} already answered \"{}\"", member, question.text);
        }

        let next_index = index + 1;
        let next = if next_index < self.definition.len() {
            self.cursors.insert(member, next_index);
            NextStep::Question(next_index)
        } else {
            self.cursors.remove(&member);
            debug!("Member {} completed the survey", member);
            NextStep::Completed
        };

        Ok(Answered { counted, next })
    }
}
