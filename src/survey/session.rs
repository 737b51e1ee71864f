//! The single global survey slot.
//!
//! At most one round exists at a time, either drafting or distributing.
//! All state of a round lives in the [`SurveySession`] held here, so
//! freeing the slot discards draft, cursors and ledger together.

use super::{Answered, DraftStep, Distribution, SurveyDraft, SurveyLimits};
use crate::analysis::tally_survey;
use crate::error::SurveyError;
use crate::models::{MemberId, Question, SurveyReport};
use chrono::Utc;
use tracing::info;

/// State of the active round.
#[derive(Debug, Clone)]
pub enum SurveySession {
    Drafting(SurveyDraft),
    Distributing(Distribution),
}

impl SurveySession {
    fn creator(&self) -> MemberId {
        match self {
            SurveySession::Drafting(draft) => draft.creator(),
            SurveySession::Distributing(dist) => dist.creator(),
        }
    }
}

/// Summary of the slot, for status replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Idle,
    Drafting {
        creator: MemberId,
    },
    Distributing {
        creator: MemberId,
        completed: usize,
        recipients: usize,
    },
}

/// What a cancellation discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// An unfinished draft.
    Draft,
    /// A running survey; these members still had open questions.
    Distribution { pending: Vec<MemberId> },
}

/// Owner of the optional active round.
#[derive(Debug, Default)]
pub struct SurveySlot {
    session: Option<SurveySession>,
}

impl SurveySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SlotStatus {
        match &self.session {
            None => SlotStatus::Idle,
            Some(SurveySession::Drafting(draft)) => SlotStatus::Drafting {
                creator: draft.creator(),
            },
            Some(SurveySession::Distributing(dist)) => SlotStatus::Distributing {
                creator: dist.creator(),
                completed: dist.completed(),
                recipients: dist.recipients(),
            },
        }
    }

    /// Creator of the active round, if any.
    pub fn creator(&self) -> Option<MemberId> {
        self.session.as_ref().map(SurveySession::creator)
    }

    /// True while `member` has an open draft.
    pub fn is_drafting(&self, member: MemberId) -> bool {
        matches!(&self.session, Some(SurveySession::Drafting(d)) if d.creator() == member)
    }

    /// True while `member` has an unanswered question.
    pub fn is_progressing(&self, member: MemberId) -> bool {
        self.distribution()
            .is_some_and(|dist| dist.is_progressing(member))
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        match &self.session {
            Some(SurveySession::Distributing(dist)) => Some(dist),
            _ => None,
        }
    }

    /// The question a member currently has to answer.
    pub fn current_question(&self, member: MemberId) -> Option<&Question> {
        let dist = self.distribution()?;
        dist.question(dist.cursor(member)?)
    }

    /// Open a new draft for `creator`.
    pub fn start(
        &mut self,
        creator: MemberId,
        member_count: usize,
        limits: &SurveyLimits,
    ) -> Result<(), SurveyError> {
        if member_count < limits.min_members {
            return Err(SurveyError::InsufficientMembers {
                required: limits.min_members,
                current: member_count,
            });
        }
        if self.session.is_some() {
            return Err(SurveyError::SurveyAlreadyActive);
        }

        info!("Member {} started drafting a survey", creator);
        self.session = Some(SurveySession::Drafting(SurveyDraft::new(creator)));
        Ok(())
    }

    /// Feed draft input from `member`.
    ///
    /// When the draft is finalized the slot switches to distribution with a
    /// cursor for each of `recipients`.
    pub fn submit_draft(
        &mut self,
        member: MemberId,
        input: &str,
        limits: &SurveyLimits,
        recipients: &[MemberId],
    ) -> Result<DraftStep, SurveyError> {
        let draft = match &mut self.session {
            Some(SurveySession::Drafting(draft)) if draft.creator() == member => draft,
            Some(_) => return Err(SurveyError::NotCreator),
            None => return Err(SurveyError::NoActiveSurvey),
        };

        let step = draft.submit(input, limits)?;
        if let DraftStep::Finalized(ref definition) = step {
            let dist = Distribution::begin(member, definition.clone(), recipients);
            self.session = Some(SurveySession::Distributing(dist));
        }
        Ok(step)
    }

    /// Route an answer attempt to the running distribution.
    pub fn submit_answer(&mut self, member: MemberId, raw: &str) -> Result<Answered, SurveyError> {
        match &mut self.session {
            Some(SurveySession::Distributing(dist)) => dist.submit_answer(member, raw),
            _ => Err(SurveyError::NoPendingQuestion),
        }
    }

    /// Tally the running survey and free the slot.
    ///
    /// Only the creator may do this, and only once distribution has begun.
    /// A rejected request changes nothing.
    pub fn compute_and_reset(&mut self, requester: MemberId) -> Result<SurveyReport, SurveyError> {
        let dist = match &self.session {
            Some(SurveySession::Distributing(dist)) => dist,
            _ => return Err(SurveyError::NoActiveSurvey),
        };
        if dist.creator() != requester {
            return Err(SurveyError::NotCreator);
        }

        let report = SurveyReport {
            creator: requester,
            generated_at: Utc::now(),
            recipients: dist.recipients(),
            questions: tally_survey(dist.definition(), dist.ledger()),
        };

        info!(
            "Results computed for survey by {} ({} answers); slot freed",
            requester,
            dist.ledger().len()
        );
        self.session = None;
        Ok(report)
    }

    /// Abandon the active round. Only its creator may cancel.
    pub fn cancel(&mut self, requester: MemberId) -> Result<CancelOutcome, SurveyError> {
        let creator = self.creator().ok_or(SurveyError::NoActiveSurvey)?;
        if creator != requester {
            return Err(SurveyError::NotCreator);
        }

        let outcome = match self.session.take() {
            Some(SurveySession::Distributing(dist)) => CancelOutcome::Distribution {
                pending: dist.pending_members(),
            },
            _ => CancelOutcome::Draft,
        };
        info!("Survey by {} cancelled", requester);
        Ok(outcome)
    }
}
