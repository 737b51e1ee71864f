//! Survey lifecycle.
//!
//! A round moves through two phases held in a single [`SurveySlot`]:
//! the creator's draft dialogue, then distribution to every member.

pub mod distribution;
pub mod draft;
pub mod ledger;
pub mod session;

pub use distribution::{Answered, Distribution, NextStep};
pub use draft::{DraftStep, SurveyDraft};
pub use ledger::ResponseLedger;
pub use session::{CancelOutcome, SurveySlot, SlotStatus};

/// Bounds applied while drafting a survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyLimits {
    /// Members required before a survey can be started.
    pub min_members: usize,
    /// Largest accepted question count.
    pub max_questions: usize,
    pub min_options: usize,
    pub max_options: usize,
    /// Longest accepted option, in bytes.
    pub max_option_bytes: usize,
}

impl Default for SurveyLimits {
    fn default() -> Self {
        Self {
            min_members: 3,
            max_questions: 3,
            min_options: 2,
            max_options: 4,
            max_option_bytes: 64,
        }
    }
}

impl From<&crate::config::SurveyConfig> for SurveyLimits {
    fn from(config: &crate::config::SurveyConfig) -> Self {
        Self {
            min_members: config.min_members,
            max_questions: config.max_questions,
            min_options: config.min_options,
            max_options: config.max_options,
            max_option_bytes: config.max_option_bytes,
        }
    }
}
