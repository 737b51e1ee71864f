//! Survey errors.
//!
//! Every variant is recoverable. The `Display` text is the corrective
//! message sent back to the member who triggered it.

use std::fmt;
use thiserror::Error;

/// Errors raised by the survey state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("Please enter a number between 1 and {max}.")]
    InvalidQuestionCount { max: usize },

    #[error("The question text cannot be empty. Please enter it again.")]
    EmptyQuestionText,

    #[error("Please enter between {min} and {max} options, separated by commas.")]
    InvalidOptionCount { min: usize, max: usize },

    #[error("Options cannot be empty. Please enter between {min} and {max} options, separated by commas.")]
    EmptyOption { min: usize, max: usize },

    #[error("The option \"{option}\" appears more than once. Please enter distinct options.")]
    DuplicateOption { option: String },

    #[error("The option \"{option}\" is too long (at most {max_bytes} bytes). Please shorten it.")]
    OptionTooLong { option: String, max_bytes: usize },

    #[error("Please choose one of the offered options: {}", .options.join(", "))]
    InvalidOption { options: Vec<String> },

    #[error("You need at least {required} members to create a survey. We have {current}.")]
    InsufficientMembers { required: usize, current: usize },

    #[error("There is already an active survey. Please wait for it to finish.")]
    SurveyAlreadyActive,

    #[error("There is no active survey.")]
    NoActiveSurvey,

    #[error("Only the creator of the current survey can do that.")]
    NotCreator,

    #[error("You have already answered this question. Only your first answer counts.")]
    DuplicateAnswer,

    #[error("You have no open survey question right now.")]
    NoPendingQuestion,
}

/// Error class, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    Capacity,
    DuplicateAnswer,
    NoPendingQuestion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Authorization => write!(f, "authorization"),
            ErrorKind::Capacity => write!(f, "capacity"),
            ErrorKind::DuplicateAnswer => write!(f, "duplicate-answer"),
            ErrorKind::NoPendingQuestion => write!(f, "no-pending-question"),
        }
    }
}

impl SurveyError {
    /// Returns the error class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SurveyError::InvalidQuestionCount { .. }
            | SurveyError::EmptyQuestionText
            | SurveyError::InvalidOptionCount { .. }
            | SurveyError::EmptyOption { .. }
            | SurveyError::DuplicateOption { .. }
            | SurveyError::OptionTooLong { .. }
            | SurveyError::InvalidOption { .. } => ErrorKind::Validation,
            SurveyError::SurveyAlreadyActive
            | SurveyError::NoActiveSurvey
            | SurveyError::NotCreator => ErrorKind::Authorization,
            SurveyError::InsufficientMembers { .. } => ErrorKind::Capacity,
            SurveyError::DuplicateAnswer => ErrorKind::DuplicateAnswer,
            SurveyError::NoPendingQuestion => ErrorKind::NoPendingQuestion,
        }
    }
}
