//! Data models for the survey bot.
//!
//! This module contains the core data structures shared by the registry,
//! the survey state machine and the report generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identity of a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub i64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target conversation for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Private chats share their id with the user, so members are reachable
/// directly through their identity.
impl From<MemberId> for ChatId {
    fn from(id: MemberId) -> Self {
        ChatId(id.0)
    }
}

/// A registered community member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable identity assigned by the chat platform.
    pub id: MemberId,
    /// Name shown in join notifications.
    pub display_name: String,
}

impl Member {
    pub fn new(id: MemberId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// A finalized survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text as shown to members.
    pub text: String,
    /// Answer options in the order the creator entered them.
    pub options: Vec<String>,
}

impl Question {
    /// Returns true if `answer` is exactly one of the declared options.
    pub fn accepts(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o == answer)
    }
}

/// The ordered question list of one survey round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyDefinition {
    pub questions: Vec<Question>,
}

impl SurveyDefinition {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

/// Tally of a single option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTally {
    pub option: String,
    pub count: usize,
    /// Share of the question's answers, rounded to two decimals.
    pub percentage: f64,
}

/// Tally of all options of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTally {
    pub question: String,
    /// Number of recorded answers for this question.
    pub total: usize,
    pub options: Vec<OptionTally>,
}

impl QuestionTally {
    /// Looks up the tally row for an option.
    #[allow(dead_code)] // Inspection accessor
    pub fn option(&self, option: &str) -> Option<&OptionTally> {
        self.options.iter().find(|o| o.option == option)
    }
}

/// The complete result of a survey round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    /// Member who created the survey and requested the results.
    pub creator: MemberId,
    /// When the results were computed.
    pub generated_at: DateTime<Utc>,
    /// Number of members the survey was sent to.
    pub recipients: usize,
    /// Per-question tallies in survey order.
    pub questions: Vec<QuestionTally>,
}
