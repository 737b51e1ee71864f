//! First-answer-wins response store.

use crate::models::MemberId;
use std::collections::HashMap;

/// Answers keyed by (member, question text).
#[derive(Debug, Clone, Default)]
pub struct ResponseLedger {
    entries: HashMap<(MemberId, String), String>,
}

impl ResponseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an answer unless this member already answered the question.
    ///
    /// Returns `false` when an answer already exists; the stored answer is kept.
    pub fn record(&mut self, member: MemberId, question: &str, answer: &str) -> bool {
        let key = (member, question.to_string());
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, answer.to_string());
        true
    }

    /// The recorded answer of a member to a question.
    #[allow(dead_code)] // Inspection accessor
    pub fn answer(&self, member: MemberId, question: &str) -> Option<&str> {
        self.entries
            .get(&(member, question.to_string()))
            .map(String::as_str)
    }

    /// Count answers per answer string for one question.
    pub fn answers_for(&self, question: &str) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for ((_, q), answer) in &self.entries {
            if q == question {
                *counts.entry(answer.clone()).or_default() += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
