//! Survey result aggregation.
//!
//! Counts are derived from the response ledger at query time; nothing is
//! pre-aggregated while answers come in.

use crate::models::{OptionTally, QuestionTally, SurveyDefinition};
use crate::survey::ResponseLedger;

/// Tally every question of a survey, in survey order.
pub fn tally_survey(definition: &SurveyDefinition, ledger: &ResponseLedger) -> Vec<QuestionTally> {
    definition
        .questions
        .iter()
        .map(|question| {
            let counts = ledger.answers_for(&question.text);
            let total: usize = counts.values().sum();

            let options = question
                .options
                .iter()
                .map(|option| {
                    let count = counts.get(option).copied().unwrap_or(0);
                    OptionTally {
                        option: option.clone(),
                        count,
                        percentage: percentage(count, total),
                    }
                })
                .collect();

            QuestionTally {
                question: question.text.clone(),
                total,
                options,
            }
        })
        .collect()
}

/// Share of `count` in `total` as a percentage rounded to two decimals.
///
/// Halves round away from zero. A zero total yields 0.0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// Option with the most answers per question. Ties go to the earlier option.
pub fn leading_options(tallies: &[QuestionTally]) -> Vec<Option<&OptionTally>> {
    tallies
        .iter()
        .map(|tally| {
            tally
                .options
                .iter()
                .filter(|o| o.count > 0)
                .fold(None, |best: Option<&OptionTally>, o| match best {
                    Some(b) if b.count >= o.count => Some(b),
                    _ => Some(o),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Question};

    fn color_survey() -> SurveyDefinition {
        SurveyDefinition::new(vec![Question {
            text: "Color?".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
        }])
    }

    #[test]
    fn test_three_to_one_split() {
        let mut ledger = ResponseLedger::new();
        for id in 1..=3 {
            ledger.record(MemberId(id), "Color?", "A");
        }
        ledger.record(MemberId(4), "Color?", "B");

        let tallies = tally_survey(&color_survey(), &ledger);
        assert_eq!(tallies[0].total, 4);
        assert_eq!(tallies[0].option("A").unwrap().percentage, 75.0);
        assert_eq!(tallies[0].option("B").unwrap().percentage, 25.0);
    }

    #[test]
    fn test_no_answers_reports_zero() {
        let tallies = tally_survey(&color_survey(), &ResponseLedger::new());
        assert_eq!(tallies[0].total, 0);
        for option in &tallies[0].options {
            assert_eq!(option.count, 0);
            assert_eq!(option.percentage, 0.0);
        }
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_options_follow_declared_order() {
        let mut ledger = ResponseLedger::new();
        ledger.record(MemberId(1), "Color?", "B");

        let tallies = tally_survey(&color_survey(), &ledger);
        let names: Vec<_> = tallies[0].options.iter().map(|o| o.option.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_leading_options() {
        let mut ledger = ResponseLedger::new();
        ledger.record(MemberId(1), "Color?", "B");
        ledger.record(MemberId(2), "Color?", "A");

        let tallies = tally_survey(&color_survey(), &ledger);
        let leaders = leading_options(&tallies);
        assert_eq!(leaders[0].map(|o| o.option.as_str()), Some("A"));

        let empty = tally_survey(&color_survey(), &ResponseLedger::new());
        assert!(leading_options(&empty)[0].is_none());
    }
}
