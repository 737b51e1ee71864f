//! Survey report rendering.
//!
//! Produces the chat message sent to the creator and the JSON document
//! written to the report archive.

use crate::analysis::leading_options;
use crate::models::{QuestionTally, SurveyReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Render the report as a plain-text chat message.
pub fn generate_text_report(report: &SurveyReport) -> String {
    let mut output = String::new();

    output.push_str("Survey Results:\n");
    output.push_str(&format!("Sent to {} members.\n\n", report.recipients));

    let leaders = leading_options(&report.questions);
    for (tally, leader) in report.questions.iter().zip(leaders) {
        output.push_str(&generate_question_block(tally));
        if let Some(leader) = leader {
            output.push_str(&format!("Most chosen: {}\n", leader.option));
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Render one question with a line per option.
fn generate_question_block(tally: &QuestionTally) -> String {
    let mut block = String::new();

    block.push_str(&format!("Question: {}\n", tally.question));
    for option in &tally.options {
        block.push_str(&format!(
            "{}: {:.2}% ({} responses)\n",
            option.option, option.percentage, option.count
        ));
    }

    block
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SurveyReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the report as JSON into `dir`, creating the directory if needed.
pub fn archive_report(report: &SurveyReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

    let file_name = format!(
        "survey-{}.json",
        report.generated_at.format("%Y%m%dT%H%M%S%3fZ")
    );
    let path = dir.join(file_name);

    let content = generate_json_report(report)?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!("Archived survey report to {}", path.display());
    Ok(path)
}
