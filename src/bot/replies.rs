//! User-facing reply texts.

use crate::survey::{SlotStatus, SurveyLimits};

pub fn welcome(name: &str) -> String {
    format!("Welcome {}! You are now part of the community!", name)
}

pub const ALREADY_REGISTERED: &str = "You are already registered in the community.";

pub fn member_joined(name: &str, count: usize) -> String {
    format!(
        "{} joined the community! We now have {} members.",
        name, count
    )
}

pub fn ask_question_count(max: usize) -> String {
    format!(
        "How many questions will the survey have? (Choose between 1 and {})",
        max
    )
}

pub fn ask_question_text(number: usize) -> String {
    format!("Enter text for question {}:", number)
}

pub fn ask_question_options(number: usize, limits: &SurveyLimits) -> String {
    format!(
        "Enter the options for question {} ({}-{} options, separated by commas):",
        number, limits.min_options, limits.max_options
    )
}

pub const CREATION_COMPLETE: &str = "Survey creation is complete. Sending the survey...";

pub fn question(index: usize, total: usize, text: &str) -> String {
    format!("({}/{}) {}", index + 1, total, text)
}

pub const ANSWER_THANKS: &str = "Thank you for your answer!";

pub const SURVEY_COMPLETED: &str = "You have completed the survey. Thank you for taking part!";

pub const DRAFT_DISCARDED: &str = "Your survey draft was discarded.";

pub const SURVEY_CANCELLED: &str = "The survey was cancelled. Its answers were discarded.";

pub const SURVEY_CANCELLED_FOR_MEMBERS: &str =
    "The current survey was cancelled by its creator. No further answers are needed.";

pub fn unknown_command(command: &str, limits: &SurveyLimits) -> String {
    format!("Unknown command {}.\n\n{}", command, help(limits))
}

pub fn help(limits: &SurveyLimits) -> String {
    format!(
        "Commands:\n\
         /start - join the community\n\
         /create_survey - create a survey (needs at least {} members)\n\
         /show_results - show the results of your survey and close it\n\
         /cancel_survey - discard your survey\n\
         /status - show members and survey state\n\
         /help - show this message\n\n\
         A survey has 1 to {} questions with {} to {} options each. \
         Answer with the buttons below each question; only your first answer counts.",
        limits.min_members, limits.max_questions, limits.min_options, limits.max_options
    )
}

pub fn status(members: usize, slot: SlotStatus) -> String {
    let survey = match slot {
        SlotStatus::Idle => "No survey is running.".to_string(),
        SlotStatus::Drafting { .. } => "A survey is being drafted.".to_string(),
        SlotStatus::Distributing {
            completed,
            recipients,
            ..
        } => format!(
            "A survey is running: {} of {} members finished.",
            completed, recipients
        ),
    };
    format!("Community members: {}\n{}", members, survey)
}
