//! Bot command parsing.

/// A recognized slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    CreateSurvey,
    ShowResults,
    Help,
    CancelSurvey,
    Status,
    Unknown(String),
}

impl Command {
    /// Parse a slash command. Returns `None` for ordinary text.
    ///
    /// Arguments after the command and a `@botname` suffix are ignored.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_ascii_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "create_survey" => Command::CreateSurvey,
            "show_results" => Command::ShowResults,
            "help" | "instructions" => Command::Help,
            "cancel_survey" => Command::CancelSurvey,
            "status" => Command::Status,
            _ => Command::Unknown(word.to_string()),
        };
        Some(command)
    }

    /// Greetings that register the sender like `/start`.
    pub fn is_greeting(text: &str) -> bool {
        let text = text.trim().trim_end_matches(['!', '.']);
        ["hi", "hello", "hey"]
            .iter()
            .any(|greeting| text.eq_ignore_ascii_case(greeting))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /create_survey  "), Some(Command::CreateSurvey));
        assert_eq!(Command::parse("/show_results now"), Some(Command::ShowResults));
        assert_eq!(Command::parse("/instructions"), Some(Command::Help));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/cancel_survey"), Some(Command::CancelSurvey));
        assert_eq!(Command::parse("/status"), Some(Command::Status));
    }

    #[test]
    fn test_parse_strips_bot_suffix() {
        assert_eq!(Command::parse("/start@SurveyBot"), Some(Command::Start));
        assert_eq!(Command::parse("/START"), Some(Command::Start));
    }

    #[test]
    fn test_parse_plain_text_and_unknown() {
        assert_eq!(Command::parse("Red"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(
            Command::parse("/dance"),
            Some(Command::Unknown("/dance".to_string()))
        );
    }

    #[test]
    fn test_greetings() {
        assert!(Command::is_greeting("hi"));
        assert!(Command::is_greeting("Hello!"));
        assert!(Command::is_greeting(" HEY "));
        assert!(!Command::is_greeting("hi there"));
        assert!(!Command::is_greeting("/start"));
    }
}
