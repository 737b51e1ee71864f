//! Event routing.
//!
//! [`SurveyBot`] owns the member registry and the survey slot. Each
//! inbound event is handled to completion and yields the messages to send;
//! delivery happens afterwards and never feeds back into the state.

use super::command::Command;
use super::replies;
use super::transport::{EventKind, InboundEvent, Outbound};
use crate::error::SurveyError;
use crate::models::{ChatId, MemberId};
use crate::registry::{MemberRegistry, Registration};
use crate::report::{archive_report, generate_text_report};
use crate::survey::{CancelOutcome, DraftStep, NextStep, SurveyLimits, SurveySlot};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The survey bot state machine.
pub struct SurveyBot {
    registry: MemberRegistry,
    slot: SurveySlot,
    limits: SurveyLimits,
    report_dir: Option<PathBuf>,
}

impl SurveyBot {
    pub fn new(registry: MemberRegistry, limits: SurveyLimits) -> Self {
        Self {
            registry,
            slot: SurveySlot::new(),
            limits,
            report_dir: None,
        }
    }

    /// Archive every computed report as JSON into `dir`.
    pub fn with_report_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.report_dir = dir;
        self
    }

    pub fn registry(&self) -> &MemberRegistry {
        &self.registry
    }

    pub fn slot(&self) -> &SurveySlot {
        &self.slot
    }

    /// Handle one inbound event and return the replies to deliver.
    pub fn handle(&mut self, event: &InboundEvent) -> Vec<Outbound> {
        match &event.kind {
            EventKind::Choice(option) => self.handle_answer(event, option),
            EventKind::Text(text) => {
                if let Some(command) = Command::parse(text) {
                    return self.handle_command(event, command);
                }
                if self.slot.is_drafting(event.sender) {
                    return self.handle_draft_input(event, text);
                }
                if self.slot.is_progressing(event.sender) {
                    return self.handle_answer(event, text);
                }
                if Command::is_greeting(text) {
                    return self.handle_start(event);
                }
                debug!("Ignoring chat message from {}", event.sender);
                Vec::new()
            }
        }
    }

    fn handle_command(&mut self, event: &InboundEvent, command: Command) -> Vec<Outbound> {
        debug!("Command {:?} from {}", command, event.sender);
        match command {
            Command::Start => self.handle_start(event),
            Command::CreateSurvey => self.handle_create_survey(event),
            Command::ShowResults => self.handle_show_results(event),
            Command::CancelSurvey => self.handle_cancel(event),
            Command::Help => vec![Outbound::text(event.chat, replies::help(&self.limits))],
            Command::Status => vec![Outbound::text(
                event.chat,
                replies::status(self.registry.count(), self.slot.status()),
            )],
            Command::Unknown(name) => vec![Outbound::text(
                event.chat,
                replies::unknown_command(&name, &self.limits),
            )],
        }
    }

    fn handle_start(&mut self, event: &InboundEvent) -> Vec<Outbound> {
        match self.registry.register(event.sender, &event.sender_name) {
            Registration::Existing => {
                vec![Outbound::text(event.chat, replies::ALREADY_REGISTERED)]
            }
            Registration::New => {
                let mut out = vec![Outbound::text(
                    event.chat,
                    replies::welcome(&event.sender_name),
                )];
                let notice = replies::member_joined(&event.sender_name, self.registry.count());
                out.extend(
                    self.registry
                        .ids()
                        .into_iter()
                        .map(|id| Outbound::text(id, notice.clone())),
                );
                out
            }
        }
    }

    fn handle_create_survey(&mut self, event: &InboundEvent) -> Vec<Outbound> {
        match self
            .slot
            .start(event.sender, self.registry.count(), &self.limits)
        {
            Ok(()) => vec![Outbound::text(
                event.chat,
                replies::ask_question_count(self.limits.max_questions),
            )],
            Err(e) => self.reject(event, e),
        }
    }

    fn handle_draft_input(&mut self, event: &InboundEvent, text: &str) -> Vec<Outbound> {
        let recipients = self.registry.ids();
        let step = match self
            .slot
            .submit_draft(event.sender, text, &self.limits, &recipients)
        {
            Ok(step) => step,
            Err(e) => return self.reject(event, e),
        };

        match step {
            DraftStep::AskQuestionText { number } => {
                vec![Outbound::text(event.chat, replies::ask_question_text(number))]
            }
            DraftStep::AskQuestionOptions { number } => vec![Outbound::text(
                event.chat,
                replies::ask_question_options(number, &self.limits),
            )],
            DraftStep::Finalized(_) => {
                let mut out = vec![Outbound::text(event.chat, replies::CREATION_COMPLETE)];
                out.extend(self.first_questions());
                out
            }
        }
    }

    /// The first question for every member with an open cursor.
    fn first_questions(&self) -> Vec<Outbound> {
        let Some(dist) = self.slot.distribution() else {
            return Vec::new();
        };
        dist.pending_members()
            .into_iter()
            .filter_map(|member| self.question_message(member, 0))
            .collect()
    }

    fn question_message(&self, member: MemberId, index: usize) -> Option<Outbound> {
        let dist = self.slot.distribution()?;
        let question = dist.question(index)?;
        Some(Outbound::with_choices(
            member,
            replies::question(index, dist.definition().len(), &question.text),
            &question.options,
        ))
    }

    fn handle_answer(&mut self, event: &InboundEvent, answer: &str) -> Vec<Outbound> {
        let member = event.sender;
        let answered = match self.slot.submit_answer(member, answer) {
            Ok(answered) => answered,
            Err(SurveyError::InvalidOption { options }) => {
                debug!("Member {} sent an unknown option", member);
                let mut text = SurveyError::InvalidOption {
                    options: options.clone(),
                }
                .to_string();
                if let Some(question) = self.slot.current_question(member) {
                    text = format!("{}\n\n{}", text, question.text);
                }
                return vec![Outbound::with_choices(event.chat, text, &options)];
            }
            Err(e) => return self.reject(event, e),
        };

        let mut out = Vec::new();
        if answered.counted {
            out.push(Outbound::text(event.chat, replies::ANSWER_THANKS));
        } else {
            out.push(Outbound::text(
                event.chat,
                SurveyError::DuplicateAnswer.to_string(),
            ));
        }

        match answered.next {
            NextStep::Question(index) => out.extend(self.question_message(member, index)),
            NextStep::Completed => {
                info!("Member {} finished the survey", member);
                out.push(Outbound::text(member, replies::SURVEY_COMPLETED));
            }
        }
        out
    }

    fn handle_show_results(&mut self, event: &InboundEvent) -> Vec<Outbound> {
        let report = match self.slot.compute_and_reset(event.sender) {
            Ok(report) => report,
            Err(e) => return self.reject(event, e),
        };

        if let Some(ref dir) = self.report_dir {
            if let Err(e) = archive_report(&report, dir) {
                warn!("Failed to archive survey report: {:#}", e);
            }
        }

        vec![Outbound::text(event.chat, generate_text_report(&report))]
    }

    fn handle_cancel(&mut self, event: &InboundEvent) -> Vec<Outbound> {
        match self.slot.cancel(event.sender) {
            Ok(CancelOutcome::Draft) => vec![Outbound::text(event.chat, replies::DRAFT_DISCARDED)],
            Ok(CancelOutcome::Distribution { pending }) => {
                let mut out = vec![Outbound::text(event.chat, replies::SURVEY_CANCELLED)];
                out.extend(
                    pending
                        .into_iter()
                        .filter(|id| ChatId::from(*id) != event.chat)
                        .map(|id| Outbound::text(id, replies::SURVEY_CANCELLED_FOR_MEMBERS)),
                );
                out
            }
            Err(e) => self.reject(event, e),
        }
    }

    /// Reply with the corrective message of a recoverable error.
    fn reject(&self, event: &InboundEvent, error: SurveyError) -> Vec<Outbound> {
        debug!(
            "Rejected input from {} ({}): {}",
            event.sender,
            error.kind(),
            error
        );
        vec![Outbound::text(event.chat, error.to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::SlotStatus;
    use tempfile::TempDir;

    const A: MemberId = MemberId(1);
    const B: MemberId = MemberId(2);
    const C: MemberId = MemberId(3);

    fn say(bot: &mut SurveyBot, who: MemberId, text: &str) -> Vec<Outbound> {
        bot.handle(&InboundEvent::text(who, &format!("user{}", who), text))
    }

    fn press(bot: &mut SurveyBot, who: MemberId, option: &str) -> Vec<Outbound> {
        bot.handle(&InboundEvent::choice(who, &format!("user{}", who), option))
    }

    fn community() -> SurveyBot {
        let mut bot = SurveyBot::new(MemberRegistry::in_memory(), SurveyLimits::default());
        for id in [A, B, C] {
            say(&mut bot, id, "/start");
        }
        bot
    }

    fn create_color_survey(bot: &mut SurveyBot) -> Vec<Outbound> {
        say(bot, A, "/create_survey");
        say(bot, A, "1");
        say(bot, A, "Color?");
        say(bot, A, "Red,Blue")
    }

    #[test]
    fn test_registration_broadcasts_join() {
        let mut bot = SurveyBot::new(MemberRegistry::in_memory(), SurveyLimits::default());
        say(&mut bot, A, "/start");
        let out = say(&mut bot, B, "/start");

        assert_eq!(out[0], Outbound::text(B, "Welcome user2! You are now part of the community!"));
        let notices: Vec<_> = out[1..].iter().map(|m| m.chat).collect();
        assert_eq!(notices, vec![ChatId(1), ChatId(2)]);
        assert!(out[1].text.contains("We now have 2 members"));
    }

    #[test]
    fn test_reregistration_is_a_noop() {
        let mut bot = community();
        let out = say(&mut bot, A, "/start");
        assert_eq!(out, vec![Outbound::text(A, replies::ALREADY_REGISTERED)]);
        assert_eq!(bot.registry().count(), 3);
    }

    #[test]
    fn test_greeting_registers() {
        let mut bot = SurveyBot::new(MemberRegistry::in_memory(), SurveyLimits::default());
        say(&mut bot, A, "Hello");
        assert!(bot.registry().contains(A));
        assert!(say(&mut bot, B, "just chatting").is_empty());
    }

    #[test]
    fn test_create_requires_three_members() {
        let mut bot = SurveyBot::new(MemberRegistry::in_memory(), SurveyLimits::default());
        say(&mut bot, A, "/start");
        say(&mut bot, B, "/start");

        let out = say(&mut bot, A, "/create_survey");
        assert!(out[0].text.contains("at least 3 members"));
        assert_eq!(bot.slot().status(), SlotStatus::Idle);
    }

    #[test]
    fn test_draft_dialogue_prompts() {
        let mut bot = community();
        assert!(say(&mut bot, A, "/create_survey")[0]
            .text
            .starts_with("How many questions"));
        assert_eq!(
            say(&mut bot, A, "9")[0].text,
            "Please enter a number between 1 and 3."
        );
        assert_eq!(say(&mut bot, A, "2")[0].text, "Enter text for question 1:");
        assert!(say(&mut bot, A, "Color?")[0]
            .text
            .starts_with("Enter the options for question 1"));
        assert!(say(&mut bot, A, "Red")[0].text.contains("between 2 and 4"));
        assert_eq!(say(&mut bot, A, "Red,Blue")[0].text, "Enter text for question 2:");
    }

    #[test]
    fn test_other_members_chat_during_draft_is_ignored() {
        let mut bot = community();
        say(&mut bot, A, "/create_survey");
        assert!(say(&mut bot, B, "3").is_empty());
        assert_eq!(say(&mut bot, A, "1")[0].text, "Enter text for question 1:");
    }

    #[test]
    fn test_second_create_rejected() {
        let mut bot = community();
        say(&mut bot, A, "/create_survey");
        let out = say(&mut bot, B, "/create_survey");
        assert_eq!(out[0].text, SurveyError::SurveyAlreadyActive.to_string());
        assert_eq!(bot.slot().creator(), Some(A));
    }

    #[test]
    fn test_finalized_survey_reaches_every_member() {
        let mut bot = community();
        let out = create_color_survey(&mut bot);

        assert_eq!(out[0].text, replies::CREATION_COMPLETE);
        let questions: Vec<_> = out[1..].iter().collect();
        assert_eq!(questions.len(), 3);
        for (message, id) in questions.iter().zip([A, B, C]) {
            assert_eq!(message.chat, ChatId::from(id));
            assert_eq!(message.text, "(1/1) Color?");
            assert_eq!(message.choices, vec!["Red", "Blue"]);
        }
    }

    #[test]
    fn test_invalid_answer_resends_options() {
        let mut bot = community();
        create_color_survey(&mut bot);

        let out = press(&mut bot, B, "Green");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].choices, vec!["Red", "Blue"]);
        assert!(out[0].text.contains("Color?"));
        assert_eq!(bot.slot().distribution().unwrap().cursor(B), Some(0));
    }

    #[test]
    fn test_invalid_answer_reply_stays_in_event_chat() {
        let mut bot = community();
        create_color_survey(&mut bot);

        let group = ChatId(-100);
        let event = InboundEvent {
            chat: group,
            ..InboundEvent::choice(B, "user2", "Green")
        };
        let out = bot.handle(&event);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chat, group);
        assert_eq!(out[0].choices, vec!["Red", "Blue"]);
    }

    #[test]
    fn test_duplicate_answer_is_reported_and_advances() {
        let mut bot = community();
        say(&mut bot, A, "/create_survey");
        for input in ["2", "Color?", "Red,Blue", "Color?", "Red,Blue"] {
            say(&mut bot, A, input);
        }

        let out = press(&mut bot, B, "Red");
        assert_eq!(out[0].text, replies::ANSWER_THANKS);
        assert_eq!(out[1].text, "(2/2) Color?");

        let out = press(&mut bot, B, "Blue");
        assert_eq!(out[0].text, SurveyError::DuplicateAnswer.to_string());
        assert_eq!(out[1].text, replies::SURVEY_COMPLETED);
        assert!(!bot.slot().is_progressing(B));

        let dist = bot.slot().distribution().unwrap();
        assert_eq!(dist.ledger().answers_for("Color?").get("Red"), Some(&1));
        assert_eq!(dist.ledger().answers_for("Color?").get("Blue"), None);
    }

    #[test]
    fn test_text_answer_is_accepted() {
        let mut bot = community();
        create_color_survey(&mut bot);

        let out = say(&mut bot, C, " Blue ");
        assert_eq!(out[0].text, replies::ANSWER_THANKS);
        assert_eq!(out[1].text, replies::SURVEY_COMPLETED);
        assert!(!bot.slot().is_progressing(C));
    }

    #[test]
    fn test_press_after_completion() {
        let mut bot = community();
        create_color_survey(&mut bot);
        press(&mut bot, B, "Red");

        let out = press(&mut bot, B, "Blue");
        assert_eq!(out[0].text, SurveyError::NoPendingQuestion.to_string());
    }

    #[test]
    fn test_multi_question_progression() {
        let mut bot = community();
        say(&mut bot, A, "/create_survey");
        for input in ["2", "Color?", "Red,Blue", "Size?", "S,M,L"] {
            say(&mut bot, A, input);
        }

        let out = press(&mut bot, B, "Red");
        assert_eq!(out[1].text, "(2/2) Size?");
        assert_eq!(out[1].choices, vec!["S", "M", "L"]);

        let out = press(&mut bot, B, "M");
        assert_eq!(out[1].text, replies::SURVEY_COMPLETED);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut bot = community();
        create_color_survey(&mut bot);

        press(&mut bot, A, "Red");
        press(&mut bot, B, "Red");
        press(&mut bot, C, "Blue");

        let out = say(&mut bot, B, "/show_results");
        assert_eq!(out[0].text, SurveyError::NotCreator.to_string());

        let out = say(&mut bot, A, "/show_results");
        let text = &out[0].text;
        assert!(text.contains("Question: Color?"));
        assert!(text.contains("Red: 66.67% (2 responses)"));
        assert!(text.contains("Blue: 33.33% (1 responses)"));

        assert_eq!(bot.slot().status(), SlotStatus::Idle);
        assert!(say(&mut bot, B, "/create_survey")[0]
            .text
            .starts_with("How many questions"));
    }

    #[test]
    fn test_results_during_draft_rejected() {
        let mut bot = community();
        say(&mut bot, A, "/create_survey");
        let out = say(&mut bot, A, "/show_results");
        assert_eq!(out[0].text, SurveyError::NoActiveSurvey.to_string());
        assert!(bot.slot().is_drafting(A));
    }

    #[test]
    fn test_cancel_notifies_pending_members() {
        let mut bot = community();
        create_color_survey(&mut bot);
        press(&mut bot, B, "Red");

        let out = say(&mut bot, A, "/cancel_survey");
        assert_eq!(out[0], Outbound::text(A, replies::SURVEY_CANCELLED));
        let notified: Vec<_> = out[1..].iter().map(|m| m.chat).collect();
        assert_eq!(notified, vec![ChatId(3)]);
        assert_eq!(bot.slot().status(), SlotStatus::Idle);
    }

    #[test]
    fn test_status_and_help() {
        let mut bot = community();
        assert!(say(&mut bot, A, "/status")[0]
            .text
            .contains("Community members: 3"));
        assert!(say(&mut bot, A, "/instructions")[0].text.contains("/create_survey"));
        assert!(say(&mut bot, A, "/nope")[0].text.starts_with("Unknown command /nope"));
    }

    #[test]
    fn test_results_are_archived() {
        let dir = TempDir::new().unwrap();
        let mut bot = community().with_report_dir(Some(dir.path().to_path_buf()));
        create_color_survey(&mut bot);
        press(&mut bot, A, "Red");
        say(&mut bot, A, "/show_results");

        let archived: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(archived.len(), 1);
    }
}
