//! Optional survey questions
//!
//! Every question can be skipped with an empty answer, and any answer that
//! does not fit (out-of-range number, non-numeric choice, anything but y/n)
//! counts as a skip. Nothing is ever asked twice.

use std::collections::BTreeMap;
use std::io;

use crate::prompt::Prompter;
use crate::types::{Feedback, MetricsRecord, UserContext};

pub const PROJECT_TYPES: &[&str] = &["web", "api", "data", "devops", "ml", "mobile", "other"];

pub const TEAM_SIZES: &[&str] = &["solo", "2-5", "6-10", "10+"];

pub const AI_TOOLS: &[&str] = &[
    "claude-code",
    "cursor",
    "copilot",
    "gemini",
    "chatgpt",
    "aider",
    "other",
];

pub const USAGE_DURATIONS: &[&str] = &["< 1 week", "1-4 weeks", "1-3 months", "3+ months"];

/// Feature-interest keys and their questions, in asking order
pub const FEATURES: &[(&str, &str)] = &[
    ("wants_auto_health_check", "Automated health checks?"),
    ("wants_log_aging", "Log aging/archival?"),
    (
        "wants_multi_tool_support",
        "Multi-tool support (Gemini, Cursor, etc)?",
    ),
    ("wants_cross_project_sync", "Cross-project sync?"),
    ("wants_better_token_efficiency", "Better token efficiency?"),
];

const COUNTRY_MAX_CHARS: usize = 50;
const BENEFIT_MAX_CHARS: usize = 200;
const CHALLENGE_MAX_CHARS: usize = 200;
const FREE_FEEDBACK_MAX_CHARS: usize = 500;

/// Which questions to ask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyMode {
    /// Project type, team size, primary tool
    Basic,
    /// Basic plus country, longevity, benefit/challenge, score, feature interest, free text
    Full,
}

/// Everything the user answered, ready to merge into a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackResponses {
    pub user_context: UserContext,
    pub feedback: Feedback,
    pub feature_interest: BTreeMap<String, bool>,
}

impl FeedbackResponses {
    /// Move the answers into the record's user-supplied groups
    pub fn apply_to(self, record: &mut MetricsRecord) {
        record.user_context = self.user_context;
        record.feedback = self.feedback;
        record.feature_interest = self.feature_interest;
    }
}

/// Runs the survey over a [`Prompter`].
pub struct FeedbackCollector<'a, P: Prompter> {
    prompter: &'a mut P,
}

impl<'a, P: Prompter> FeedbackCollector<'a, P> {
    pub fn new(prompter: &'a mut P) -> Self {
        Self { prompter }
    }

    pub fn collect(&mut self, mode: SurveyMode) -> io::Result<FeedbackResponses> {
        let mut responses = FeedbackResponses::default();

        self.prompter
            .section("Quick Feedback (press Enter to skip any)")?;

        responses.user_context.project_type =
            self.choose("\nWhat type of project is this?", PROJECT_TYPES)?;
        responses.user_context.team_size = self.choose("\nTeam size?", TEAM_SIZES)?;
        responses.user_context.primary_ai_tool = self.choose("\nPrimary AI tool?", AI_TOOLS)?;

        if mode == SurveyMode::Basic {
            return Ok(responses);
        }

        self.prompter.section("Detailed Feedback")?;

        responses.user_context.country =
            self.text("\nCountry (for regional stats)? ", COUNTRY_MAX_CHARS)?;
        responses.user_context.using_cxms_since =
            self.choose("\nHow long have you been using CxMS?", USAGE_DURATIONS)?;
        responses.feedback.top_benefit = self.text(
            "\nTop benefit of CxMS? (max 200 chars): ",
            BENEFIT_MAX_CHARS,
        )?;
        responses.feedback.top_challenge = self.text(
            "\nBiggest challenge with CxMS? (max 200 chars): ",
            CHALLENGE_MAX_CHARS,
        )?;
        responses.feedback.would_recommend_score =
            self.score("\nHow likely to recommend CxMS? (1-10): ")?;

        self.prompter.section("Feature Interest (y/n)")?;

        for (key, question) in FEATURES {
            if let Some(interested) = self.yes_no(&format!("{} [y/n]: ", question))? {
                responses
                    .feature_interest
                    .insert((*key).to_string(), interested);
            }
        }

        responses.feedback.free_feedback = self.text(
            "\nAny other feedback? (max 500 chars): ",
            FREE_FEEDBACK_MAX_CHARS,
        )?;

        Ok(responses)
    }

    /// Numbered multiple choice; anything but a listed number skips.
    fn choose(&mut self, question: &str, options: &[&str]) -> io::Result<Option<String>> {
        self.prompter.say(question)?;
        for (i, option) in options.iter().enumerate() {
            self.prompter.say(&format!("  {}. {}", i + 1, option))?;
        }
        let answer = self
            .prompter
            .ask("Enter number (or press Enter to skip): ")?;
        Ok(parse_choice(&answer, options))
    }

    fn text(&mut self, question: &str, max_chars: usize) -> io::Result<Option<String>> {
        let answer = self.prompter.ask(question)?;
        Ok((!answer.is_empty()).then(|| truncate_chars(&answer, max_chars)))
    }

    fn score(&mut self, question: &str) -> io::Result<Option<u8>> {
        let answer = self.prompter.ask(question)?;
        Ok(parse_score(&answer))
    }

    fn yes_no(&mut self, question: &str) -> io::Result<Option<bool>> {
        let answer = self.prompter.ask(question)?;
        Ok(parse_yes_no(&answer))
    }
}

fn parse_choice(answer: &str, options: &[&str]) -> Option<String> {
    let index: usize = answer.trim().parse().ok()?;
    options
        .get(index.checked_sub(1)?)
        .map(|option| option.to_string())
}

fn parse_score(answer: &str) -> Option<u8> {
    answer
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|score| (1..=10).contains(score))
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
