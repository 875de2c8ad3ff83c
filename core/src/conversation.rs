//! The conversation state machine: a strictly forward-only, single-pass
//! intake flow.
//!
//! `advance` is a pure function of `(state, message)` — it never blocks and
//! never touches anything outside the handed-in state and catalog. Serializing
//! calls per session is the owning transport's job.

use crate::catalog::DomainCatalog;

/// Trigger word that starts the flow. Matched after trim, ASCII
/// case-insensitively — no fuzzy matching.
pub const START_KEYWORD: &str = "hello";

/// First message of every session, sent before any user input is consumed.
pub const WELCOME_MESSAGE: &str = "Hello! I'm your stress detection assistant. \
    Let's chat about your current experiences and see how you're doing. 😊\n\n\
    Type 'hello' to begin the process.";

/// Re-ask sent while the start keyword has not arrived yet.
pub const START_REMINDER: &str = "Please type 'hello' to begin.";

/// Generic in-band recovery message. The flow never surfaces an HTTP error
/// for conversation-level problems.
pub const RETRY_MESSAGE: &str = "An error occurred. Please try again.";

/// Where a conversation currently is. The selected domain and question cursor
/// only exist inside `AnsweringQuestions`, so "domain set but not yet
/// selecting" is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    AwaitingStart,
    SelectingDomain,
    AnsweringQuestions {
        domain_id: String,
        /// 0-based cursor into the domain's question list
        question_index: usize,
    },
}

/// One session's conversation state. Created on first contact, mutated in
/// place per turn, dropped by the owner once a terminal turn is produced.
#[derive(Debug)]
pub struct Conversation {
    phase: Phase,
    answers: Vec<String>,
}

/// Everything collected by a finished conversation, handed to the plan
/// synthesizer exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedIntake {
    pub domain_id: String,
    /// One answer per question, in question order
    pub answers: Vec<String>,
}

/// Outcome of a single `advance` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// Next system message; the conversation continues.
    Prompt(String),
    /// Terminal turn; the owner must discard this conversation.
    Completed(CompletedIntake),
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingStart,
            answers: Vec::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Consume one user message and produce the next system message or the
    /// terminal intake.
    pub fn advance(&mut self, message: &str, catalog: &DomainCatalog) -> Turn {
        let input = message.trim();

        match &self.phase {
            Phase::AwaitingStart => {
                if input.eq_ignore_ascii_case(START_KEYWORD) {
                    self.phase = Phase::SelectingDomain;
                    Turn::Prompt(catalog.selection_prompt().to_string())
                } else {
                    Turn::Prompt(START_REMINDER.to_string())
                }
            }
            Phase::SelectingDomain => match catalog.get(input) {
                Some(domain) => {
                    let first_question = domain.questions[0].to_string();
                    self.phase = Phase::AnsweringQuestions {
                        domain_id: domain.id.to_string(),
                        question_index: 0,
                    };
                    Turn::Prompt(first_question)
                }
                None => Turn::Prompt(format!(
                    "⚠️ Invalid choice. {}",
                    catalog.selection_prompt()
                )),
            },
            Phase::AnsweringQuestions {
                domain_id,
                question_index,
            } => {
                let domain_id = domain_id.clone();
                let index = *question_index;
                let Some(domain) = catalog.get(&domain_id) else {
                    // Unreachable when the catalog that validated the
                    // selection is the one passed here. Recover in-band.
                    *self = Conversation::new();
                    return Turn::Prompt(RETRY_MESSAGE.to_string());
                };

                // Answers are accepted verbatim, empty included.
                self.answers.push(input.to_string());

                if index + 1 < domain.questions.len() {
                    let next_question = domain.questions[index + 1].to_string();
                    self.phase = Phase::AnsweringQuestions {
                        domain_id: domain.id.to_string(),
                        question_index: index + 1,
                    };
                    Turn::Prompt(next_question)
                } else {
                    Turn::Completed(CompletedIntake {
                        domain_id: domain.id.to_string(),
                        answers: std::mem::take(&mut self.answers),
                    })
                }
            }
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DomainCatalog {
        DomainCatalog::builtin()
    }

    fn prompt(turn: Turn) -> String {
        match turn {
            Turn::Prompt(text) => text,
            Turn::Completed(intake) => panic!("expected prompt, got {intake:?}"),
        }
    }

    #[test]
    fn start_keyword_matches_after_trim_and_case_fold() {
        let catalog = catalog();
        for input in ["hello", "HELLO", " hello ", "Hello"] {
            let mut conv = Conversation::new();
            let text = prompt(conv.advance(input, &catalog));
            assert_eq!(text, catalog.selection_prompt(), "input {input:?}");
            assert_eq!(conv.phase(), &Phase::SelectingDomain);
        }
    }

    #[test]
    fn anything_else_re_asks_for_the_start_keyword() {
        let catalog = catalog();
        let mut conv = Conversation::new();
        for input in ["hi", "hello there", "", "héllo"] {
            let text = prompt(conv.advance(input, &catalog));
            assert_eq!(text, START_REMINDER, "input {input:?}");
            assert_eq!(conv.phase(), &Phase::AwaitingStart);
        }
    }

    #[test]
    fn valid_domain_choice_starts_the_questions() {
        let catalog = catalog();
        let mut conv = Conversation::new();
        conv.advance("hello", &catalog);

        let text = prompt(conv.advance("3", &catalog));
        assert_eq!(text, catalog.get("3").unwrap().questions[0]);
        assert_eq!(
            conv.phase(),
            &Phase::AnsweringQuestions {
                domain_id: "3".to_string(),
                question_index: 0,
            }
        );
    }

    #[test]
    fn invalid_domain_choice_re_prompts_in_place() {
        let catalog = catalog();
        let mut conv = Conversation::new();
        conv.advance("hello", &catalog);

        for input in ["9", "one", "", "1 2"] {
            let text = prompt(conv.advance(input, &catalog));
            assert!(text.starts_with("⚠️ Invalid choice."), "input {input:?}");
            assert!(text.contains(catalog.selection_prompt()));
            assert_eq!(conv.phase(), &Phase::SelectingDomain);
        }
    }

    #[test]
    fn exactly_n_answers_reach_the_terminal_turn() {
        let catalog = catalog();
        let domain = catalog.get("2").unwrap();
        let mut conv = Conversation::new();
        conv.advance("hello", &catalog);
        conv.advance("2", &catalog);

        // Questions 2..N are returned by the first N-1 answers.
        for i in 0..domain.questions.len() - 1 {
            let text = prompt(conv.advance(&format!("answer {i}"), &catalog));
            assert_eq!(text, domain.questions[i + 1]);
            assert_eq!(conv.answers().len(), i + 1);
        }

        let last = conv.advance("final answer", &catalog);
        let Turn::Completed(intake) = last else {
            panic!("expected terminal turn, got {last:?}");
        };
        assert_eq!(intake.domain_id, "2");
        assert_eq!(intake.answers.len(), domain.questions.len());
        assert_eq!(intake.answers[0], "answer 0");
        assert_eq!(intake.answers.last().unwrap(), "final answer");
    }

    #[test]
    fn empty_answers_are_recorded() {
        let catalog = catalog();
        let mut conv = Conversation::new();
        conv.advance("hello", &catalog);
        conv.advance("1", &catalog);

        conv.advance("", &catalog);
        assert_eq!(conv.answers(), &["".to_string()]);
    }

    #[test]
    fn answers_are_stored_trimmed() {
        let catalog = catalog();
        let mut conv = Conversation::new();
        conv.advance("hello", &catalog);
        conv.advance("1", &catalog);

        conv.advance("  too much coursework  ", &catalog);
        assert_eq!(conv.answers(), &["too much coursework".to_string()]);
    }
}
