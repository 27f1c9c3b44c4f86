//! Interactive questions.
//!
//! [`StdinPrompter`] asks line-based questions on the controlling terminal and
//! re-asks until an answer passes validation. [`ScriptedPrompter`] answers
//! from a fixed script and is used wherever no human is present.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::markup;
use crate::text_processing::fuzzy_filter;

/// Maximum number of autocomplete candidates listed at once.
const MAX_LISTED_CHOICES: usize = 10;

/// Per-question validation; `Err` carries the message shown to the user.
pub type Validator<'a> = &'a (dyn Fn(&str) -> Result<(), String> + Sync);

/// Accepts every answer.
pub fn any_answer(_: &str) -> Result<(), String> {
    Ok(())
}

#[derive(Debug, Error)]
pub enum PromptError {
    /// Input ended before the question was answered.
    #[error("Prompt cancelled")]
    Cancelled,

    #[error("Nothing to choose from for '{message}'")]
    NoChoices { message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub trait Prompter: Send + Sync {
    /// Free-text question.
    fn input(&self, message: &str, validate: Validator<'_>) -> Result<String, PromptError>;

    /// Single choice among `choices`; returns the chosen index.
    fn select(&self, message: &str, choices: &[&str]) -> Result<usize, PromptError>;

    /// Choose one of `candidates`, narrowing the list with fuzzy search.
    fn autocomplete(&self, message: &str, candidates: &[String]) -> Result<String, PromptError>;

    /// Yes/no question.
    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError>;
}

fn parse_yes_no(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve a select answer given as a 1-based number or as the choice text.
fn parse_choice(answer: &str, choices: &[&str]) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return (!choices.is_empty()).then_some(0);
    }
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&number).then(|| number - 1);
    }
    choices.iter().position(|choice| choice.eq_ignore_ascii_case(answer))
}

/// Prompter reading answers from standard input.
///
/// Questions are written to standard error so command output piped from
/// standard output stays clean.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self, question: &str) -> Result<String, PromptError> {
        let styled = io::stderr().is_terminal();
        let mut stderr = io::stderr().lock();
        write!(stderr, "{} ", markup::render(&format!("~~?~~ ***{question}***"), styled))?;
        stderr.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&self, message: &str) -> Result<(), PromptError> {
        let styled = io::stderr().is_terminal();
        writeln!(io::stderr().lock(), "{}", markup::render(message, styled))?;
        Ok(())
    }
}

impl Prompter for StdinPrompter {
    fn input(&self, message: &str, validate: Validator<'_>) -> Result<String, PromptError> {
        loop {
            let answer = self.ask(message)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => self.say(&format!("!!>>!! {reason}"))?,
            }
        }
    }

    fn select(&self, message: &str, choices: &[&str]) -> Result<usize, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices {
                message: message.to_string(),
            });
        }
        for (index, choice) in choices.iter().enumerate() {
            self.say(&format!("  {}) {choice}", index + 1))?;
        }
        loop {
            let answer = self.ask(&format!("{message} [1]"))?;
            match parse_choice(&answer, choices) {
                Some(index) => return Ok(index),
                None => self.say(&format!("!!>>!! Choose 1-{}", choices.len()))?,
            }
        }
    }

    fn autocomplete(&self, message: &str, candidates: &[String]) -> Result<String, PromptError> {
        if candidates.is_empty() {
            return Err(PromptError::NoChoices {
                message: message.to_string(),
            });
        }
        let mut listed: Vec<String> = Vec::new();
        loop {
            let answer = self.ask(&format!("{message} (type to search)"))?;
            let answer = answer.trim();

            if let Ok(number) = answer.parse::<usize>()
                && let Some(choice) = number.checked_sub(1).and_then(|index| listed.get(index))
            {
                return Ok(choice.clone());
            }
            if let Some(exact) = candidates.iter().find(|candidate| candidate.as_str() == answer) {
                return Ok(exact.clone());
            }

            let matches = fuzzy_filter(answer, candidates);
            match matches.as_slice() {
                [] => self.say("!!>>!! No matches, try again")?,
                [only] => return Ok(only.clone()),
                _ => {
                    listed = matches.into_iter().take(MAX_LISTED_CHOICES).collect();
                    for (index, choice) in listed.iter().enumerate() {
                        self.say(&format!("  {}) {choice}", index + 1))?;
                    }
                    self.say("###Enter a number or refine the search###")?;
                }
            }
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        loop {
            let answer = self.ask(&format!("{message} {hint}"))?;
            match parse_yes_no(&answer, default) {
                Some(confirmed) => return Ok(confirmed),
                None => self.say("!!>>!! Answer y or n")?,
            }
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    asked: Vec<String>,
    rejected: Vec<String>,
}

/// Prompter answering from a queue of scripted answers.
///
/// Answers failing validation are recorded as rejections and the next answer
/// is tried, the same way a person would be asked again. Running out of
/// answers cancels the prompt. Clones share the same script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Script::default()
        };
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Questions asked so far, in order, including re-asks.
    pub fn asked(&self) -> Vec<String> {
        self.script.lock().map(|script| script.asked.clone()).unwrap_or_default()
    }

    /// Validation messages for rejected answers.
    pub fn rejected(&self) -> Vec<String> {
        self.script.lock().map(|script| script.rejected.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|script| script.answers.len()).unwrap_or_default()
    }

    fn next_answer(&self, message: &str) -> Result<String, PromptError> {
        let mut script = self.script.lock().map_err(|_| PromptError::Cancelled)?;
        script.asked.push(message.to_string());
        script.answers.pop_front().ok_or(PromptError::Cancelled)
    }

    fn reject(&self, reason: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.rejected.push(reason.into());
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str, validate: Validator<'_>) -> Result<String, PromptError> {
        loop {
            let answer = self.next_answer(message)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(reason) => self.reject(reason),
            }
        }
    }

    fn select(&self, message: &str, choices: &[&str]) -> Result<usize, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::NoChoices {
                message: message.to_string(),
            });
        }
        loop {
            let answer = self.next_answer(message)?;
            match parse_choice(&answer, choices) {
                Some(index) => return Ok(index),
                None => self.reject(format!("Unknown choice '{answer}'")),
            }
        }
    }

    fn autocomplete(&self, message: &str, candidates: &[String]) -> Result<String, PromptError> {
        if candidates.is_empty() {
            return Err(PromptError::NoChoices {
                message: message.to_string(),
            });
        }
        loop {
            let answer = self.next_answer(message)?;
            if let Some(exact) = candidates.iter().find(|candidate| **candidate == answer) {
                return Ok(exact.clone());
            }
            match fuzzy_filter(&answer, candidates).into_iter().next() {
                Some(best) => return Ok(best),
                None => self.reject(format!("No matches for '{answer}'")),
            }
        }
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool, PromptError> {
        loop {
            let answer = self.next_answer(message)?;
            match parse_yes_no(&answer, default) {
                Some(confirmed) => return Ok(confirmed),
                None => self.reject(format!("Unknown answer '{answer}'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(input: &str) -> Result<(), String> {
        if input.is_empty() { Err("Required Field".into()) } else { Ok(()) }
    }

    #[test]
    fn scripted_input_reasks_after_rejection() {
        let prompter = ScriptedPrompter::new(["", "smoke"]);
        let answer = prompter.input("Test Name:", &required).expect("answer");
        assert_eq!(answer, "smoke");
        assert_eq!(prompter.rejected(), vec!["Required Field"]);
        assert_eq!(prompter.asked(), vec!["Test Name:", "Test Name:"]);
    }

    #[test]
    fn select_accepts_numbers_and_text() {
        let prompter = ScriptedPrompter::new(["2", "no", ""]);
        assert_eq!(prompter.select("Automatically promote?", &["No", "Yes"]).expect("select"), 1);
        assert_eq!(prompter.select("Automatically promote?", &["No", "Yes"]).expect("select"), 0);
        assert_eq!(prompter.select("Automatically promote?", &["No", "Yes"]).expect("select"), 0);
    }

    #[test]
    fn autocomplete_picks_best_fuzzy_match() {
        let apps = vec!["billing-prod".to_string(), "portal-qa".to_string()];
        let prompter = ScriptedPrompter::new(["zzz", "portal"]);
        assert_eq!(prompter.autocomplete("Select an App", &apps).expect("app"), "portal-qa");
        assert_eq!(prompter.rejected().len(), 1);
    }

    #[test]
    fn confirm_uses_default_for_empty_answer() {
        let prompter = ScriptedPrompter::new(["", "y"]);
        assert!(!prompter.confirm("Continue?", false).expect("confirm"));
        assert!(prompter.confirm("Continue?", false).expect("confirm"));
    }

    #[test]
    fn exhausted_script_cancels() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        assert!(matches!(prompter.confirm("Continue?", false), Err(PromptError::Cancelled)));
    }

    #[test]
    fn parse_choice_rejects_out_of_range() {
        assert_eq!(parse_choice("3", &["No", "Yes"]), None);
        assert_eq!(parse_choice("0", &["No", "Yes"]), None);
        assert_eq!(parse_choice("YES", &["No", "Yes"]), Some(1));
    }
}
