use super::{label_word, Advance, Game};
use crate::model::Classification;

/// Four digit passcode entry, one digit gesture per tick. Terminal once the
/// fourth digit lands: the concatenated entry is compared against the
/// expected code as strings and further input is ignored.
pub struct UnlockGame {
    expected: String,
    digits: Vec<String>,
    granted: Option<bool>,
}

impl UnlockGame {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            digits: Vec::with_capacity(4),
            granted: None,
        }
    }

    pub fn digits_entered(&self) -> usize {
        self.digits.len()
    }

    /// `Some(true)` once access was granted, `Some(false)` once denied.
    pub fn granted(&self) -> Option<bool> {
        self.granted
    }
}

impl Game for UnlockGame {
    fn advance(&mut self, result: &Classification) -> Advance {
        if self.granted.is_some() {
            return Advance::Ignored;
        }
        let word = label_word(&result.label);
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_digit()) {
            return Advance::Ignored;
        }
        self.digits.push(word.to_string());
        if self.digits.len() == 4 {
            self.granted = Some(self.digits.concat() == self.expected);
            return Advance::Finished;
        }
        Advance::Updated
    }

    fn status(&self) -> String {
        match self.granted {
            Some(true) => "Access Granted!".to_string(),
            Some(false) => "Incorrect PIN".to_string(),
            None => format!("Entered {} of 4 digits", self.digits.len()),
        }
    }

    fn finished(&self) -> bool {
        self.granted.is_some()
    }
}
