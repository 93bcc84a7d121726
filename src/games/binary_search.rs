use super::{label_word, Advance, Game};
use crate::model::Classification;

/// Number guessing over a closed range, steered by gestures: thumbsup means
/// the number is above the current guess, thumbsdown below, stop accepts the
/// guess. The interval narrows monotonically and `low <= guess <= high`
/// holds throughout.
pub struct BinarySearchGame {
    low: u32,
    high: u32,
    guess: u32,
    done: bool,
    last: Option<Classification>,
}

impl BinarySearchGame {
    /// Panics if `low > high`.
    pub fn new(low: u32, high: u32) -> Self {
        assert!(low <= high, "low must not exceed high");
        Self {
            low,
            high,
            guess: (low + high) / 2,
            done: false,
            last: None,
        }
    }

    pub fn guess(&self) -> u32 {
        self.guess
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }
}

impl Default for BinarySearchGame {
    fn default() -> Self {
        Self::new(0, 100)
    }
}

impl Game for BinarySearchGame {
    fn advance(&mut self, result: &Classification) -> Advance {
        if self.done {
            return Advance::Ignored;
        }
        match label_word(&result.label) {
            "thumbsup" => self.low = self.guess,
            "thumbsdown" => self.high = self.guess,
            "stop" => {
                self.done = true;
                self.last = Some(result.clone());
                return Advance::Finished;
            }
            _ => return Advance::Ignored,
        }
        // integer floor division, matching the search the players expect
        self.guess = (self.low + self.high) / 2;
        self.last = Some(result.clone());
        Advance::Updated
    }

    fn status(&self) -> String {
        match (&self.last, self.done) {
            (_, true) => format!("Your number is {}!", self.guess),
            (Some(c), false) => format!("Guess: {} - {} - {}", self.guess, c.label, c.confidence),
            (None, false) => format!("Think of a number between {} and {}", self.low, self.high),
        }
    }

    fn finished(&self) -> bool {
        self.done
    }
}
