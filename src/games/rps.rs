use super::{label_word, Advance, Game};
use crate::model::Classification;
use rand::Rng;

/// Ticks a finished round stays on screen before a new choice is accepted.
/// With the default 5s tick this matches the original reveal-then-reset
/// pacing, and it is the debounce that keeps one sustained gesture from
/// scoring several rounds.
const COOLDOWN_TICKS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "rock" => Some(Choice::Rock),
            "paper" => Some(Choice::Paper),
            "scissors" => Some(Choice::Scissors),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::Rock => "rock",
            Choice::Paper => "paper",
            Choice::Scissors => "scissors",
        }
    }

    fn random() -> Self {
        match rand::thread_rng().gen_range(0..3) {
            0 => Choice::Rock,
            1 => Choice::Paper,
            _ => Choice::Scissors,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Win => "You win!",
            Outcome::Lose => "You lose :(",
            Outcome::Tie => "Tie!",
        }
    }
}

/// Standard rules from the user's side: rock beats scissors, scissors beats
/// paper, paper beats rock.
pub fn resolve(user: Choice, computer: Choice) -> Outcome {
    use Choice::*;
    if user == computer {
        Outcome::Tie
    } else if matches!(
        (user, computer),
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock)
    ) {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}

/// Where the round currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpsPhase {
    AwaitingChoice,
    Resolving,
    Cooldown,
}

#[derive(Clone, Copy)]
enum Phase {
    AwaitingChoice,
    Resolving {
        computer: Choice,
        outcome: Outcome,
    },
    Cooldown {
        computer: Choice,
        outcome: Outcome,
        remaining: u32,
    },
}

/// One rock-paper-scissors round per gesture, cyclic: resolve, show the
/// result through a cooldown window, then prompt again. Never terminal.
pub struct RpsGame {
    phase: Phase,
}

impl RpsGame {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingChoice,
        }
    }

    pub fn phase(&self) -> RpsPhase {
        match self.phase {
            Phase::AwaitingChoice => RpsPhase::AwaitingChoice,
            Phase::Resolving { .. } => RpsPhase::Resolving,
            Phase::Cooldown { .. } => RpsPhase::Cooldown,
        }
    }

    /// Resolves a round against a known computer choice and enters the
    /// reveal phase. `advance` draws the computer choice at random; tests
    /// force it here.
    pub fn play(&mut self, user: Choice, computer: Choice) -> Outcome {
        let outcome = resolve(user, computer);
        self.phase = Phase::Resolving { computer, outcome };
        outcome
    }
}

impl Default for RpsGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for RpsGame {
    fn advance(&mut self, result: &Classification) -> Advance {
        match self.phase {
            Phase::AwaitingChoice => match Choice::parse(label_word(&result.label)) {
                Some(user) => {
                    self.play(user, Choice::random());
                    Advance::Updated
                }
                None => Advance::Ignored,
            },
            Phase::Resolving { computer, outcome } => {
                self.phase = Phase::Cooldown {
                    computer,
                    outcome,
                    remaining: COOLDOWN_TICKS,
                };
                Advance::Ignored
            }
            Phase::Cooldown {
                computer,
                outcome,
                remaining,
            } => {
                if remaining <= 1 {
                    self.phase = Phase::AwaitingChoice;
                    Advance::Updated
                } else {
                    self.phase = Phase::Cooldown {
                        computer,
                        outcome,
                        remaining: remaining - 1,
                    };
                    Advance::Ignored
                }
            }
        }
    }

    fn status(&self) -> String {
        match &self.phase {
            Phase::AwaitingChoice => "Make your choice!".to_string(),
            Phase::Resolving { computer, outcome } | Phase::Cooldown { computer, outcome, .. } => {
                format!("Computer choice: {}\n{}", computer.as_str(), outcome.message())
            }
        }
    }
}
