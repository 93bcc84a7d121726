mod binary_search;
mod rps;
mod unlock;

pub use binary_search::BinarySearchGame;
pub use rps::{resolve, Choice, Outcome, RpsGame, RpsPhase};
pub use unlock::UnlockGame;

use crate::model::Classification;
use crate::slot::ResultSlot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::trace;

/// What a game did with one classification.
#[derive(Debug, PartialEq, Eq)]
pub enum Advance {
    /// State changed; the status line should be re-rendered.
    Updated,
    /// Not actionable right now (unrecognized label, cooldown, already
    /// terminal). State is untouched.
    Ignored,
    /// The game reached its terminal state on this tick.
    Finished,
}

/// A tick-driven state machine fed by the classification stream. Each game
/// supplies its transition function and status rendering; the wiring to the
/// camera pipeline lives once, in [`run_game`].
pub trait Game {
    fn advance(&mut self, result: &Classification) -> Advance;
    fn status(&self) -> String;
    fn finished(&self) -> bool {
        false
    }
}

/// The playable word of a Teachable Machine label: the text after the first
/// space (`"0 thumbsup"` -> `"thumbsup"`), or the whole label when there is
/// no index prefix.
pub fn label_word(label: &str) -> &str {
    match label.find(' ') {
        Some(idx) => &label[idx + 1..],
        None => label,
    }
}

/// Ticks `game` on a fixed interval until it finishes or `cancel` is set.
/// A tick acts only when the slot holds a result that was not already acted
/// on (fresh sequence number); an empty slot or a stale result is a no-op.
pub fn run_game(game: &mut dyn Game, slot: &ResultSlot, interval: Duration, cancel: &AtomicBool) {
    let mut last_seq = 0u64;
    while !cancel.load(Ordering::Relaxed) && !game.finished() {
        std::thread::sleep(interval);
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let Some((result, seq)) = slot.read_latest() else {
            trace!("no classification yet");
            continue;
        };
        if seq == last_seq {
            trace!(seq, "result already seen, skipping tick");
            continue;
        }
        last_seq = seq;
        match game.advance(&result) {
            Advance::Ignored => {
                trace!(label = %result.label, "tick not actionable");
            }
            Advance::Updated | Advance::Finished => println!("{}", game.status()),
        }
    }
}

/// Live caption mode: no game, just the latest label and score each tick.
#[derive(Default)]
pub struct CaptionGame {
    last: Option<Classification>,
}

impl CaptionGame {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Game for CaptionGame {
    fn advance(&mut self, result: &Classification) -> Advance {
        self.last = Some(result.clone());
        Advance::Updated
    }

    fn status(&self) -> String {
        match &self.last {
            Some(c) => format!("{} - {}", c.label, c.confidence),
            None => "waiting for camera...".to_string(),
        }
    }
}
