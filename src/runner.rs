use crate::capture::{spawn_capture, CameraSource};
use crate::games::{run_game, Game};
use crate::model::Classifier;
use crate::slot::ResultSlot;
use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Everything a game session needs before the pipeline starts.
pub struct Session {
    pub camera: u32,
    pub model_dir: PathBuf,
    pub tick: Duration,
    pub input_size: Option<u32>,
}

/// Wires the full pipeline for one game: loads the classifier, opens the
/// camera, spawns the capture thread, then ticks the game on the main thread
/// until it finishes or Ctrl-C sets the shared cancel flag. Startup errors
/// (model, labels, camera) propagate to the caller; the capture thread is
/// joined and the camera released before returning.
pub fn run_session(session: &Session, game: &mut dyn Game) -> Result<(), Box<dyn Error>> {
    let classifier = Classifier::from_model_dir(&session.model_dir)?;
    debug!(labels = ?classifier.labels(), "classifier ready");

    let slot = Arc::new(ResultSlot::new());
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            info!("shutdown requested");
            cancel.store(true, Ordering::Relaxed);
        })?;
    }

    let camera = session.camera;
    let input_size = session.input_size;
    let capture = spawn_capture(
        move || CameraSource::open_with_resize(camera, input_size),
        classifier,
        slot.clone(),
        cancel.clone(),
    )?;

    println!("{}", game.status());
    run_game(game, &slot, session.tick, &cancel);

    // The game may have finished on its own; stop the capture loop too.
    cancel.store(true, Ordering::Relaxed);
    if capture.join().is_err() {
        error!("capture thread panicked");
    }
    Ok(())
}
