use crate::error::CaptureError;
use crate::frame::Frame;
use crate::model::Classifier;
use crate::preprocess::normalize;
use crate::slot::ResultSlot;
use image::imageops::FilterType;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
    Camera,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Anything that yields camera frames, one per call.
pub trait FrameSource {
    fn read(&mut self) -> Result<Frame, CaptureError>;
}

/// Webcam-backed frame source. Holds the device handle exclusively; the
/// stream stops and the handle is released when the source is dropped.
pub struct CameraSource {
    cam: Camera,
    resize: Option<u32>,
}

impl CameraSource {
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        Self::open_with_resize(index, None)
    }

    /// Opens camera `index`, probing common resolutions and frame formats
    /// before falling back to whatever the device offers. With `resize`,
    /// every decoded frame is scaled to that square size for models with a
    /// fixed input resolution.
    pub fn open_with_resize(index: u32, resize: Option<u32>) -> Result<Self, CaptureError> {
        let mut cam = None;
        for (w, h) in [(1280, 720), (640, 480)] {
            for fmt in [FrameFormat::RAWRGB, FrameFormat::MJPEG, FrameFormat::YUYV] {
                let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
                    CameraFormat::new_from(w, h, fmt, 30),
                ));
                if let Ok(c) = Camera::new(CameraIndex::Index(index), req) {
                    cam = Some(c);
                    break;
                }
            }
            if cam.is_some() {
                break;
            }
        }
        let fallback = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
        let mut cam = cam
            .or_else(|| Camera::new(CameraIndex::Index(index), fallback).ok())
            .ok_or_else(|| CaptureError::Open(format!("no usable format on camera {index}")))?;
        cam.open_stream()
            .map_err(|e| CaptureError::Open(e.to_string()))?;
        debug!(format = ?cam.camera_format(), "camera stream opened");
        Ok(Self { cam, resize })
    }
}

impl FrameSource for CameraSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        let buffer = self
            .cam
            .frame()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        let img = image::DynamicImage::ImageRgb8(decoded);
        let img = match self.resize {
            Some(side) => img.resize_exact(side, side, FilterType::CatmullRom),
            None => img,
        };
        let rgb = img.into_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(width, height, 3, rgb.into_raw()))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            warn!("failed to stop camera stream: {e}");
        }
        debug!("camera released");
    }
}

/// Capture loop: runs until `cancel` is set or the source fails to deliver a
/// frame. A read failure is fatal to the loop; a preprocessing or inference
/// failure only skips that frame. No frame outlives its pipeline pass, and
/// the source (camera handle included) is dropped on every exit path.
pub fn run_capture<S: FrameSource>(
    mut source: S,
    classifier: &Classifier,
    slot: &ResultSlot,
    cancel: &AtomicBool,
) {
    while !cancel.load(Ordering::Relaxed) {
        let frame = match source.read() {
            Ok(f) => f,
            Err(e) => {
                error!("failed to capture frame: {e}");
                break;
            }
        };
        let tensor = match normalize(frame) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping frame: {e}");
                continue;
            }
        };
        match classifier.classify(tensor) {
            Ok(result) => {
                trace!(label = %result.label, confidence = result.confidence, "frame classified");
                slot.publish(result);
            }
            Err(e) => warn!("inference failed, skipping frame: {e}"),
        }
    }
    debug!("capture loop stopped");
}

/// Spawns the capture loop on its own thread. The source is opened inside
/// that thread (device handles never cross threads) and the open result is
/// reported back before streaming begins, so callers can abort startup on a
/// camera that will not open.
pub fn spawn_capture<S, F>(
    open: F,
    classifier: Classifier,
    slot: Arc<ResultSlot>,
    cancel: Arc<AtomicBool>,
) -> Result<JoinHandle<()>, CaptureError>
where
    S: FrameSource + 'static,
    F: FnOnce() -> Result<S, CaptureError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = std::thread::spawn(move || {
        let source = match open() {
            Ok(source) => {
                let _ = tx.send(Ok(()));
                source
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        };
        run_capture(source, &classifier, &slot, &cancel);
    });
    match rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(CaptureError::Open(
                "capture thread exited before opening the source".into(),
            ))
        }
    }
}
