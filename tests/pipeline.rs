use gesture_games::{
    normalize, run_capture, spawn_capture, Classification, Classifier, Frame, FrameSource,
    InferError, ModelBackend, PreprocessError, ResultSlot,
};
use gesture_games::{CaptureError, LoadError};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn rgb_frame(bytes: Vec<u8>) -> Frame {
    Frame::new(1, 1, 3, bytes)
}

struct FixedBackend(Vec<f32>);

impl ModelBackend for FixedBackend {
    fn run(&self, _input: &candle_core::Tensor) -> Result<Vec<f32>, InferError> {
        Ok(self.0.clone())
    }
}

struct FailingBackend;

impl ModelBackend for FailingBackend {
    fn run(&self, _input: &candle_core::Tensor) -> Result<Vec<f32>, InferError> {
        Err(InferError::Backend("session dropped".to_string()))
    }
}

fn rps_classifier(scores: Vec<f32>) -> Classifier {
    Classifier::new(
        Box::new(FixedBackend(scores)),
        vec!["rock".into(), "paper".into(), "scissors".into()],
    )
    .unwrap()
}

#[test]
fn normalize_scales_bytes_and_shapes_nhwc() {
    let frame = Frame::new(2, 1, 3, vec![0, 51, 102, 153, 204, 255]);
    let tensor = normalize(frame).unwrap();
    assert_eq!(tensor.dims(), &[1, 1, 2, 3]);

    let values = tensor.flatten_all().unwrap().to_vec1::<f32>().unwrap();
    let expected = [0.0f32, 0.2, 0.4, 0.6, 0.8, 1.0];
    for (v, e) in values.iter().zip(expected) {
        assert!((v - e).abs() < 1e-6, "got {v}, expected {e}");
    }
}

proptest! {
    #[test]
    fn normalize_rejects_mismatched_buffers(
        width in 1u32..8,
        height in 1u32..8,
        extra in 1usize..16,
    ) {
        let expected = (width * height * 3) as usize;
        let frame = Frame::new(width, height, 3, vec![0u8; expected + extra]);
        match normalize(frame) {
            Err(PreprocessError::BufferLength { expected: e, actual }) => {
                prop_assert_eq!(e, expected);
                prop_assert_eq!(actual, expected + extra);
            }
            other => prop_assert!(false, "expected BufferLength error, got {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn classify_picks_highest_score() {
    let classifier = rps_classifier(vec![0.1, 0.7, 0.2]);
    let tensor = normalize(rgb_frame(vec![10, 20, 30])).unwrap();
    let result = classifier.classify(tensor).unwrap();
    assert_eq!(
        result,
        Classification {
            label: "paper".to_string(),
            confidence: 0.7,
        }
    );
}

#[test]
fn classify_is_deterministic() {
    let classifier = rps_classifier(vec![0.1, 0.7, 0.2]);
    let first = classifier
        .classify(normalize(rgb_frame(vec![10, 20, 30])).unwrap())
        .unwrap();
    let second = classifier
        .classify(normalize(rgb_frame(vec![10, 20, 30])).unwrap())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn classify_breaks_ties_toward_lowest_index() {
    let classifier = rps_classifier(vec![0.5, 0.5, 0.0]);
    let tensor = normalize(rgb_frame(vec![0, 0, 0])).unwrap();
    let result = classifier.classify(tensor).unwrap();
    assert_eq!(result.label, "rock");
    assert_eq!(result.confidence, 0.5);
}

#[test]
fn classify_rejects_output_length_mismatch() {
    let classifier = rps_classifier(vec![0.5, 0.5]);
    let tensor = normalize(rgb_frame(vec![0, 0, 0])).unwrap();
    match classifier.classify(tensor) {
        Err(InferError::OutputLength { expected, actual }) => {
            assert_eq!(expected, 3);
            assert_eq!(actual, 2);
        }
        other => panic!("expected OutputLength error, got {other:?}"),
    }
}

#[test]
fn classifier_requires_labels() {
    let result = Classifier::new(Box::new(FixedBackend(vec![1.0])), vec![]);
    assert!(matches!(result, Err(LoadError::EmptyLabels)));
}

#[test]
fn slot_starts_empty_and_sequences_publishes() {
    let slot = ResultSlot::new();
    assert!(slot.read_latest().is_none());

    slot.publish(Classification {
        label: "rock".into(),
        confidence: 0.5,
    });
    let (first, seq1) = slot.read_latest().unwrap();
    assert_eq!(first.label, "rock");

    slot.publish(Classification {
        label: "paper".into(),
        confidence: 0.9,
    });
    let (second, seq2) = slot.read_latest().unwrap();
    assert_eq!(second.label, "paper");
    assert!(seq2 > seq1);
}

#[test]
fn slot_never_tears_under_concurrent_access() {
    let slot = Arc::new(ResultSlot::new());
    let writer_slot = slot.clone();
    let writer = thread::spawn(move || {
        for i in 0..2000u32 {
            let result = if i % 2 == 0 {
                Classification {
                    label: "a".into(),
                    confidence: 0.25,
                }
            } else {
                Classification {
                    label: "bbbb".into(),
                    confidence: 0.75,
                }
            };
            writer_slot.publish(result);
        }
    });

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let slot = slot.clone();
            thread::spawn(move || {
                let mut last_seq = 0u64;
                for _ in 0..2000 {
                    if let Some((result, seq)) = slot.read_latest() {
                        // label and confidence always come from the same publish
                        match result.label.as_str() {
                            "a" => assert_eq!(result.confidence, 0.25),
                            "bbbb" => assert_eq!(result.confidence, 0.75),
                            other => panic!("unexpected label {other}"),
                        }
                        assert!(seq >= last_seq);
                        last_seq = seq;
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

/// Scripted frame source: plays back its queue, then fails. Counts drops so
/// tests can assert the handle is released exactly once.
struct FakeSource {
    script: VecDeque<Result<Frame, CaptureError>>,
    drops: Arc<AtomicUsize>,
    delay: Duration,
}

impl FakeSource {
    fn new(script: Vec<Result<Frame, CaptureError>>, drops: Arc<AtomicUsize>) -> Self {
        Self {
            script: script.into(),
            drops,
            delay: Duration::ZERO,
        }
    }

    fn endless(drops: Arc<AtomicUsize>) -> Self {
        Self {
            script: VecDeque::new(),
            drops,
            delay: Duration::from_millis(5),
        }
    }
}

impl FrameSource for FakeSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        thread::sleep(self.delay);
        match self.script.pop_front() {
            Some(entry) => entry,
            None if self.delay > Duration::ZERO => Ok(rgb_frame(vec![1, 2, 3])),
            None => Err(CaptureError::EndOfStream),
        }
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn capture_skips_bad_frames_and_stops_on_read_failure() {
    let drops = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new(
        vec![
            Ok(rgb_frame(vec![1, 2, 3])),
            // malformed: three channels declared, two bytes present
            Ok(rgb_frame(vec![9, 9])),
            Ok(rgb_frame(vec![4, 5, 6])),
            Err(CaptureError::EndOfStream),
        ],
        drops.clone(),
    );
    let slot = ResultSlot::new();
    let cancel = AtomicBool::new(false);

    run_capture(source, &rps_classifier(vec![0.1, 0.7, 0.2]), &slot, &cancel);

    let (result, seq) = slot.read_latest().unwrap();
    assert_eq!(result.label, "paper");
    // two good frames published, the malformed one skipped
    assert_eq!(seq, 2);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn capture_continues_past_inference_failures() {
    let drops = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::new(
        vec![
            Ok(rgb_frame(vec![1, 2, 3])),
            Ok(rgb_frame(vec![4, 5, 6])),
            Err(CaptureError::EndOfStream),
        ],
        drops.clone(),
    );
    let classifier = Classifier::new(
        Box::new(FailingBackend),
        vec!["rock".into(), "paper".into(), "scissors".into()],
    )
    .unwrap();
    let slot = ResultSlot::new();
    let cancel = AtomicBool::new(false);

    run_capture(source, &classifier, &slot, &cancel);

    // every inference failed, so nothing was published, but the loop ran to
    // the end of the script rather than dying on the first error
    assert!(slot.read_latest().is_none());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn cancellation_stops_capture_and_releases_source_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let source = FakeSource::endless(drops.clone());
    let classifier = rps_classifier(vec![0.1, 0.7, 0.2]);
    let slot = Arc::new(ResultSlot::new());
    let cancel = Arc::new(AtomicBool::new(false));

    let handle = spawn_capture(
        move || Ok::<_, CaptureError>(source),
        classifier,
        slot.clone(),
        cancel.clone(),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(50));
    cancel.store(true, Ordering::Relaxed);
    handle.join().unwrap();

    assert_eq!(drops.load(Ordering::SeqCst), 1);
    let (result, _) = slot.read_latest().unwrap();
    assert_eq!(result.label, "paper");
}

#[test]
fn spawn_capture_surfaces_open_failure() {
    let classifier = rps_classifier(vec![0.1, 0.7, 0.2]);
    let slot = Arc::new(ResultSlot::new());
    let cancel = Arc::new(AtomicBool::new(false));

    let result = spawn_capture(
        || Err::<FakeSource, _>(CaptureError::Open("no such device".into())),
        classifier,
        slot,
        cancel,
    );
    match result {
        Err(CaptureError::Open(msg)) => assert!(msg.contains("no such device")),
        other => panic!("expected Open error, got {:?}", other.map(|_| ())),
    }
}
