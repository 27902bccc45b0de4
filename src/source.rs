//! Interfaces to the frame and landmark collaborators, plus a recorded-session
//! implementation of both.
//!
//! Camera capture and landmark inference live outside this crate. A
//! [`FrameGrabber`] stands for the camera and a [`LandmarkDetector`] for the
//! hand and face models. [`ReplayGrabber`] and [`RecordedLandmarks`] replay a
//! JSON-lines file of [`LandmarkFrame`]s so the engine can run without either.

use crate::{
    landmarks::{FaceLandmarks, HandLandmarks, LandmarkFrame},
    Error, Result,
};
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

/// Produces raw frames for the producer loop
pub trait FrameGrabber: Send {
    type Frame: Send + Sync + 'static;

    /// Next frame, or `None` if nothing new is available yet.
    ///
    /// # Errors
    ///
    /// An error means the device is gone and is fatal to the producer.
    fn grab(&mut self) -> Result<Option<Self::Frame>>;

    /// Whether the source will never produce another frame
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Give the device back; called once when the producer exits
    fn release(&mut self) {}
}

/// Finds hand and face landmarks in a frame
pub trait LandmarkDetector: Send {
    type Frame;

    /// Detected hands, each tagged with its handedness
    fn detect_hands(&mut self, frame: &Self::Frame) -> Vec<HandLandmarks>;

    /// Detected face mesh, if any
    fn detect_face(&mut self, frame: &Self::Frame) -> Option<FaceLandmarks>;

    /// Run both detectors
    fn detect(&mut self, frame: &Self::Frame) -> LandmarkFrame {
        LandmarkFrame {
            hands: self.detect_hands(frame),
            face: self.detect_face(frame),
        }
    }
}

/// Detector for frames whose landmarks were recorded ahead of time
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordedLandmarks;

impl LandmarkDetector for RecordedLandmarks {
    type Frame = LandmarkFrame;

    fn detect_hands(&mut self, frame: &LandmarkFrame) -> Vec<HandLandmarks> {
        frame.hands.clone()
    }

    fn detect_face(&mut self, frame: &LandmarkFrame) -> Option<FaceLandmarks> {
        frame.face.clone()
    }
}

/// Replays recorded landmark frames at a fixed rate
#[derive(Debug)]
pub struct ReplayGrabber {
    frames: Vec<LandmarkFrame>,
    cursor: usize,
    interval: Duration,
    last_frame: Option<Instant>,
    looping: bool,
    exhausted: bool,
}

impl ReplayGrabber {
    /// Replay `frames`, advancing at most once per `interval`
    ///
    /// # Errors
    ///
    /// Returns `Error::Source` if there are no frames
    pub fn from_frames(frames: Vec<LandmarkFrame>, interval: Duration, looping: bool) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::Source("recording contains no frames".to_string()));
        }
        Ok(Self {
            frames,
            cursor: 0,
            interval,
            last_frame: None,
            looping,
            exhausted: false,
        })
    }

    /// Open a JSON-lines recording, one frame per line.
    ///
    /// Blank lines are skipped and malformed lines are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Source` if the file cannot be read or holds no frames,
    /// and `Error::InvalidInput` for an `fps` that is not positive or too
    /// small to give a frame interval
    pub fn open<P: AsRef<Path>>(path: P, fps: f64, looping: bool) -> Result<Self> {
        let path = path.as_ref();
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::InvalidInput(format!("Replay fps must be positive, got {fps}")));
        }
        let interval = Duration::try_from_secs_f64(1.0 / fps)
            .map_err(|e| Error::InvalidInput(format!("Replay fps {fps} is out of range: {e}")))?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Source(format!("Cannot open recording {}: {e}", path.display())))?;

        let mut frames = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LandmarkFrame>(line) {
                Ok(frame) => {
                    for hand in frame.hands.iter().filter(|hand| !hand.is_complete()) {
                        warn!(
                            "Line {}: {} hand has only {} landmarks",
                            number + 1,
                            hand.handedness.as_str(),
                            hand.points.len()
                        );
                    }
                    frames.push(frame);
                }
                Err(e) => warn!("Skipping line {} of {}: {}", number + 1, path.display(), e),
            }
        }

        info!("Loaded {} recorded frames from {}", frames.len(), path.display());
        Self::from_frames(frames, interval, looping)
    }

    /// Number of frames in the recording
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameGrabber for ReplayGrabber {
    type Frame = LandmarkFrame;

    fn grab(&mut self) -> Result<Option<LandmarkFrame>> {
        if self.last_frame.is_some_and(|last| last.elapsed() < self.interval) {
            return Ok(None);
        }

        if self.cursor >= self.frames.len() {
            if !self.looping {
                if !self.exhausted {
                    info!("Recording finished after {} frames", self.frames.len());
                    self.exhausted = true;
                }
                return Ok(None);
            }
            self.cursor = 0;
        }

        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        self.last_frame = Some(Instant::now());
        Ok(Some(frame))
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn release(&mut self) {
        info!("Replay source released");
    }
}
