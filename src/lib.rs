//! Hands-free keyboard control from hand and face landmarks.
//!
//! This library turns a stream of landmark frames into debounced key presses:
//! - per-channel gesture classification (mouth, eye blink, hand tilt, rock
//!   sign, finger spread, gas/brake)
//! - latches so one-shot gestures fire once per occurrence
//! - three-way resolution of held movement keys without stale presses
//! - best-effort key injection through X11 XTEST
//!
//! The pipeline for every frame is:
//! 1. Classify every channel against the current thresholds
//! 2. Debounce edge-triggered channels
//! 3. Resolve channel states into press/release actions
//! 4. Emit the actions and update the held-key set
//!
//! # Examples
//!
//! ## One pass over a frame
//!
//! ```
//! use phantomcast::{
//!     config::SharedProfile,
//!     emitter::RecordingInjector,
//!     engine::GestureEngine,
//!     landmarks::LandmarkFrame,
//! };
//!
//! let injector = RecordingInjector::new();
//! let mut engine = GestureEngine::new(injector.clone(), SharedProfile::default());
//! engine.start();
//!
//! // Nothing detected: every movement key is released, nothing is pressed.
//! let actions = engine.process(&LandmarkFrame::empty());
//! assert!(actions.iter().all(|action| !action.pressed));
//! assert!(engine.active_keys().is_empty());
//!
//! // Stopping sweeps every bindable key.
//! engine.stop();
//! assert!(!injector.events().is_empty());
//! ```
//!
//! ## Replaying a recorded session
//!
//! ```no_run
//! use phantomcast::{
//!     config::{Settings, SharedProfile},
//!     emitter::LogInjector,
//!     engine::GestureEngine,
//!     runtime::{LoopTiming, Runtime},
//!     source::{RecordedLandmarks, ReplayGrabber},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load_or_default("phantomcast_settings.json");
//! let profile = SharedProfile::from_settings(&settings)?;
//! let engine = GestureEngine::new(LogInjector, profile);
//!
//! let grabber = ReplayGrabber::open("session.jsonl", 30.0, false)?;
//! let runtime = Runtime::spawn(grabber, RecordedLandmarks, engine, LoopTiming::default())?;
//! runtime.toggle();
//! std::thread::sleep(std::time::Duration::from_secs(5));
//! runtime.shutdown()?;
//! # Ok(())
//! # }
//! ```

/// Landmark frames produced by the detectors
pub mod landmarks;

/// Per-channel gesture classification
pub mod classifier;

/// Latches for edge-triggered gestures
pub mod debounce;

/// Key vocabulary and binding parser
pub mod keys;

/// Channel states to key actions
pub mod resolver;

/// Key emission and the held-key set
pub mod emitter;

/// Key injection for X11 systems
pub mod x11_input;

/// Gesture engine lifecycle and per-frame pass
pub mod engine;

/// Per-channel status text
pub mod hud;

/// Latest-frame handoff between workers
pub mod frame_slot;

/// Frame and landmark collaborator interfaces
pub mod source;

/// Producer and classification workers
pub mod runtime;

/// Geometry and numeric helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
