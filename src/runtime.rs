//! The two periodic workers and their shared state.
//!
//! * `frame-producer` polls the [`FrameGrabber`] every
//!   [`LoopTiming::frame_interval`] and overwrites the [`LatestFrame`] slot.
//! * `gesture-worker` reads the slot every [`LoopTiming::classify_interval`],
//!   runs the [`LandmarkDetector`] and one engine pass.
//!
//! When the source is exhausted the producer withdraws the last frame and the
//! worker runs one empty pass, so no movement key stays held.
//!
//! Both loops watch a single stop flag. On exit the producer releases its
//! device and the worker performs the engine's safety key sweep.

use crate::{
    config::SharedProfile,
    constants::{CLASSIFY_INTERVAL, FRAME_POLL_INTERVAL},
    emitter::KeyInjector,
    engine::{EngineState, GestureEngine},
    frame_slot::LatestFrame,
    hud::HudStatus,
    landmarks::LandmarkFrame,
    source::{FrameGrabber, LandmarkDetector},
    Error, Result,
};
use log::{error, info, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Periods of the two worker loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub frame_interval: Duration,
    pub classify_interval: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            frame_interval: FRAME_POLL_INTERVAL,
            classify_interval: CLASSIFY_INTERVAL,
        }
    }
}

/// Running producer and worker threads around one engine
pub struct Runtime<I: KeyInjector + 'static> {
    engine: Arc<Mutex<GestureEngine<I>>>,
    profile: SharedProfile,
    stop: Arc<AtomicBool>,
    producer: Option<JoinHandle<Result<()>>>,
    worker: Option<JoinHandle<()>>,
}

fn producer_loop<G: FrameGrabber>(
    mut grabber: G,
    slot: &LatestFrame<G::Frame>,
    stop: &AtomicBool,
    interval: Duration,
) -> Result<()> {
    let result = loop {
        if stop.load(Ordering::Acquire) {
            break Ok(());
        }
        match grabber.grab() {
            Ok(Some(frame)) => slot.publish(frame),
            Ok(None) if grabber.is_exhausted() && slot.latest().is_some() => {
                info!("Frame source exhausted, withdrawing the last frame");
                slot.clear();
            }
            Ok(None) => {}
            Err(e) => {
                error!("Frame source failed: {}", e);
                stop.store(true, Ordering::Release);
                break Err(e);
            }
        }
        thread::sleep(interval);
    };

    grabber.release();
    info!("Frame producer exited after {} frames", slot.published());
    result
}

fn worker_loop<D, I>(
    mut detector: D,
    slot: &LatestFrame<D::Frame>,
    engine: &Mutex<GestureEngine<I>>,
    stop: &AtomicBool,
    interval: Duration,
) where
    D: LandmarkDetector,
    I: KeyInjector,
{
    let mut had_frame = false;
    while !stop.load(Ordering::Acquire) {
        let running = engine.lock().is_running();
        if running {
            match slot.latest() {
                Some(frame) => {
                    let landmarks = detector.detect(&frame);
                    engine.lock().process(&landmarks);
                    had_frame = true;
                }
                // Withdrawn frame: one pass with nothing detected releases held keys
                None if had_frame => {
                    engine.lock().process(&LandmarkFrame::empty());
                    had_frame = false;
                }
                None => {}
            }
        }
        thread::sleep(interval);
    }

    engine.lock().stop();
    info!("Gesture worker exited, all keys released");
}

impl<I: KeyInjector + 'static> Runtime<I> {
    /// Spawn the producer and worker threads
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a thread cannot be spawned
    pub fn spawn<G, D>(grabber: G, detector: D, engine: GestureEngine<I>, timing: LoopTiming) -> Result<Self>
    where
        G: FrameGrabber + 'static,
        D: LandmarkDetector<Frame = G::Frame> + 'static,
    {
        let profile = engine.profile().clone();
        let engine = Arc::new(Mutex::new(engine));
        let stop = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(LatestFrame::<G::Frame>::new());

        let producer = {
            let slot = Arc::clone(&slot);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("frame-producer".to_string())
                .spawn(move || producer_loop(grabber, &slot, &stop, timing.frame_interval))?
        };

        let worker = {
            let worker_engine = Arc::clone(&engine);
            let worker_stop = Arc::clone(&stop);
            let spawned = thread::Builder::new()
                .name("gesture-worker".to_string())
                .spawn(move || {
                    worker_loop(detector, &slot, &worker_engine, &worker_stop, timing.classify_interval);
                });
            match spawned {
                Ok(handle) => handle,
                Err(e) => {
                    stop.store(true, Ordering::Release);
                    let _ = producer.join();
                    return Err(Error::Io(e));
                }
            }
        };

        info!(
            "Runtime started (frame every {:?}, pass every {:?})",
            timing.frame_interval, timing.classify_interval
        );

        Ok(Self {
            engine,
            profile,
            stop,
            producer: Some(producer),
            worker: Some(worker),
        })
    }

    /// Start or stop gesture processing; stopping releases every key
    pub fn toggle(&self) -> EngineState {
        let state = self.engine.lock().toggle();
        info!("System {}", if state == EngineState::Running { "started" } else { "stopped" });
        state
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.engine.lock().state()
    }

    /// Current status mirror and held keys
    #[must_use]
    pub fn status(&self) -> (HudStatus, Vec<String>) {
        let engine = self.engine.lock();
        (engine.hud().clone(), engine.active_names())
    }

    /// Live configuration shared with the worker
    #[must_use]
    pub fn profile(&self) -> &SharedProfile {
        &self.profile
    }

    /// Whether the loops have been asked to stop, e.g. after a source failure
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Stop both loops and wait for them.
    ///
    /// # Errors
    ///
    /// Returns the frame source's error if the producer failed
    pub fn shutdown(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::Release);

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Gesture worker panicked, releasing keys");
                self.engine.lock().stop();
            }
        }

        match self.producer.take().map(JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(Error::Source("frame producer panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl<I: KeyInjector + 'static> Drop for Runtime<I> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!("Runtime dropped with error: {}", e);
        }
    }
}
