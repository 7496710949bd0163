// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smooth camera motion.
//!
//! Pose changes coming from the model are blended over
//! [`CAMERA_MOTION_DURATION`] by a timer thread. The animation state is the
//! only data shared with that thread and always sits behind a mutex.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use planview_core::CameraPose;

use crate::error::{Error, Result};

pub const CAMERA_MOTION_DURATION: Duration = Duration::from_millis(150);

/// Below this progress a superseded motion jumps to its target first
const SNAP_PROGRESS: f64 = 0.3;

/// Pose blending between an initial and a target pose.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraAnimation {
    initial: CameraPose,
    target: CameraPose,
    start: Option<Instant>,
    progress: f64,
    rendered: CameraPose,
}

impl CameraAnimation {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            initial: pose,
            target: pose,
            start: None,
            progress: 1.0,
            rendered: pose,
        }
    }

    pub fn rendered(&self) -> CameraPose {
        self.rendered
    }

    pub fn initial(&self) -> CameraPose {
        self.initial
    }

    pub fn target(&self) -> CameraPose {
        self.target
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_animating(&self) -> bool {
        self.start.is_some()
    }

    /// Jumps to `pose`, cancelling any motion
    pub fn set_pose(&mut self, pose: CameraPose) {
        *self = Self::new(pose);
    }

    /// Starts a motion from the pose shown at `now` towards `pose`
    pub fn request(&mut self, pose: CameraPose, now: Instant) {
        self.tick(now);
        if self.is_animating() && self.progress < SNAP_PROGRESS {
            self.rendered = self.target;
        }
        self.initial = self.rendered;
        self.target = pose;
        self.start = Some(now);
        self.progress = 0.0;
    }

    /// Moves the rendered pose to where the motion is at `now`
    pub fn tick(&mut self, now: Instant) {
        let Some(start) = self.start else {
            return;
        };
        let elapsed = now.saturating_duration_since(start).as_secs_f64();
        self.progress = (elapsed / CAMERA_MOTION_DURATION.as_secs_f64()).min(1.0);
        self.rendered = interpolate(&self.initial, &self.target, self.progress);
    }

    /// Ends the motion once its duration has elapsed, leaving the rendered
    /// pose exactly on the target. Returns `true` if it ended the motion.
    pub fn watchdog(&mut self, now: Instant) -> bool {
        match self.start {
            Some(start) if now.saturating_duration_since(start) >= CAMERA_MOTION_DURATION => {
                self.rendered = self.target;
                self.progress = 1.0;
                self.start = None;
                true
            }
            _ => false,
        }
    }
}

fn interpolate(from: &CameraPose, to: &CameraPose, t: f64) -> CameraPose {
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    CameraPose {
        x: lerp(from.x, to.x),
        y: lerp(from.y, to.y),
        z: lerp(from.z, to.z),
        yaw: lerp(from.yaw, to.yaw),
        pitch: lerp(from.pitch, to.pitch),
        field_of_view: to.field_of_view,
    }
}

fn lock(animation: &Mutex<CameraAnimation>) -> MutexGuard<'_, CameraAnimation> {
    animation.lock().unwrap_or_else(PoisonError::into_inner)
}

enum TimerMessage {
    Wake,
    Stop,
}

/// Access to a running camera animation from the UI thread.
#[derive(Clone)]
pub struct CameraHandle {
    animation: Arc<Mutex<CameraAnimation>>,
    timer: Sender<TimerMessage>,
}

impl CameraHandle {
    /// Shows `pose` immediately
    pub fn set_pose(&self, pose: CameraPose) {
        lock(&self.animation).set_pose(pose);
    }

    /// Moves smoothly to `pose`
    pub fn request(&self, pose: CameraPose) {
        lock(&self.animation).request(pose, Instant::now());
        // The timer only stops with its interpolator
        let _ = self.timer.send(TimerMessage::Wake);
    }

    pub fn rendered(&self) -> CameraPose {
        lock(&self.animation).rendered()
    }

    pub fn is_animating(&self) -> bool {
        lock(&self.animation).is_animating()
    }

    pub fn snapshot(&self) -> CameraAnimation {
        lock(&self.animation).clone()
    }
}

impl std::fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraHandle")
            .field("animation", &self.snapshot())
            .finish()
    }
}

/// Owner of the camera timer thread.
#[derive(Debug)]
pub struct CameraInterpolator {
    handle: CameraHandle,
    thread: Option<JoinHandle<()>>,
}

impl CameraInterpolator {
    /// Starts the timer thread, idle until the first motion request
    pub fn start(pose: CameraPose, tick: Duration) -> Result<Self> {
        let animation = Arc::new(Mutex::new(CameraAnimation::new(pose)));
        let (sender, receiver) = mpsc::channel();
        let shared = Arc::clone(&animation);
        let thread = thread::Builder::new()
            .name("planview-camera".into())
            .spawn(move || {
                loop {
                    let animating = lock(&shared).is_animating();
                    let message = if animating {
                        match receiver.recv_timeout(tick) {
                            Ok(message) => Some(message),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    } else {
                        match receiver.recv() {
                            Ok(message) => Some(message),
                            Err(_) => break,
                        }
                    };
                    if let Some(TimerMessage::Stop) = message {
                        break;
                    }
                    let now = Instant::now();
                    let mut animation = lock(&shared);
                    animation.tick(now);
                    if animation.watchdog(now) {
                        tracing::trace!("camera motion finished");
                    }
                }
                tracing::debug!("camera timer stopped");
            })
            .map_err(|e| Error::TimerThread(e.to_string()))?;
        tracing::debug!(tick_ms = tick.as_millis() as u64, "camera timer started");

        Ok(Self {
            handle: CameraHandle {
                animation,
                timer: sender,
            },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> CameraHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stops and joins the timer thread
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.handle.timer.send(TimerMessage::Stop);
        if thread.join().is_err() {
            tracing::warn!("camera timer thread panicked");
        }
    }
}

impl Drop for CameraInterpolator {
    fn drop(&mut self) {
        self.stop();
    }
}
