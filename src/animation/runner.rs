//! Background pan animation.
//!
//! One runner thread steps the view center toward a target, publishing every
//! step through [`MapView::move_by`]. Between steps it waits on a
//! cancellation channel, so an interrupt wakes it immediately instead of
//! after the current sleep.

use crate::animation::interpolation::{AnimationType, PanCurve};
use crate::core::geo::WorldCoord;
use crate::core::view::MapView;
use crate::{MapError, Result};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle of one pan animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AnimationState {
    Created = 0,
    Running = 1,
    Done = 2,
    Interrupted = 3,
}

impl AnimationState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => AnimationState::Created,
            1 => AnimationState::Running,
            2 => AnimationState::Done,
            _ => AnimationState::Interrupted,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, AnimationState::Done | AnimationState::Interrupted)
    }
}

/// Handle to a running pan. Dropping the handle detaches the runner, it
/// keeps going until it reaches the target.
#[derive(Debug)]
pub struct PanAnimation {
    target: WorldCoord,
    kind: AnimationType,
    state: Arc<AtomicU8>,
    cancel: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl PanAnimation {
    /// Spawns the runner thread. `smoothness` is the step count (at least
    /// one); each step is followed by a wait of `duration / smoothness`.
    ///
    /// The target is normalized by the view first, so the pan heads for the
    /// center the view can actually hold.
    pub fn start(
        view: Arc<MapView>,
        target: WorldCoord,
        kind: AnimationType,
        smoothness: u32,
        duration: Duration,
    ) -> Result<Self> {
        let target = view.normalize(target);
        let curve = PanCurve::new(kind, smoothness);
        let step_duration = duration / curve.steps();
        let state = Arc::new(AtomicU8::new(AnimationState::Created as u8));
        let (cancel, cancelled) = bounded::<()>(1);

        let runner_state = state.clone();
        let handle = thread::Builder::new()
            .name(format!("pan-{:?}", kind))
            .spawn(move || {
                runner_state.store(AnimationState::Running as u8, Ordering::Release);
                #[cfg(feature = "debug")]
                let started = instant::Instant::now();

                let start = view.map_center();
                // both ends lie inside the world, so the distance fits i32
                let xs = curve.offsets(target.x - start.x);
                let ys = curve.offsets(target.y - start.y);
                #[cfg(feature = "debug")]
                log::debug!(
                    "{:?} pan {:?} -> {:?} in {} steps",
                    kind,
                    start,
                    target,
                    curve.steps()
                );

                let mut previous = WorldCoord::default();
                let last = xs.len() - 1;
                for (step, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
                    let offset = WorldCoord::new(x, y);
                    if step == last && kind.snaps_to_target() {
                        view.set_map_center(target);
                    } else {
                        let delta = offset - previous;
                        view.move_by(delta.x as i64, delta.y as i64);
                    }
                    previous = offset;

                    if step == last {
                        break;
                    }
                    match cancelled.recv_timeout(step_duration) {
                        Ok(()) => {
                            runner_state.store(AnimationState::Interrupted as u8, Ordering::Release);
                            #[cfg(feature = "debug")]
                            log::debug!("{:?} pan interrupted after {} steps", kind, step + 1);
                            return;
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        // handle dropped, keep running detached
                        Err(RecvTimeoutError::Disconnected) => thread::sleep(step_duration),
                    }
                }

                runner_state.store(AnimationState::Done as u8, Ordering::Release);
                #[cfg(feature = "debug")]
                log::debug!("{:?} pan done in {:?}", kind, started.elapsed());
            })
            .map_err(|err| MapError::Animation(format!("failed to spawn pan runner: {}", err)))?;

        Ok(Self {
            target,
            kind,
            state,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn target(&self) -> WorldCoord {
        self.target
    }

    pub fn kind(&self) -> AnimationType {
        self.kind
    }

    pub fn state(&self) -> AnimationState {
        AnimationState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_done(&self) -> bool {
        self.state().is_finished()
    }

    /// Asks the runner to stop before its next step. The step in progress
    /// still completes its write.
    pub fn interrupt(&self) {
        // a full channel already carries a pending interrupt
        let _ = self.cancel.try_send(());
    }

    /// Waits for the runner to exit and returns its final state.
    pub fn join(&mut self) -> Result<AnimationState> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| MapError::Animation(format!("{:?} pan runner panicked", self.kind)))?;
        }
        Ok(self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapConfig;
    use crate::tiles::source::TileSource;

    fn view() -> Arc<MapView> {
        Arc::new(MapView::new(Arc::new(TileSource::mapnik()), &MapConfig::default()).unwrap())
    }

    #[test]
    fn test_every_curve_lands_on_target() {
        for kind in AnimationType::ALL {
            let view = view();
            let start = view.map_center();
            let target = WorldCoord::new(start.x + 1000, start.y - 737);

            let mut pan = PanAnimation::start(view.clone(), target, kind, 5, Duration::from_millis(10)).unwrap();
            assert_eq!(pan.join().unwrap(), AnimationState::Done);
            assert_eq!(view.map_center(), target, "{:?}", kind);
        }
    }

    #[test]
    fn test_interrupt_stops_between_steps() {
        let view = view();
        let start = view.map_center();
        let target = WorldCoord::new(start.x + 100_000, start.y);

        let mut pan = PanAnimation::start(
            view.clone(),
            target,
            AnimationType::Linear,
            50,
            Duration::from_secs(10),
        )
        .unwrap();
        pan.interrupt();
        assert_eq!(pan.join().unwrap(), AnimationState::Interrupted);
        assert!(pan.is_done());
        assert_ne!(view.map_center(), target);
    }

    #[test]
    fn test_unreachable_target_is_normalized_first() {
        let view = view();
        let mut pan = PanAnimation::start(
            view.clone(),
            WorldCoord::new(i32::MIN, 0),
            AnimationType::Linear,
            4,
            Duration::from_millis(4),
        )
        .unwrap();
        assert_eq!(pan.target(), WorldCoord::new(0, 0));
        assert_eq!(pan.join().unwrap(), AnimationState::Done);
        assert_eq!(view.map_center(), WorldCoord::new(0, 0));
    }

    #[test]
    fn test_zero_duration() {
        let view = view();
        let target = WorldCoord::new(10, 20);
        let mut pan = PanAnimation::start(view.clone(), target, AnimationType::HalfCosine, 0, Duration::ZERO).unwrap();
        assert_eq!(pan.join().unwrap(), AnimationState::Done);
        assert_eq!(view.map_center(), target);
    }
}
