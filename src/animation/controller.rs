//! User-facing pan/zoom commands on top of a [`MapView`].

use crate::animation::interpolation::AnimationType;
use crate::animation::runner::{AnimationState, PanAnimation};
use crate::core::config::AnimationConfig;
use crate::core::geo::WorldCoord;
use crate::core::view::MapView;
use crate::{MapError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Drives pan animations and discrete zoom steps.
///
/// At most one pan runs at a time: starting a new one interrupts the previous
/// runner (optionally jumping to its target) before the new one starts.
pub struct MapController {
    view: Arc<MapView>,
    config: AnimationConfig,
    pan: Mutex<Option<PanAnimation>>,
    zoom_timer: Mutex<Option<JoinHandle<()>>>,
}

impl MapController {
    pub fn new(view: Arc<MapView>, config: AnimationConfig) -> Self {
        Self {
            view,
            config,
            pan: Mutex::new(None),
            zoom_timer: Mutex::new(None),
        }
    }

    pub fn view(&self) -> &Arc<MapView> {
        &self.view
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Pans with the configured curve, step count and duration.
    pub fn animate_to(&self, target: WorldCoord) -> Result<()> {
        self.animate_to_with(
            target,
            self.config.default_type,
            self.config.smoothness,
            self.config.duration(),
        )
    }

    pub fn animate_to_with(
        &self,
        target: WorldCoord,
        kind: AnimationType,
        smoothness: u32,
        duration: Duration,
    ) -> Result<()> {
        let mut pan = self.pan.lock();
        if let Some(previous) = pan.take() {
            Self::stop(&self.view, previous, self.config.snap_interrupted)?;
        }
        *pan = Some(PanAnimation::start(
            self.view.clone(),
            target,
            kind,
            smoothness,
            duration,
        )?);
        Ok(())
    }

    /// Stops the running pan, if any. With `jump_to_target` the center ends
    /// exactly on the pan's target once the runner has exited.
    pub fn stop_animation(&self, jump_to_target: bool) -> Result<()> {
        match self.pan.lock().take() {
            Some(previous) => Self::stop(&self.view, previous, jump_to_target),
            None => Ok(()),
        }
    }

    fn stop(view: &MapView, mut pan: PanAnimation, jump_to_target: bool) -> Result<()> {
        pan.interrupt();
        let _state = pan.join()?;
        #[cfg(feature = "debug")]
        log::debug!("pan to {:?} stopped ({:?})", pan.target(), _state);
        if jump_to_target {
            view.set_map_center(pan.target());
        }
        Ok(())
    }

    pub fn is_pan_running(&self) -> bool {
        self.pan.lock().as_ref().map_or(false, |pan| !pan.is_done())
    }

    /// Waits for the current pan to finish on its own.
    pub fn join_pan(&self) -> Result<Option<AnimationState>> {
        match self.pan.lock().as_mut() {
            Some(pan) => pan.join().map(Some),
            None => Ok(None),
        }
    }

    /// Jumps to `center`, cancelling any running pan first.
    pub fn set_center(&self, center: WorldCoord) -> Result<WorldCoord> {
        self.stop_animation(false)?;
        Ok(self.view.set_map_center(center))
    }

    pub fn scroll_by(&self, dx: i32, dy: i32) -> Result<WorldCoord> {
        self.stop_animation(false)?;
        Ok(self.view.scroll_by(dx, dy))
    }

    pub fn set_zoom(&self, zoom_level: u32) -> Result<u32> {
        self.view.set_zoom_level(zoom_level)
    }

    /// Starts a one-level zoom in; the new level is applied after
    /// `zoom_duration_ms`. Returns `false` when refused.
    pub fn zoom_in(&self) -> Result<bool> {
        if !self.view.zoom_in() {
            return Ok(false);
        }
        self.spawn_zoom_timer()?;
        Ok(true)
    }

    pub fn zoom_out(&self) -> Result<bool> {
        if !self.view.zoom_out() {
            return Ok(false);
        }
        self.spawn_zoom_timer()?;
        Ok(true)
    }

    /// Re-centers on `point` and zooms in one level.
    pub fn zoom_in_fixing(&self, point: WorldCoord) -> Result<bool> {
        self.set_center(point)?;
        self.zoom_in()
    }

    pub fn zoom_out_fixing(&self, point: WorldCoord) -> Result<bool> {
        self.set_center(point)?;
        self.zoom_out()
    }

    fn spawn_zoom_timer(&self) -> Result<()> {
        let view = self.view.clone();
        let delay = self.config.zoom_duration();
        let spawned = thread::Builder::new()
            .name("zoom-animation".to_string())
            .spawn(move || {
                thread::sleep(delay);
                match view.finish_zoom_animation() {
                    Ok(_zoom) => {
                        #[cfg(feature = "debug")]
                        log::debug!("zoom animation finished at {:?}", _zoom);
                    }
                    Err(_err) => {
                        #[cfg(feature = "debug")]
                        log::error!("zoom animation failed: {}", _err);
                    }
                }
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                // nothing will ever finish the pending zoom, so apply it now
                self.view.finish_zoom_animation()?;
                return Err(MapError::Animation(format!(
                    "failed to spawn zoom timer: {}",
                    err
                )));
            }
        };
        if let Some(previous) = self.zoom_timer.lock().replace(handle) {
            Self::join_zoom_timer(previous)?;
        }
        Ok(())
    }

    /// Waits for a pending zoom animation to be applied.
    pub fn join_zoom_animation(&self) -> Result<()> {
        let handle = self.zoom_timer.lock().take();
        match handle {
            Some(handle) => Self::join_zoom_timer(handle),
            None => Ok(()),
        }
    }

    fn join_zoom_timer(handle: JoinHandle<()>) -> Result<()> {
        handle.join().map_err(|_| {
            #[cfg(feature = "debug")]
            log::error!("zoom timer panicked");
            MapError::Animation("zoom timer panicked".to_string())
        })
    }
}

impl Drop for MapController {
    fn drop(&mut self) {
        if let Some(pan) = self.pan.get_mut().take() {
            pan.interrupt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapConfig;
    use crate::tiles::source::TileSource;

    fn controller(config: AnimationConfig) -> MapController {
        let view = MapView::new(Arc::new(TileSource::mapnik()), &MapConfig::default()).unwrap();
        MapController::new(Arc::new(view), config)
    }

    fn slow() -> AnimationConfig {
        AnimationConfig {
            smoothness: 100,
            duration_ms: 20_000,
            zoom_duration_ms: 10,
            ..AnimationConfig::default()
        }
    }

    #[test]
    fn test_stop_with_jump_lands_on_target() {
        let controller = controller(slow());
        let target = WorldCoord::new(1_000, 2_000);
        controller.animate_to(target).unwrap();
        assert!(controller.is_pan_running());

        controller.stop_animation(true).unwrap();
        assert!(!controller.is_pan_running());
        assert_eq!(controller.view().map_center(), target);
    }

    #[test]
    fn test_new_pan_replaces_old() {
        let controller = controller(AnimationConfig {
            snap_interrupted: true,
            ..slow()
        });
        let first = WorldCoord::new(5_000, 5_000);
        let second = WorldCoord::new(9_000, 1_000);

        controller.animate_to(first).unwrap();
        controller
            .animate_to_with(second, AnimationType::ExponentialDecelerating, 3, Duration::from_millis(3))
            .unwrap();
        assert_eq!(controller.join_pan().unwrap(), Some(AnimationState::Done));
        assert_eq!(controller.view().map_center(), second);
    }

    #[test]
    fn test_set_center_cancels_pan() {
        let controller = controller(slow());
        controller.animate_to(WorldCoord::new(0, 0)).unwrap();
        let center = WorldCoord::new(123, 456);
        assert_eq!(controller.set_center(center).unwrap(), center);
        assert!(!controller.is_pan_running());
        thread::sleep(Duration::from_millis(50));
        assert_eq!(controller.view().map_center(), center);
    }

    #[test]
    fn test_zoom_in_completes_after_delay() {
        let controller = controller(slow());
        controller.set_zoom(4).unwrap();
        assert!(controller.zoom_in().unwrap());
        assert_eq!(controller.view().zoom_level(true), 5);
        assert!(!controller.zoom_in().unwrap());

        controller.join_zoom_animation().unwrap();
        assert!(!controller.view().is_animating());
        assert_eq!(controller.view().zoom_level(false), 5);
    }

    #[test]
    fn test_zoom_fixing_recenters() {
        let controller = controller(slow());
        controller.set_zoom(3).unwrap();
        let point = WorldCoord::new(77_000, 88_000);
        assert!(controller.zoom_out_fixing(point).unwrap());
        controller.join_zoom_animation().unwrap();
        assert_eq!(controller.view().map_center(), point);
        assert_eq!(controller.view().zoom_level(false), 2);
    }

    #[test]
    fn test_panicked_zoom_timer_is_reported() {
        let handle: JoinHandle<()> = thread::spawn(|| panic!("timer"));
        let err = MapController::join_zoom_timer(handle).unwrap_err();
        assert!(matches!(err, MapError::Animation(_)));
        assert!(MapController::join_zoom_timer(thread::spawn(|| ())).is_ok());
    }
}
