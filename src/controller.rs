//! Frame clock and input forwarding

use crate::gpu::{FaceCompute, GpuError, Renderer};
use crate::settings::Settings;

/// Tracks application time and routes pointer/resize events to the
/// compute and render components.
#[derive(Debug, Default)]
pub struct Controller {
    start_time: f64,
    current_time: f64,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timestamp of the frame being rendered. The first call
    /// pins the start time.
    pub fn update_time(&mut self, timestamp: f64) {
        if self.start_time == 0.0 {
            self.start_time = timestamp;
        }
        self.current_time = timestamp;
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Milliseconds since the first rendered frame
    pub fn elapsed(&self) -> f64 {
        self.current_time - self.start_time
    }

    /// A click in canvas-local logical pixels: spawn a face there and
    /// hand it to the renderer. Ignored while a resize is settling.
    pub fn handle_click(
        &self,
        compute: &FaceCompute,
        renderer: &mut Renderer,
        x: f32,
        y: f32,
        settings: &Settings,
        now: f64,
    ) -> Result<(), GpuError> {
        if renderer.resize_pending() {
            log::debug!("click ignored during resize quiescence");
            return Ok(());
        }
        let face = compute.create_face(x, y, settings.spawn_radius, settings.spawn_velocity(), now)?;
        renderer.register_face(face);
        Ok(())
    }

    /// A window resize in logical pixels, forwarded to the renderer's
    /// debounced handler
    pub fn handle_resize(
        &self,
        renderer: &mut Renderer,
        logical_width: u32,
        logical_height: u32,
        now: f64,
    ) {
        renderer.resize_requested(logical_width, logical_height, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_update_pins_start_time() {
        let mut controller = Controller::new();
        controller.update_time(123.0);
        assert_eq!(controller.start_time(), 123.0);
        assert_eq!(controller.current_time(), 123.0);
        assert_eq!(controller.elapsed(), 0.0);
    }

    #[test]
    fn test_later_updates_only_advance_current_time() {
        let mut controller = Controller::new();
        controller.update_time(100.0);
        controller.update_time(350.0);
        controller.update_time(600.0);
        assert_eq!(controller.start_time(), 100.0);
        assert_eq!(controller.current_time(), 600.0);
        assert_eq!(controller.elapsed(), 500.0);
    }
}
