//! The face entity: one head, two eyes, a mouth, and a moving transform

use glam::Vec2;

use super::primitive::{PaletteColor, Primitive};
use crate::math::{Matrix, MatrixError};

/// Eye horizontal offset as a fraction of the head radius
const EYE_OFFSET: f32 = 3.0 / 8.0;
/// Eye vertical offset and radius as a fraction of the head radius
const EYE_SCALE: f32 = 1.0 / 8.0;
/// Mouth radius as a fraction of the head radius
const MOUTH_SCALE: f32 = 1.0 / 4.0;
/// Mouth start angle in degrees; the arc spans 180 degrees from here
const MOUTH_START_ANGLE: f32 = 180.0;

/// A spawned face. Feature positions are frozen at construction as fixed
/// ratios of the head radius; motion happens entirely in the transform.
#[derive(Debug)]
pub struct Face {
    pub head: Primitive,
    pub eye_left: Primitive,
    pub eye_right: Primitive,
    pub mouth: Primitive,
    /// Velocity in pixels per second
    pub velocity: Vec2,
    /// Affine translation accumulated since spawn, 3x3 column-major
    pub transform: Matrix,
    pub transform_buffer: Option<wgpu::Buffer>,
    time_created: f64,
    time_modified: f64,
}

impl Face {
    /// Build a face centered at a pixel position. `now` is the
    /// millisecond timestamp of creation.
    pub fn new(
        center_x: f32,
        center_y: f32,
        radius: f32,
        velocity: Vec2,
        face_color: PaletteColor,
        feature_color: PaletteColor,
        now: f64,
    ) -> Result<Self, MatrixError> {
        Ok(Self {
            head: Primitive::circle(center_x, center_y, radius, face_color),
            eye_left: Primitive::circle(
                center_x - EYE_OFFSET * radius,
                center_y + EYE_SCALE * radius,
                EYE_SCALE * radius,
                feature_color,
            ),
            eye_right: Primitive::circle(
                center_x + EYE_OFFSET * radius,
                center_y + EYE_SCALE * radius,
                EYE_SCALE * radius,
                feature_color,
            ),
            mouth: Primitive::semicircle(
                center_x,
                center_y,
                MOUTH_SCALE * radius,
                feature_color,
                MOUTH_START_ANGLE,
            ),
            velocity,
            transform: Matrix::identity(3)?,
            transform_buffer: None,
            time_created: now,
            time_modified: now,
        })
    }

    /// The four primitives in draw order: head, left eye, right eye,
    /// mouth. Buffer setup, compute dispatch, and drawing all walk this
    /// same order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        [&self.head, &self.eye_left, &self.eye_right, &self.mouth].into_iter()
    }

    pub fn primitives_mut(&mut self) -> impl Iterator<Item = &mut Primitive> {
        [
            &mut self.head,
            &mut self.eye_left,
            &mut self.eye_right,
            &mut self.mouth,
        ]
        .into_iter()
    }

    pub fn time_created(&self) -> f64 {
        self.time_created
    }

    pub fn time_modified(&self) -> f64 {
        self.time_modified
    }

    /// Advance the transform by velocity times the seconds elapsed since
    /// the last call. Call at most once per frame.
    pub fn translate(&mut self, now: f64) -> Result<(), MatrixError> {
        let elapsed = ((now - self.time_modified) / 1000.0) as f32;
        self.transform
            .translate(&[self.velocity.x * elapsed, self.velocity.y * elapsed])?;
        self.time_modified = now;
        Ok(())
    }

    /// Restart the motion clock without moving the face. Used when
    /// physics resumes after a resize quiescence window so the paused
    /// interval is not replayed as one giant step.
    pub fn rebase_clock(&mut self, now: f64) {
        self.time_modified = now;
    }
}
