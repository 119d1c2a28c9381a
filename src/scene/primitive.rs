//! Circle and semicircle primitives with their GPU buffer handles

use crate::consts::VERTEX_STRIDE;
use crate::math::Vector;
use crate::strip_float_count;

/// Which compute kernel tessellates a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Full circle
    Circle,
    /// Half arc spanning 180 degrees counterclockwise from the start
    /// angle (degrees)
    SemiCircle { start_angle: f32 },
}

/// Named entry in the shared context palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteColor {
    AntiFlashWhite,
    Moonstone,
    PaynesGray,
    Vanilla,
}

/// A circular shape plus the buffers that carry it through the compute
/// and render pipelines.
///
/// Center, radius, and the props blob are frozen at construction. The
/// buffer and bind-group handles start unbound; the compute orchestrator
/// and the renderer populate them.
#[derive(Debug)]
pub struct Primitive {
    pub center: Vector,
    pub radius: f32,
    pub color: PaletteColor,
    pub shape: Shape,
    props: Vec<f32>,
    vertices: Vec<f32>,
    pub props_buffer: Option<wgpu::Buffer>,
    pub vertex_buffer: Option<wgpu::Buffer>,
    pub compute_bind_group: Option<wgpu::BindGroup>,
    pub render_bind_group: Option<wgpu::BindGroup>,
}

impl Primitive {
    /// Full circle at a pixel position
    pub fn circle(center_x: f32, center_y: f32, radius: f32, color: PaletteColor) -> Self {
        Self::with_shape(center_x, center_y, radius, color, Shape::Circle)
    }

    /// Half circle starting counterclockwise from `start_angle` degrees
    pub fn semicircle(
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: PaletteColor,
        start_angle: f32,
    ) -> Self {
        Self::with_shape(
            center_x,
            center_y,
            radius,
            color,
            Shape::SemiCircle { start_angle },
        )
    }

    fn with_shape(
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: PaletteColor,
        shape: Shape,
    ) -> Self {
        let center = Vector::vec2(center_x, center_y);
        let mut props = vec![center.x(), center.y(), radius];
        if let Shape::SemiCircle { start_angle } = shape {
            props.push(start_angle);
        }
        Self {
            center,
            radius,
            color,
            shape,
            props,
            vertices: vec![0.0; strip_float_count()],
            props_buffer: None,
            vertex_buffer: None,
            compute_bind_group: None,
            render_bind_group: None,
        }
    }

    /// Compute kernel input: `[cx, cy, r]`, plus the start angle for
    /// semicircles
    pub fn props(&self) -> &[f32] {
        &self.props
    }

    /// Zero-initialized triangle-strip vertex array the compute output
    /// buffer is sized from
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Byte length of the vertex array
    pub fn vertex_byte_len(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }

    /// Vertices drawn for this primitive: byte length over stride
    pub fn vertex_count(&self) -> u32 {
        self.vertex_byte_len() as u32 / VERTEX_STRIDE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DIVISIONS, FLOATS_PER_POINT, POINTS_PER_DIVISION};

    #[test]
    fn test_circle_props_blob() {
        let circle = Primitive::circle(10.0, 20.0, 5.0, PaletteColor::Vanilla);
        assert_eq!(circle.props(), &[10.0, 20.0, 5.0]);
        assert_eq!(circle.shape, Shape::Circle);
    }

    #[test]
    fn test_semicircle_props_blob_includes_angle() {
        let mouth = Primitive::semicircle(1.0, 2.0, 25.0, PaletteColor::PaynesGray, 180.0);
        assert_eq!(mouth.props(), &[1.0, 2.0, 25.0, 180.0]);
        assert_eq!(
            mouth.shape,
            Shape::SemiCircle {
                start_angle: 180.0
            }
        );
    }

    #[test]
    fn test_vertex_array_size_is_fixed() {
        for radius in [1.0, 100.0, 10_000.0] {
            let circle = Primitive::circle(0.0, 0.0, radius, PaletteColor::Moonstone);
            assert_eq!(
                circle.vertices().len(),
                (FLOATS_PER_POINT * POINTS_PER_DIVISION * DIVISIONS) as usize
            );
            assert_eq!(circle.vertices().len(), 512);
            assert!(circle.vertices().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_vertex_count_from_stride() {
        let circle = Primitive::circle(0.0, 0.0, 50.0, PaletteColor::Moonstone);
        assert_eq!(circle.vertex_byte_len(), 2048);
        assert_eq!(circle.vertex_count(), 256);
    }

    #[test]
    fn test_buffers_start_unbound() {
        let circle = Primitive::circle(0.0, 0.0, 50.0, PaletteColor::Vanilla);
        assert!(circle.props_buffer.is_none());
        assert!(circle.vertex_buffer.is_none());
        assert!(circle.compute_bind_group.is_none());
        assert!(circle.render_bind_group.is_none());
    }
}
