//! Shared device context: adapter, device, queue, palette, pixel scale

use std::rc::Rc;

use thiserror::Error;

use crate::math::AlignError;
use crate::scene::{Color, ColorError, PaletteColor};

/// Fatal startup failures; there is no retry path for any of these
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to request a WebGPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request a WebGPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error(transparent)]
    Align(#[from] AlignError),
}

/// The named colors every face is drawn with. Each color's uniform
/// buffer is written once, here, at construction.
#[derive(Debug)]
pub struct Palette {
    pub anti_flash_white: Color,
    pub moonstone: Color,
    pub paynes_gray: Color,
    pub vanilla: Color,
}

impl Palette {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, ContextError> {
        let mut palette = Self {
            anti_flash_white: Color::opaque("#EEEEEE")?,
            moonstone: Color::opaque("#5C9EAD")?,
            paynes_gray: Color::opaque("#326273")?,
            vanilla: Color::opaque("#F5EE9E")?,
        };
        for color in [
            &mut palette.anti_flash_white,
            &mut palette.moonstone,
            &mut palette.paynes_gray,
            &mut palette.vanilla,
        ] {
            color.init_buffer(device, queue)?;
        }
        Ok(palette)
    }

    /// Look a color up by its name tag
    pub fn get(&self, key: PaletteColor) -> &Color {
        match key {
            PaletteColor::AntiFlashWhite => &self.anti_flash_white,
            PaletteColor::Moonstone => &self.moonstone,
            PaletteColor::PaynesGray => &self.paynes_gray,
            PaletteColor::Vanilla => &self.vanilla,
        }
    }
}

/// Process-wide GPU resource holder.
///
/// The entry shell constructs exactly one of these and hands the `Rc`
/// to everything that needs the device; nothing looks it up globally.
#[derive(Debug)]
pub struct Context {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub palette: Palette,
    /// Device pixels per logical pixel
    pub scale: f64,
}

impl Context {
    /// Negotiate an adapter and device and build the shared palette.
    pub async fn create(
        instance: &wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        scale: f64,
    ) -> Result<Rc<Self>, ContextError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("smileys-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let palette = Palette::new(&device, &queue)?;

        Ok(Rc::new(Self {
            adapter,
            device,
            queue,
            palette,
            scale,
        }))
    }
}
