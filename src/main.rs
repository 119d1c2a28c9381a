//! Smileys entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use smileys::Controller;
    use smileys::gpu::{Context, FaceCompute, GpuError, Renderer};
    use smileys::platform;
    use smileys::settings::Settings;

    /// Application instance holding all state
    struct App {
        controller: Controller,
        compute: FaceCompute,
        renderer: Renderer,
        settings: Settings,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            match self.renderer.frame(&mut self.controller, time) {
                Ok(()) => {}
                Err(GpuError::Surface(wgpu::SurfaceError::Lost)) => {
                    self.renderer.reconfigure();
                }
                Err(GpuError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                    log::error!("Out of GPU memory!");
                }
                Err(err) => log::warn!("Render error: {err}"),
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Smileys starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gpu-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Size the backing store to the device pixel grid
        let scale = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(0) as u32;
        let client_h = canvas.client_height().max(0) as u32;
        canvas.set_width((client_w as f64 * scale) as u32);
        canvas.set_height((client_h as f64 * scale) as u32);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let context = match Context::create(&instance, Some(&surface), scale).await {
            Ok(context) => context,
            Err(err) => {
                log::error!("WebGPU initialization failed: {err}");
                return;
            }
        };

        let settings = Settings::load();

        let renderer = match Renderer::new(context.clone(), surface, client_w, client_h, &settings)
        {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("Renderer initialization failed: {err}");
                return;
            }
        };
        let compute = FaceCompute::new(context.clone());

        let app = Rc::new(RefCell::new(App {
            controller: Controller::new(),
            compute,
            renderer,
            settings,
        }));

        setup_input_handlers(&canvas, app.clone());

        request_animation_frame(app);

        log::info!("Smileys running! Click the canvas to spawn a face.");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Click spawns a face at the pointer, in canvas-local logical pixels
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let now = platform::now_ms();
                let x = event.offset_x() as f32;
                let y = event.offset_y() as f32;

                let mut app = app.borrow_mut();
                let App {
                    controller,
                    compute,
                    renderer,
                    settings,
                } = &mut *app;
                if let Err(err) = controller.handle_click(compute, renderer, x, y, settings, now) {
                    log::warn!("Failed to spawn face: {err}");
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window resize resizes the backing store and notifies the renderer
        {
            let canvas = canvas.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let now = platform::now_ms();
                let scale = web_sys::window()
                    .map(|w| w.device_pixel_ratio())
                    .unwrap_or(1.0);
                let client_w = canvas.client_width().max(0) as u32;
                let client_h = canvas.client_height().max(0) as u32;
                canvas.set_width((client_w as f64 * scale) as u32);
                canvas.set_height((client_h as f64 * scale) as u32);

                let mut app = app.borrow_mut();
                let App {
                    controller,
                    renderer,
                    ..
                } = &mut *app;
                controller.handle_resize(renderer, client_w, client_h, now);
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Smileys (native) starting...");
    log::info!("Rendering requires a browser canvas - run with `trunk serve` for the web version");

    println!("\nRunning transform self-check...");
    check_face_motion();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn check_face_motion() {
    use glam::Vec2;
    use smileys::scene::{Face, PaletteColor};

    let mut face = Face::new(
        320.0,
        240.0,
        100.0,
        Vec2::new(10.0, 10.0),
        PaletteColor::Vanilla,
        PaletteColor::PaynesGray,
        0.0,
    )
    .expect("face construction");
    face.translate(2500.0).expect("translate");

    let data = face.transform.data();
    assert_eq!(&data[8..10], &[25.0, 25.0], "2.5s at (10, 10) px/s");
    println!("✓ Face motion self-check passed!");
}
