//! Interactive window around a [`FrameRenderer`].
//!
//! # Usage
//!
//! ```ignore
//! use wetcloth_viz::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     Viewer::new(demo::wet_cloth(24))
//!         .with_title("wet cloth")
//!         .with_update(demo::advance)
//!         .run()
//! }
//! ```
//!
//! # Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | P / V / G | fluid particles / vertices / quadrature points |
//! | C / Y | cloth faces / fibers |
//! | L / S / H / B | level sets / springs / cohesion / buckets |
//! | 1 / 2 / 3 | vertex / quadrature / fluid velocities |
//! | N / F / E / X | cycle node / face / edge / cell views |
//! | D | deformation-gradient axes |
//! | = / - | scale velocity vectors |
//! | Space | pause |
//!
//! Left-drag orbits, the wheel zooms.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::{RenderConfig, RenderToggle};
use crate::draw::DrawList;
use crate::error::ViewerError;
use crate::gpu::{Camera, GpuState};
use crate::palette::RenderPalette;
use crate::renderer::FrameRenderer;
use crate::scene::SceneView;

/// Axis length `D` restores when no earlier length was set.
pub const DEFAULT_DEFORMATION_AXIS_LENGTH: f32 = 0.05;
const VELOCITY_SCALE_STEP: f32 = 1.25;

type UpdateFn<S> = Box<dyn FnMut(&mut S, f32)>;

/// A viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
pub struct Viewer<S: SceneView> {
    scene: S,
    title: String,
    size: (u32, u32),
    config: RenderConfig,
    palette: RenderPalette,
    time_step: f32,
    update: Option<UpdateFn<S>>,
}

impl<S: SceneView + 'static> Viewer<S> {
    pub fn new(scene: S) -> Self {
        Self {
            scene,
            title: "wetcloth-viz".to_string(),
            size: (1280, 720),
            config: RenderConfig::default(),
            palette: RenderPalette::default(),
            time_step: 1.0 / 60.0,
            update: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_palette(mut self, palette: RenderPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Simulation time advanced per frame. Also the `dt` velocity vectors are
    /// scaled by.
    pub fn with_time_step(mut self, dt: f32) -> Self {
        self.time_step = dt;
        self
    }

    /// Called every unpaused frame with the scene and the new scene time.
    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnMut(&mut S, f32) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        let renderer =
            FrameRenderer::with_palette(&self.scene, self.palette).with_config(self.config);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            scene: self.scene,
            renderer,
            update: self.update,
            time_step: self.time_step,
            time: 0.0,
            controls: ViewControls::default(),
            title: self.title,
            size: self.size,
            window: None,
            gpu_state: None,
            #[cfg(feature = "egui")]
            egui: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        };

        log::info!("starting viewer");
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Keyboard state that lives outside [`RenderConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewControls {
    /// Scene updates are suspended.
    pub paused: bool,
    /// Axis length `D` switches back to.
    pub deformation_length: f32,
}

impl Default for ViewControls {
    fn default() -> Self {
        Self {
            paused: false,
            deformation_length: DEFAULT_DEFORMATION_AXIS_LENGTH,
        }
    }
}

impl ViewControls {
    /// Apply one key press. Returns true if the key was bound.
    pub fn handle_key(&mut self, config: &mut RenderConfig, key: char) -> bool {
        let toggle = match key.to_ascii_lowercase() {
            'p' => Some(RenderToggle::Particles),
            'v' => Some(RenderToggle::Vertices),
            'g' => Some(RenderToggle::QuadraturePoints),
            'c' => Some(RenderToggle::Cloth),
            'y' => Some(RenderToggle::Fibers),
            'l' => Some(RenderToggle::LevelSet),
            's' => Some(RenderToggle::Springs),
            'h' => Some(RenderToggle::Cohesion),
            'b' => Some(RenderToggle::Buckets),
            '1' => Some(RenderToggle::VertexVelocity),
            '2' => Some(RenderToggle::QuadratureVelocity),
            '3' => Some(RenderToggle::FluidVelocity),
            _ => None,
        };
        if let Some(toggle) = toggle {
            let on = config.toggle(toggle);
            log::debug!("{}: {}", toggle.label(), if on { "on" } else { "off" });
            return true;
        }

        match key.to_ascii_lowercase() {
            'n' => {
                config.node_view = config.node_view.next();
                log::debug!("node view: {}", config.node_view.label());
            }
            'f' => {
                config.face_center_view = config.face_center_view.next();
                log::debug!("face-center view: {}", config.face_center_view.label());
            }
            'e' => {
                config.edge_center_view = config.edge_center_view.next();
                log::debug!("edge-center view: {}", config.edge_center_view.label());
            }
            'x' => {
                config.cell_center_view = config.cell_center_view.next();
                log::debug!("cell-center view: {}", config.cell_center_view.label());
            }
            'd' => {
                if config.deformation_gradient_visible() {
                    self.deformation_length = config.deformation_gradient_length;
                    config.deformation_gradient_length = 0.0;
                } else {
                    config.deformation_gradient_length = self.deformation_length;
                }
                log::debug!("deformation axes: {}", config.deformation_gradient_length);
            }
            '=' | '+' => {
                config.velocity_scale *= VELOCITY_SCALE_STEP;
                log::debug!("velocity scale: {}", config.velocity_scale);
            }
            '-' => {
                config.velocity_scale /= VELOCITY_SCALE_STEP;
                log::debug!("velocity scale: {}", config.velocity_scale);
            }
            ' ' => {
                self.paused = !self.paused;
                log::debug!("{}", if self.paused { "paused" } else { "resumed" });
            }
            _ => return false,
        }
        true
    }
}

fn key_char(key: &Key) -> Option<char> {
    match key {
        Key::Character(s) => s.chars().next(),
        Key::Named(NamedKey::Space) => Some(' '),
        _ => None,
    }
}

struct App<S: SceneView> {
    scene: S,
    renderer: FrameRenderer,
    update: Option<UpdateFn<S>>,
    time_step: f32,
    time: f32,
    controls: ViewControls,
    title: String,
    size: (u32, u32),
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    #[cfg(feature = "egui")]
    egui: Option<crate::gpu::EguiIntegration>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl<S: SceneView> App<S> {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.size.0, self.size.1));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let camera = Camera::framing(&self.scene.bucket_grid());
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), camera))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(crate::gpu::EguiIntegration::new(
                &gpu_state.device,
                gpu_state.config.format,
                &window,
            ));
        }

        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn step(&mut self) {
        if self.controls.paused {
            return;
        }
        if let Some(update) = &mut self.update {
            self.time += self.time_step;
            update(&mut self.scene, self.time);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.step();

        #[cfg(feature = "egui")]
        let list = {
            let (egui, window) = (&mut self.egui, &self.window);
            build_frame(&mut self.renderer, &self.scene, self.time_step, |config| {
                if let (Some(egui), Some(window)) = (egui.as_mut(), window) {
                    egui.run(window, |ctx| {
                        egui::Window::new("Render").show(ctx, |ui| {
                            crate::panel::render_config_panel(ui, config);
                        });
                    });
                }
            })
        };
        #[cfg(feature = "egui")]
        let overlay = self.egui.as_mut().map(|egui| egui as &mut dyn crate::gpu::Overlay);

        #[cfg(not(feature = "egui"))]
        let list = build_frame(&mut self.renderer, &self.scene, self.time_step, |_| {});
        #[cfg(not(feature = "egui"))]
        let overlay: Option<&mut dyn crate::gpu::Overlay> = None;

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        match gpu_state.render(&list, overlay) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("out of GPU memory");
                event_loop.exit();
            }
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

/// Apply this redraw's settings edits, then build the frame from them.
fn build_frame<S: SceneView + ?Sized>(
    renderer: &mut FrameRenderer,
    scene: &S,
    dt: f32,
    edit: impl FnOnce(&mut RenderConfig),
) -> DrawList {
    edit(renderer.config_mut());
    renderer.render_frame(scene, dt)
}

impl<S: SceneView> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                log::error!("{err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            if egui.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(c) = key_char(&event.logical_key) {
                        self.controls.handle_key(self.renderer.config_mut(), c);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(dx, dy);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CellCenterView, FaceCenterView, NodeView};
    use crate::draw::Category;

    #[test]
    fn test_letter_keys_toggle_flags() {
        let mut controls = ViewControls::default();
        let mut config = RenderConfig::default();
        let before = config.render_cloth;
        assert!(controls.handle_key(&mut config, 'c'));
        assert_eq!(config.render_cloth, !before);
        assert!(controls.handle_key(&mut config, 'C'));
        assert_eq!(config.render_cloth, before);

        assert!(controls.handle_key(&mut config, '3'));
        assert!(config.render_fluid_velocity);
        assert!(controls.handle_key(&mut config, 'b'));
        assert!(config.render_buckets);
    }

    #[test]
    fn test_view_keys_cycle() {
        let mut controls = ViewControls::default();
        let mut config = RenderConfig::default();
        controls.handle_key(&mut config, 'n');
        assert_eq!(config.node_view, NodeView::Constant);
        controls.handle_key(&mut config, 'n');
        assert_eq!(config.node_view, NodeView::SolidPhi);
        controls.handle_key(&mut config, 'n');
        assert_eq!(config.node_view, NodeView::None);

        for _ in 0..FaceCenterView::ALL.len() {
            controls.handle_key(&mut config, 'f');
        }
        assert_eq!(config.face_center_view, FaceCenterView::None);

        controls.handle_key(&mut config, 'x');
        controls.handle_key(&mut config, 'x');
        assert_eq!(config.cell_center_view, CellCenterView::LiquidPhi);
    }

    #[test]
    fn test_deformation_toggle_restores_length() {
        let mut controls = ViewControls::default();
        let mut config = RenderConfig::default();
        controls.handle_key(&mut config, 'd');
        assert_eq!(config.deformation_gradient_length, DEFAULT_DEFORMATION_AXIS_LENGTH);

        config.deformation_gradient_length = 0.2;
        controls.handle_key(&mut config, 'd');
        assert!(!config.deformation_gradient_visible());
        controls.handle_key(&mut config, 'd');
        assert_eq!(config.deformation_gradient_length, 0.2);
    }

    #[test]
    fn test_velocity_scale_and_pause() {
        let mut controls = ViewControls::default();
        let mut config = RenderConfig::default();
        controls.handle_key(&mut config, '=');
        assert!(config.velocity_scale > 10.0);
        controls.handle_key(&mut config, '-');
        assert!((config.velocity_scale - 10.0).abs() < 1e-4);

        controls.handle_key(&mut config, ' ');
        assert!(controls.paused);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut controls = ViewControls::default();
        let mut config = RenderConfig::default();
        assert!(!controls.handle_key(&mut config, 'q'));
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_settings_edit_reaches_same_frame() {
        let scene = crate::demo::wet_cloth(4);
        let mut renderer = FrameRenderer::new(&scene);
        assert!(renderer.config().render_cloth);

        let list = build_frame(&mut renderer, &scene, 0.01, |config| {
            config.render_cloth = false;
            config.render_buckets = true;
        });
        assert_eq!(list.primitive_count(Category::ClothFaces), 0);
        assert!(list.primitive_count(Category::Buckets) > 0);
        assert!(!renderer.config().render_cloth);
    }

    #[test]
    fn test_key_char_mapping() {
        assert_eq!(key_char(&Key::Named(NamedKey::Space)), Some(' '));
        assert_eq!(key_char(&Key::Character("p".into())), Some('p'));
        assert_eq!(key_char(&Key::Named(NamedKey::Escape)), None);
    }
}
