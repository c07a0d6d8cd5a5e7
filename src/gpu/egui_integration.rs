//! Egui overlay for the viewer.
//!
//! Only compiled with the `egui` feature. The viewer builds the UI with
//! [`EguiIntegration::run`] before rendering, then hands the integration to
//! [`GpuState::render`](super::GpuState::render) as an [`Overlay`].

use std::sync::Arc;
use winit::window::Window;

use super::Overlay;

/// Egui integration state.
///
/// Wraps egui context, winit state, and wgpu renderer.
pub struct EguiIntegration {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    frame: Option<EguiFrameOutput>,
    size_in_pixels: [u32; 2],
}

/// Output from egui frame processing.
struct EguiFrameOutput {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl EguiFrameOutput {
    /// Fold a newer frame in: its shapes replace ours, texture deltas queue up.
    fn absorb(&mut self, newer: EguiFrameOutput) {
        self.textures_delta.append(newer.textures_delta);
        self.paint_jobs = newer.paint_jobs;
        self.pixels_per_point = newer.pixels_per_point;
    }
}

impl EguiIntegration {
    /// Create new egui integration.
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        window: &Arc<Window>,
    ) -> Self {
        let ctx = egui::Context::default();

        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(
            device,
            output_format,
            None,  // depth format
            1,     // msaa samples
            false, // dithering
        );

        Self {
            ctx,
            state,
            renderer,
            frame: None,
            size_in_pixels: [1, 1],
        }
    }

    /// Process a winit event.
    ///
    /// Returns true if egui consumed the event (don't pass to camera controls).
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Build this frame's UI. The result is drawn by the next render.
    pub fn run(&mut self, window: &Window, ui: impl FnMut(&egui::Context)) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, ui);

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let frame = EguiFrameOutput {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        };
        // A frame still here was never presented; its texture updates must survive.
        self.frame = Some(match self.frame.take() {
            Some(mut pending) => {
                pending.absorb(frame);
                pending
            }
            None => frame,
        });
    }

    fn screen_descriptor(&self, pixels_per_point: f32) -> egui_wgpu::ScreenDescriptor {
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: self.size_in_pixels,
            pixels_per_point,
        }
    }
}

impl Overlay for EguiIntegration {
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        size_in_pixels: [u32; 2],
    ) {
        self.size_in_pixels = size_in_pixels;
        let Some(frame) = &self.frame else {
            return;
        };
        let screen = self.screen_descriptor(frame.pixels_per_point);

        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &frame.paint_jobs, &screen);
    }

    fn paint(&self, pass: &mut wgpu::RenderPass<'static>) {
        if let Some(frame) = &self.frame {
            let screen = self.screen_descriptor(frame.pixels_per_point);
            self.renderer.render(pass, &frame.paint_jobs, &screen);
        }
    }

    fn finish(&mut self) {
        if let Some(frame) = self.frame.take() {
            for id in &frame.textures_delta.free {
                self.renderer.free_texture(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(set: &[u64], free: &[u64], pixels_per_point: f32) -> EguiFrameOutput {
        let image = egui::ColorImage::new([1, 1], egui::Color32::WHITE);
        EguiFrameOutput {
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta {
                set: set
                    .iter()
                    .map(|&id| {
                        (
                            egui::TextureId::Managed(id),
                            egui::epaint::ImageDelta::full(image.clone(), Default::default()),
                        )
                    })
                    .collect(),
                free: free.iter().map(|&id| egui::TextureId::Managed(id)).collect(),
            },
            pixels_per_point,
        }
    }

    #[test]
    fn test_unpresented_texture_updates_are_kept() {
        // Font atlas upload followed by a frame whose surface was lost.
        let mut pending = frame(&[0], &[], 1.0);
        pending.absorb(frame(&[1], &[7], 2.0));

        let set: Vec<_> = pending.textures_delta.set.iter().map(|(id, _)| *id).collect();
        assert_eq!(set, vec![egui::TextureId::Managed(0), egui::TextureId::Managed(1)]);
        assert_eq!(pending.textures_delta.free, vec![egui::TextureId::Managed(7)]);
        assert_eq!(pending.pixels_per_point, 2.0);
    }
}
