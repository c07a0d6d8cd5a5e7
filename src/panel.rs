//! On-screen panel for editing a [`RenderConfig`].

use crate::config::{
    CellCenterView, EdgeCenterView, FaceCenterView, NodeView, RenderConfig, RenderToggle,
};

/// Draw controls for every flag, selector and scalar. Returns true if
/// anything changed.
pub fn render_config_panel(ui: &mut egui::Ui, config: &mut RenderConfig) -> bool {
    let mut changed = false;

    ui.heading("Render");

    for toggle in RenderToggle::ALL {
        let mut enabled = config.is_enabled(toggle);
        if ui.checkbox(&mut enabled, toggle.label()).changed() {
            config.set(toggle, enabled);
            changed = true;
        }
    }

    ui.separator();
    ui.heading("Grid Nodes");

    changed |= selector(ui, "Nodes", &mut config.node_view, NodeView::ALL, NodeView::label);
    changed |= selector(
        ui,
        "Face Centers",
        &mut config.face_center_view,
        FaceCenterView::ALL,
        FaceCenterView::label,
    );
    changed |= selector(
        ui,
        "Edge Centers",
        &mut config.edge_center_view,
        EdgeCenterView::ALL,
        EdgeCenterView::label,
    );
    changed |= selector(
        ui,
        "Cell Centers",
        &mut config.cell_center_view,
        CellCenterView::ALL,
        CellCenterView::label,
    );

    ui.separator();

    changed |= ui
        .add(
            egui::Slider::new(&mut config.velocity_scale, 0.1..=100.0)
                .text("Velocity Scale")
                .logarithmic(true),
        )
        .on_hover_text("Velocity vectors span velocity * dt * scale")
        .changed();

    changed |= ui
        .add(
            egui::Slider::new(&mut config.deformation_gradient_length, 0.0..=0.2)
                .text("Deformation Axes")
                .fixed_decimals(3),
        )
        .on_hover_text("Axis length; 0 hides the overlay")
        .changed();

    changed
}

fn selector<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut T,
    options: &[T],
    name: fn(&T) -> &'static str,
) -> bool {
    let before = *value;
    egui::ComboBox::from_label(label)
        .selected_text(name(value))
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, *option, name(option));
            }
        });
    *value != before
}
