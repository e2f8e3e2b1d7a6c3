//! Debug panel for live material tweaks.

use crate::config::PanelConfig;
use crate::material::{Color, Material, TweakRange, IOR_RANGE, THICKNESS_RANGE, TRANSMISSION_RANGE};

/// Values shown on the stats line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStats {
    pub fps: f32,
    /// Duration of the last frame in milliseconds.
    pub frame_ms: f32,
    pub instances: usize,
}

/// Draw the panel. Returns `true` if any material was edited.
pub fn show(
    ctx: &egui::Context,
    config: &PanelConfig,
    raindrop: &mut Material,
    text: Option<&mut Material>,
    stats: PanelStats,
) -> bool {
    let mut changed = false;

    egui::Window::new(config.title.as_str())
        .default_width(config.width)
        .collapsible(true)
        .default_open(!config.start_closed)
        .show(ctx, |ui| {
            egui::CollapsingHeader::new(config.raindrop_folder.as_str())
                .default_open(!config.folders_closed)
                .show(ui, |ui| {
                    changed |= material_controls(ui, raindrop, config.wireframe_toggle);
                });

            if let Some(text) = text {
                egui::CollapsingHeader::new(config.text_folder.as_str())
                    .default_open(!config.folders_closed)
                    .show(ui, |ui| {
                        changed |= material_controls(ui, text, false);
                    });
            }

            ui.separator();
            ui.label(format!(
                "{:.0} fps ({:.1} ms)  |  {} drops",
                stats.fps, stats.frame_ms, stats.instances
            ));
        });

    changed
}

fn material_controls(ui: &mut egui::Ui, material: &mut Material, wireframe_toggle: bool) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label("color");
        let mut rgb = material.color.srgb();
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            material.color = Color::from_srgb(rgb[0], rgb[1], rgb[2]);
            changed = true;
        }
    });

    changed |= tweak_slider(ui, &mut material.transmission, TRANSMISSION_RANGE, "transmission");
    changed |= tweak_slider(ui, &mut material.ior, IOR_RANGE, "ior");
    changed |= tweak_slider(ui, &mut material.thickness, THICKNESS_RANGE, "thickness");

    if wireframe_toggle {
        changed |= ui.checkbox(&mut material.wireframe, "wireframe").changed();
    }

    if changed {
        material.clamp_tweaks();
    }
    changed
}

fn tweak_slider(ui: &mut egui::Ui, value: &mut f32, range: TweakRange, label: &str) -> bool {
    ui.add(
        egui::Slider::new(value, range.min..=range.max)
            .step_by(range.step)
            .text(label),
    )
    .changed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: &PanelConfig, raindrop: &mut Material, mut text: Option<&mut Material>) -> bool {
        let ctx = egui::Context::default();
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed |= show(ctx, config, raindrop, text.as_deref_mut(), PanelStats::default());
        });
        changed
    }

    #[test]
    fn test_panel_without_input_changes_nothing() {
        let config = PanelConfig::default();
        let mut raindrop = Material::water(Color::from_srgb(0xB0, 0xD0, 0xD3), 6.613);
        let before = raindrop;
        let mut text = Material::flat(Color::BLACK);

        assert!(!run(&config, &mut raindrop, Some(&mut text)));
        assert_eq!(raindrop, before);
    }

    #[test]
    fn test_closed_panel_renders() {
        let config = PanelConfig {
            start_closed: true,
            ..PanelConfig::default()
        };
        let mut raindrop = Material::default();
        assert!(!run(&config, &mut raindrop, None));
    }
}
