//! # GUI Rendering
//!
//! One screen: a header with the connection state, the ledger view and a
//! status bar. Ctrl+D toggles the debug overlay.

pub mod debug_overlay;
pub mod screens;
pub mod theme;
pub mod widgets;


use crate::app::App;
use theme::Theme;

/// Main render function - called every frame by egui
pub fn render(ctx: &egui::Context, app: &mut App) {
    if ctx.input(|i| i.key_pressed(egui::Key::D) && i.modifiers.ctrl) {
        app.state.debug_overlay_visible = !app.state.debug_overlay_visible;
    }

    let theme = Theme::default();

    egui::TopBottomPanel::top("header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.colored_label(theme.selected, egui::RichText::new("LEDGER TERMINAL").strong());
            ui.separator();
            let connection = app.state.connection.state();
            ui.colored_label(
                widgets::status_bar::connection_color(connection, &theme),
                connection.label(),
            );
            ui.colored_label(theme.dim, format!("cluster {}", app.config().cluster_id));
        });
    });

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        widgets::render_status_bar(ui, app);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        screens::ledger::render(ui, app);
    });

    if app.state.debug_overlay_visible {
        debug_overlay::render_debug_overlay(ctx, app);
    }
}
