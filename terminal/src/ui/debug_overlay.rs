//! In-UI debug overlay (toggle with Ctrl+D)


use crate::app::App;
use crate::debug::{pending_event_count, recent_events, total_event_count};
use crate::ui::theme::Theme;

/// Render debug overlay as an egui window
pub fn render_debug_overlay(ctx: &egui::Context, app: &App) {
    let theme = Theme::default();
    let bridge = app.bridge();

    egui::Window::new("Debug Monitor")
        .collapsible(true)
        .resizable(true)
        .default_size([360.0, 480.0])
        .show(ctx, |ui| {
            ui.heading("Requests");
            let sequencer = &bridge.sequencer;
            ui.label(format!("Sequence:        {}", sequencer.current()));
            ui.label(format!("Last completed:  {}", sequencer.last_completed()));
            if sequencer.outstanding() {
                ui.colored_label(theme.warning, "Request outstanding");
            } else {
                ui.label(format!("Gap remaining:   {} ms", sequencer.remaining_gap().as_millis()));
            }
            ui.label(format!("Operation:       {}", app.state.operation.active().label()));

            let pool = bridge.pool.stats();
            let pool_color = if pool.available == 0 { theme.error } else { theme.normal };
            ui.colored_label(
                pool_color,
                format!("Pool:            {} in use / {} free", pool.in_use, pool.available),
            );

            ui.separator();

            ui.heading("Events");
            ui.label(format!("Total: {}", total_event_count()));
            let pending = pending_event_count();
            if pending > 0 {
                ui.colored_label(theme.warning, format!("Pending: {}", pending));
            } else {
                ui.label("Pending: 0");
            }
            ui.label(format!("Deferred commands: {}", app.pending_commands()));

            ui.separator();

            ui.heading("Recent Events (Last 20)");
            egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                for event in recent_events(20) {
                    let latency = event
                        .received_at
                        .map(|received| format!("{:.1}ms", received.duration_since(event.sent_at).as_secs_f64() * 1000.0))
                        .unwrap_or_else(|| "pending".to_string());
                    let color = if event.is_received() { theme.dim } else { theme.warning };
                    ui.colored_label(
                        color,
                        format!(
                            "#{} {} [{}] {}",
                            event.event_id,
                            event.event_type,
                            event.thread.as_deref().unwrap_or("?"),
                            latency
                        ),
                    );
                }
            });
        });
}
