//! # Status Bar Widget
//!
//! Bottom bar: connection state, in-flight operation, request pool occupancy
//! and record counts.


use crate::app::{App, ConnectionState};
use crate::ui::theme::Theme;
use crate::ui::widgets::tables::stats_summary;

pub fn connection_color(state: ConnectionState, theme: &Theme) -> egui::Color32 {
    match state {
        ConnectionState::Ready => theme.success,
        ConnectionState::Connecting | ConnectionState::Registering => theme.warning,
        ConnectionState::Disconnected => theme.dim,
    }
}

pub fn render_status_bar(ui: &mut egui::Ui, app: &App) {
    let theme = Theme::default();
    let state = &app.state;
    let connection = state.connection.state();

    ui.horizontal(|ui| {
        ui.colored_label(connection_color(connection, &theme), format!("● {}", connection.label()));
        if let Some(handle) = state.connection.handle() {
            ui.colored_label(theme.dim, format!("{} @ {}", handle.driver_name(), app.config().address));
        }

        ui.separator();

        if state.operation.is_active() {
            ui.spinner();
            ui.colored_label(theme.info, state.operation.active().label());
        } else {
            ui.colored_label(theme.dim, "idle");
        }

        ui.separator();

        let pool = app.bridge().pool.stats();
        let pool_color = if pool.available == 0 { theme.warning } else { theme.normal };
        ui.colored_label(pool_color, format!("Slots: {}/{}", pool.in_use, pool.capacity));

        ui.separator();

        ui.label(stats_summary(&[
            ("Accounts", state.accounts.len()),
            ("Transfers", state.transfers.len()),
        ]));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_color() {
        let theme = Theme::default();
        assert_eq!(connection_color(ConnectionState::Ready, &theme), theme.success);
        assert_eq!(connection_color(ConnectionState::Registering, &theme), theme.warning);
        assert_eq!(connection_color(ConnectionState::Disconnected, &theme), theme.dim);
    }
}
