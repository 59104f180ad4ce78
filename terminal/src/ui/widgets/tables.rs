//! # Table Components
//!
//! Grid helpers shared by the account and transfer listings

use crate::ui::theme::Theme;

pub struct TableConfig {
    pub num_columns: usize,
    pub spacing: [f32; 2],
    pub striped: bool,
    /// Maximum height of the scroll area; `None` renders without scrolling.
    pub max_height: Option<f32>,
}

impl TableConfig {
    pub fn columns(num_columns: usize) -> Self {
        Self {
            num_columns,
            ..Self::default()
        }
    }

    pub fn scrollable(mut self, max_height: f32) -> Self {
        self.max_height = Some(max_height);
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_columns: 4,
            spacing: [14.0, 4.0],
            striped: true,
            max_height: None,
        }
    }
}

/// Render a grid with a colored header row; rows come from the callback.
pub fn render_table<F>(
    ui: &mut egui::Ui,
    id: &str,
    config: TableConfig,
    headers: &[&str],
    theme: &Theme,
    render_rows: F,
) where
    F: FnOnce(&mut egui::Ui),
{
    let table_render = |ui: &mut egui::Ui| {
        egui::Grid::new(id)
            .num_columns(config.num_columns)
            .spacing(config.spacing)
            .striped(config.striped)
            .show(ui, |ui| {
                for header in headers {
                    ui.colored_label(theme.selected, *header);
                }
                ui.end_row();

                render_rows(ui);
            });
    };

    match config.max_height {
        Some(max_height) => {
            egui::ScrollArea::vertical()
                .id_salt(id)
                .max_height(max_height)
                .show(ui, table_render);
        }
        None => table_render(ui),
    }
}

pub fn render_empty_state(
    ui: &mut egui::Ui,
    primary_text: &str,
    secondary_text: Option<&str>,
    theme: &Theme,
) {
    ui.vertical_centered(|ui| {
        ui.add_space(12.0);
        ui.colored_label(theme.dim, primary_text);
        if let Some(secondary) = secondary_text {
            ui.add_space(6.0);
            ui.colored_label(theme.dim, secondary);
        }
    });
}

/// "Accounts: 3  |  Transfers: 12"
pub fn stats_summary(stats: &[(&str, usize)]) -> String {
    stats
        .iter()
        .map(|(label, count)| format!("{}: {}", label, count))
        .collect::<Vec<_>>()
        .join("  |  ")
}
