//! # Form Components

use shared::utils::short_id;

use crate::ui::theme::Theme;
use crate::utils::validation::ValidationResult;

pub fn render_text_input(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut String,
    hint: &str,
    width: f32,
) -> egui::Response {
    ui.label(label);
    ui.add_sized([width, 22.0], egui::TextEdit::singleline(value).hint_text(hint))
}

/// Account picker. `None` is shown as a placeholder until an account is chosen.
pub fn render_account_picker<'a>(
    ui: &mut egui::Ui,
    id: &str,
    label: &str,
    selected: &mut Option<u128>,
    accounts: impl Iterator<Item = &'a u128>,
) {
    ui.label(label);
    let selected_text = selected.map(short_id).unwrap_or_else(|| "select account".to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .width(160.0)
        .show_ui(ui, |ui| {
            for id in accounts {
                ui.selectable_value(selected, Some(*id), short_id(*id));
            }
        });
}

/// Filled button that is greyed out while `enabled` is false.
pub fn render_button(
    ui: &mut egui::Ui,
    text: &str,
    enabled: bool,
    fill_color: Option<egui::Color32>,
) -> egui::Response {
    let mut button = egui::Button::new(text);
    if let Some(color) = fill_color {
        button = button.fill(color);
    }
    ui.add_enabled(enabled, button)
}

/// Inline hint below an input; nothing is drawn for valid input.
pub fn render_validation_hint(ui: &mut egui::Ui, result: &ValidationResult, theme: &Theme) {
    if let Some(error) = &result.error {
        ui.colored_label(theme.warning, error);
    }
}

pub fn render_error_message(ui: &mut egui::Ui, error: &str, theme: &Theme) {
    ui.colored_label(theme.error, format!("Error: {}", error));
}
