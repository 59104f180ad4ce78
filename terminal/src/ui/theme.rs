//! # Theme
//!
//! Terminal-style dark palette: black panels, red accents, green/red for
//! balances and outcomes.

use egui::{Color32, Context, Stroke, Visuals};

/// Base colors of the palette
#[derive(Debug, Clone)]
pub struct LedgerColors {
    pub background: Color32,
    pub text: Color32,
    pub accent: Color32,
    pub gray_secondary: Color32,
    pub gray_inactive: Color32,
    pub border_dark: Color32,
    pub green_success: Color32,
    pub red_error: Color32,
    pub yellow_warning: Color32,
    pub blue_info: Color32,
}

impl Default for LedgerColors {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0, 0, 0),
            text: Color32::from_rgb(230, 230, 230),
            accent: Color32::from_rgb(204, 0, 0),
            gray_secondary: Color32::from_rgb(128, 128, 128),
            gray_inactive: Color32::from_rgb(20, 20, 20),
            border_dark: Color32::from_rgb(51, 51, 51),
            green_success: Color32::from_rgb(0, 200, 83),
            red_error: Color32::from_rgb(255, 68, 68),
            yellow_warning: Color32::from_rgb(255, 193, 7),
            blue_info: Color32::from_rgb(66, 165, 245),
        }
    }
}

/// Semantic colors used by screens and widgets
pub struct Theme {
    pub colors: LedgerColors,
    pub normal: Color32,
    /// Headers and highlighted items
    pub selected: Color32,
    pub border: Color32,
    pub dim: Color32,
    pub success: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub info: Color32,
    pub background: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        let colors = LedgerColors::default();
        Theme {
            normal: colors.text,
            selected: colors.accent,
            border: colors.border_dark,
            dim: colors.gray_secondary,
            success: colors.green_success,
            error: colors.red_error,
            warning: colors.yellow_warning,
            info: colors.blue_info,
            background: colors.background,
            colors,
        }
    }
}

impl Theme {
    /// Green for credit balances, red for debit balances.
    pub fn balance_color(&self, balance: i128) -> Color32 {
        match balance.signum() {
            1 => self.success,
            -1 => self.error,
            _ => self.dim,
        }
    }

    pub fn ledger_visuals() -> Visuals {
        let colors = LedgerColors::default();
        let mut visuals = Visuals::dark();

        visuals.override_text_color = Some(colors.text);
        visuals.faint_bg_color = Color32::from_rgb(12, 12, 12);
        visuals.extreme_bg_color = colors.background;
        visuals.panel_fill = colors.background;
        visuals.window_fill = colors.background;
        visuals.window_stroke = Stroke::new(1.0, colors.border_dark);

        visuals.widgets.noninteractive.bg_fill = colors.gray_inactive;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, colors.border_dark);
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, colors.text);

        visuals.widgets.inactive.bg_fill = colors.gray_inactive;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, colors.border_dark);
        visuals.widgets.inactive.weak_bg_fill = Color32::from_rgb(30, 30, 30);

        visuals.widgets.hovered.bg_fill = Color32::from_rgb(51, 0, 0);
        visuals.widgets.hovered.bg_stroke = Stroke::new(2.0, colors.accent);
        visuals.widgets.hovered.weak_bg_fill = Color32::from_rgb(40, 0, 0);

        visuals.widgets.active.bg_fill = Color32::from_rgb(102, 0, 0);
        visuals.widgets.active.bg_stroke = Stroke::new(2.0, colors.accent);
        visuals.widgets.active.weak_bg_fill = Color32::from_rgb(76, 0, 0);

        visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(204, 0, 0, 76);
        visuals.selection.stroke = Stroke::new(2.0, colors.accent);
        visuals.hyperlink_color = colors.blue_info;

        visuals
    }

    pub fn apply(ctx: &Context) {
        ctx.set_visuals(Self::ledger_visuals());
        tracing::debug!("Ledger theme applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_color_follows_sign() {
        let theme = Theme::default();
        assert_eq!(theme.balance_color(10), theme.success);
        assert_eq!(theme.balance_color(-10), theme.error);
        assert_eq!(theme.balance_color(0), theme.dim);
    }
}
