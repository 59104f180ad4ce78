use std::sync::Arc;

use eframe::egui;

use ledger_terminal::core::LedgerConfig;
use ledger_terminal::services::ledger::ClientDriver;
use ledger_terminal::ui::theme::Theme;
use ledger_terminal::{debug, ui, App};

struct LedgerTerminal {
    app: App,
}

impl eframe::App for LedgerTerminal {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.app.on_tick();
        ui::render(ctx, &mut self.app);
    }
}

impl Drop for LedgerTerminal {
    fn drop(&mut self) {
        self.app.command(ledger_terminal::Command::Disconnect);
        debug::log_event_stats();
        tracing::info!("Ledger terminal shut down");
    }
}

#[cfg(feature = "native-client")]
fn driver() -> Arc<dyn ClientDriver> {
    Arc::new(ledger_terminal::services::ledger::NativeDriver)
}

#[cfg(not(feature = "native-client"))]
fn driver() -> Arc<dyn ClientDriver> {
    Arc::new(ledger_terminal::services::ledger::SimulatedLedger::new())
}

fn main() -> eframe::Result<()> {
    debug::init();

    let config = LedgerConfig::load();
    let driver = driver();
    tracing::info!(
        driver = driver.name(),
        debug_mode = debug::is_debug_mode(),
        "Starting ledger terminal"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ledger Terminal")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ledger Terminal",
        options,
        Box::new(move |cc| {
            Theme::apply(&cc.egui_ctx);
            let app = App::new(config, driver);
            let ctx = cc.egui_ctx.clone();
            app.set_repaint_hook(move || ctx.request_repaint());
            Ok(Box::new(LedgerTerminal { app }))
        }),
    )
}
