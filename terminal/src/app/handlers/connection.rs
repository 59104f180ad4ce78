//! # Connection Handlers

use std::sync::Arc;

use crate::app::App;
use crate::core::error::Result;

/// Open the client. A no-op unless disconnected.
pub fn connect(app: &mut App) -> Result<()> {
    let bridge = Arc::clone(app.bridge());
    app.state.operation.clear_error();
    app.state.connection.connect(&app.config, bridge)?;
    Ok(())
}

/// Close the client and forget everything it produced. Safe to call repeatedly.
pub fn disconnect(app: &mut App) {
    let bridge = Arc::clone(app.bridge());

    // Anything still in flight is finished as far as the UI is concerned.
    bridge.sequencer.retire(bridge.sequencer.current());
    let changed = app.state.connection.disconnect();

    app.state.operation.reset();
    app.state.clear_entities();
    app.state.transfer_form.clear();
    bridge.mailbox.clear();
    bridge.staging.clear();

    if changed {
        tracing::info!(pool = ?bridge.pool.stats(), "Disconnected from ledger");
    }
}
