//! # Screen Modules
//!
//! Screens render from `&App` state and collect user intents as
//! [`Command`](crate::app::Command)s. Commands are run after drawing so no
//! state borrow is held while a handler mutates the app.

pub mod ledger;
