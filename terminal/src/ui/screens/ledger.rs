//! # Ledger Screen
//!
//! Accounts table, transfer form and the transfer history of one account.

use shared::ledger::{Account, Transfer};
use shared::utils::{format_amount, format_signed_amount, format_timestamp, short_id};

use crate::app::{App, Command, ConnectionState};
use crate::ui::theme::Theme;
use crate::ui::widgets::forms::{
    render_account_picker, render_button, render_error_message, render_text_input,
    render_validation_hint,
};
use crate::ui::widgets::{render_empty_state, render_table, TableConfig};
use crate::utils::validation::validate_amount;

pub fn render(ui: &mut egui::Ui, app: &mut App) {
    let theme = Theme::default();
    let mut commands = Vec::new();

    render_toolbar(ui, app, &theme, &mut commands);

    if let Some(error) = app.state.operation.last_error() {
        ui.add_space(4.0);
        render_error_message(ui, error, &theme);
    }

    ui.add_space(8.0);
    ui.separator();

    let idle = app.state.connection.can_submit() && !app.state.operation.is_active();
    let scale = app.config().amount_scale;

    ui.heading("Accounts");
    render_accounts(ui, app.state.accounts.iter(), idle, scale, &theme, &mut commands);

    ui.add_space(8.0);
    ui.separator();
    render_transfer_form(ui, app, idle, scale, &theme, &mut commands);

    ui.add_space(8.0);
    ui.separator();
    render_transfers(ui, app, scale, &theme);

    for command in commands {
        let connecting = command == Command::Connect;
        app.command(command);
        // Load the account list as soon as the client is registered.
        if connecting && app.state.connection.can_submit() {
            app.command(Command::QueryAccounts);
        }
    }
}

fn render_toolbar(ui: &mut egui::Ui, app: &App, theme: &Theme, commands: &mut Vec<Command>) {
    let connection = app.state.connection.state();
    let idle = connection == ConnectionState::Ready && !app.state.operation.is_active();

    ui.horizontal(|ui| {
        if connection == ConnectionState::Disconnected {
            if render_button(ui, "Connect", true, Some(theme.colors.accent)).clicked() {
                commands.push(Command::Connect);
            }
        } else if render_button(ui, "Disconnect", true, None).clicked() {
            commands.push(Command::Disconnect);
        }

        ui.separator();

        if render_button(ui, "Create account", idle, None).clicked() {
            commands.push(Command::CreateAccount);
        }
        if render_button(ui, "Refresh", idle, None).clicked() {
            commands.push(Command::QueryAccounts);
        }
    });
}

fn render_accounts<'a>(
    ui: &mut egui::Ui,
    accounts: impl Iterator<Item = &'a Account>,
    idle: bool,
    scale: u32,
    theme: &Theme,
    commands: &mut Vec<Command>,
) {
    let mut accounts = accounts.peekable();
    if accounts.peek().is_none() {
        render_empty_state(ui, "No accounts", Some("Connect and create an account to begin"), theme);
        return;
    }

    render_table(
        ui,
        "accounts_table",
        TableConfig::columns(7).scrollable(260.0),
        &["Account", "Balance", "Debits", "Credits", "Pending", "Created", ""],
        theme,
        |ui| {
            for account in accounts {
                let balance = account.net_balance();
                ui.monospace(short_id(account.id)).on_hover_text(format!("{:x}", account.id));
                ui.colored_label(theme.balance_color(balance), format_signed_amount(balance, scale));
                ui.label(format_amount(account.debits_posted, scale));
                ui.label(format_amount(account.credits_posted, scale));
                ui.colored_label(
                    theme.dim,
                    format!(
                        "-{} / +{}",
                        format_amount(account.debits_pending, scale),
                        format_amount(account.credits_pending, scale)
                    ),
                );
                ui.colored_label(theme.dim, format_timestamp(account.timestamp));
                ui.horizontal(|ui| {
                    if render_button(ui, "Transfers", idle, None).clicked() {
                        commands.push(Command::GetAccountTransfers { account_id: account.id });
                    }
                    if render_button(ui, "↻", idle, None).on_hover_text("Refresh account").clicked() {
                        commands.push(Command::RefreshAccount { account_id: account.id });
                    }
                });
                ui.end_row();
            }
        },
    );
}

fn render_transfer_form(
    ui: &mut egui::Ui,
    app: &mut App,
    idle: bool,
    scale: u32,
    theme: &Theme,
    commands: &mut Vec<Command>,
) {
    ui.heading("New transfer");

    let state = &mut app.state;
    let ids: Vec<u128> = state.accounts.iter().map(|account| account.id).collect();
    let form = &mut state.transfer_form;

    ui.horizontal(|ui| {
        render_account_picker(ui, "debit_account", "From", &mut form.debit_account_id, ids.iter());
        render_account_picker(ui, "credit_account", "To", &mut form.credit_account_id, ids.iter());
        render_text_input(ui, "Amount", &mut form.amount, "0.00", 100.0);

        let ready = form.debit_account_id.is_some() && form.credit_account_id.is_some();
        if render_button(ui, "Send", idle && ready, Some(theme.colors.accent)).clicked() {
            commands.push(Command::SubmitTransferForm);
        }
    });

    if !form.amount.is_empty() {
        render_validation_hint(ui, &validate_amount(&form.amount, scale), theme);
    }
}

fn render_transfers(ui: &mut egui::Ui, app: &App, scale: u32, theme: &Theme) {
    let Some(account_id) = app.state.transfers_account else {
        ui.colored_label(theme.dim, "Select an account to list its transfers");
        return;
    };

    ui.heading(format!("Transfers of {}", short_id(account_id)));
    if app.state.transfers.is_empty() {
        render_empty_state(ui, "No transfers", None, theme);
        return;
    }

    render_table(
        ui,
        "transfers_table",
        TableConfig::columns(5).scrollable(220.0),
        &["Transfer", "Direction", "Counterparty", "Amount", "Time"],
        theme,
        |ui| {
            for transfer in app.state.transfers.iter() {
                render_transfer_row(ui, transfer, account_id, scale, theme);
                ui.end_row();
            }
        },
    );
}

fn render_transfer_row(ui: &mut egui::Ui, transfer: &Transfer, account_id: u128, scale: u32, theme: &Theme) {
    let outgoing = transfer.debits(account_id);
    let (direction, counterparty, color) = if outgoing {
        ("out", transfer.credit_account_id, theme.error)
    } else {
        ("in", transfer.debit_account_id, theme.success)
    };

    ui.monospace(short_id(transfer.id));
    ui.colored_label(color, direction);
    ui.monospace(short_id(counterparty));
    ui.colored_label(color, format_amount(transfer.amount, scale));
    ui.colored_label(theme.dim, format_timestamp(transfer.timestamp));
}
