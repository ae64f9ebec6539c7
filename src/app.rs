use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::mana::Mana;
use crate::nft::Nft;
use crate::routing::Location;
use crate::ui::sell_modal::{OrderRequest, SellHandler, SellModal};
use crate::ui::terminal_guard::TerminalGuard;

/// How the dialog was left
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellOutcome {
    /// The seller cancelled; the host should show this location
    Navigated(Location),
    /// The seller confirmed an order
    OrderCreated(OrderRequest),
}

/// Host-side callbacks: remember the first outcome and stop the loop
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    pub outcome: Option<SellOutcome>,
}

impl SellHandler for OutcomeRecorder {
    fn on_navigate(&mut self, location: Location) {
        tracing::info!(%location, "Navigating away from sell dialog");
        self.outcome = Some(SellOutcome::Navigated(location));
    }

    fn on_create_order(&mut self, nft: &Nft, price: Mana, expires_at_ms: i64) {
        tracing::info!(token_id = %nft.token_id, wei = price.wei(), expires_at_ms, "Order created");
        self.outcome = Some(SellOutcome::OrderCreated(OrderRequest {
            nft: nft.clone(),
            price,
            expires_at: expires_at_ms,
        }));
    }
}

pub struct App {
    modal: SellModal,
    handler: OutcomeRecorder,
    tick_rate: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(modal: SellModal, refresh_rate_ms: u64) -> Self {
        Self {
            modal,
            handler: OutcomeRecorder::default(),
            tick_rate: Duration::from_millis(refresh_rate_ms),
            should_quit: false,
        }
    }

    /// Run the dialog until the seller leaves it. `None` means the user
    /// quit with Ctrl-C without choosing anything.
    pub fn run(mut self) -> Result<Option<SellOutcome>> {
        let mut guard = TerminalGuard::new().context("Failed to initialise terminal")?;

        while !self.should_quit {
            if let Some(terminal) = guard.terminal() {
                terminal.draw(|f| self.modal.render(f))?;
            }

            if event::poll(self.tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        tracing::debug!("Interrupted");
                        self.should_quit = true;
                        continue;
                    }
                    self.handle_key(key.code);
                }
            }
        }

        guard.restore();
        Ok(self.handler.outcome)
    }

    /// Feed one key to the dialog and dispatch whatever it asks for
    pub fn handle_key(&mut self, key: KeyCode) {
        if let Some(event) = self.modal.handle_key(key) {
            event.dispatch(&mut self.handler);
        }
        if self.handler.outcome.is_some() {
            self.should_quit = true;
        }
    }

    pub fn outcome(&self) -> Option<&SellOutcome> {
        self.handler.outcome.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
