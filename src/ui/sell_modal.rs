//! The sell dialog: price and expiration form, price confirmation and the
//! marketplace authorization step.
//!
//! Flow: edit fields -> Submit -> confirm price -> Proceed. On Proceed the
//! marketplace approval for the NFT contract is checked. When present the
//! order is created right away; otherwise the authorization dialog opens and
//! creates the order once the approval is granted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde::Serialize;
use serde_json::json;

use crate::authorization::{AuthorizationStore, AuthorizationType};
use crate::contracts::ContractAddresses;
use crate::i18n::Translator;
use crate::listing::Listing;
use crate::mana::{from_mana, from_wei, group_thousands, to_mana, Mana, MANA_SYMBOL};
use crate::nft::{is_owned_by, nft_name, Nft, Order, Wallet};
use crate::order::{default_expiration_date, format_expiration, is_invalid_date, parse_expiration};
use crate::routing::{locations, Location};
use crate::ui::dialogs::{
    button_span, centered_rect, AuthorizationDialog, AuthorizationResult, ConfirmPriceDialog,
    ConfirmPriceResult,
};
use crate::ui::form_field::FormField;

/// Callbacks supplied by whoever hosts the dialog
pub trait SellHandler {
    fn on_navigate(&mut self, location: Location);
    fn on_create_order(&mut self, nft: &Nft, price: Mana, expires_at_ms: i64);
}

/// An order the seller asked to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub nft: Nft,
    /// Price in wei
    pub price: Mana,
    /// Expiration as epoch milliseconds
    pub expires_at: i64,
}

/// What a key press asks the host to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellModalEvent {
    Navigate(Location),
    CreateOrder(OrderRequest),
}

impl SellModalEvent {
    /// Forward the event to the matching handler callback
    pub fn dispatch(self, handler: &mut dyn SellHandler) {
        match self {
            SellModalEvent::Navigate(location) => handler.on_navigate(location),
            SellModalEvent::CreateOrder(request) => {
                handler.on_create_order(&request.nft, request.price, request.expires_at);
            }
        }
    }
}

/// Focusable controls of the main form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellFocus {
    Price,
    ExpiresAt,
    Cancel,
    Submit,
}

impl SellFocus {
    fn next(self) -> Self {
        match self {
            Self::Price => Self::ExpiresAt,
            Self::ExpiresAt => Self::Cancel,
            Self::Cancel => Self::Submit,
            Self::Submit => Self::Price,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Price => Self::Submit,
            Self::ExpiresAt => Self::Price,
            Self::Cancel => Self::ExpiresAt,
            Self::Submit => Self::Cancel,
        }
    }
}

/// Source of "now", replaceable in tests
pub type Clock = fn() -> DateTime<Utc>;

/// Shared collaborators of the dialog
#[derive(Clone)]
pub struct SellContext {
    pub contracts: ContractAddresses,
    pub authorizations: Arc<dyn AuthorizationStore>,
    pub translator: Arc<Translator>,
    pub default_expiration_days: i64,
    pub clock: Clock,
}

pub struct SellModal {
    nft: Nft,
    order: Option<Order>,
    wallet: Option<Wallet>,
    ctx: SellContext,
    pub price: FormField,
    pub expires_at: FormField,
    pub focus: SellFocus,
    pub confirm: ConfirmPriceDialog,
    pub authorization: AuthorizationDialog,
}

impl SellModal {
    pub fn new(listing: Listing, ctx: SellContext) -> Self {
        let update = listing.is_update();
        let Listing { nft, order, wallet } = listing;

        let placeholder = format!("{MANA_SYMBOL} {}", group_thousands(1000));
        let (price, expires_at) = match &order {
            Some(order) => (
                to_mana(from_wei(order.price.wei())),
                format_expiration(order.expires_at),
            ),
            None => (
                String::new(),
                default_expiration_date((ctx.clock)(), ctx.default_expiration_days),
            ),
        };

        tracing::debug!(
            token_id = %nft.token_id,
            update,
            "Opening sell dialog"
        );

        Self {
            nft,
            order,
            wallet,
            ctx,
            price: FormField::price(price, placeholder),
            expires_at: FormField::date(expires_at),
            focus: SellFocus::Price,
            confirm: ConfirmPriceDialog::new(),
            authorization: AuthorizationDialog::new(),
        }
    }

    pub fn nft(&self) -> &Nft {
        &self.nft
    }

    /// Whether an existing order is being updated
    pub fn is_update(&self) -> bool {
        self.order.is_some()
    }

    pub fn show_confirm(&self) -> bool {
        self.confirm.visible
    }

    pub fn show_authorization_modal(&self) -> bool {
        self.authorization.visible
    }

    fn now(&self) -> DateTime<Utc> {
        (self.ctx.clock)()
    }

    fn default_expiration(&self) -> String {
        default_expiration_date(self.now(), self.ctx.default_expiration_days)
    }

    pub fn is_invalid_date(&self) -> bool {
        is_invalid_date(self.expires_at.value(), self.now())
    }

    pub fn is_owner(&self) -> bool {
        is_owned_by(&self.nft, self.wallet.as_ref())
    }

    fn wallet_address(&self) -> &str {
        self.wallet.as_ref().map_or("", |w| w.address.as_str())
    }

    /// Whether the wallet has approved the marketplace for the NFT contract
    pub fn has_approval(&self) -> bool {
        self.ctx.authorizations.has_authorization(
            self.wallet_address(),
            &self.ctx.contracts.marketplace,
            &self.nft.contract_address,
            AuthorizationType::Approval,
        )
    }

    /// Submit needs ownership, a positive price and a future date
    pub fn can_submit(&self) -> bool {
        self.is_owner() && !from_mana(self.price.value()).is_zero() && !self.is_invalid_date()
    }

    /// An emptied date field falls back to the default expiration
    fn restore_default_date(&mut self) {
        if self.expires_at.value().trim().is_empty() {
            let default = self.default_expiration();
            self.expires_at.set_value(&default);
        }
    }

    fn set_focus(&mut self, focus: SellFocus) {
        if self.focus == SellFocus::ExpiresAt && focus != SellFocus::ExpiresAt {
            self.restore_default_date();
        }
        self.focus = focus;
    }

    /// Open the price confirmation, if the form allows submitting
    pub fn open_confirm(&mut self) {
        self.restore_default_date();
        if self.can_submit() {
            self.confirm.show(self.price.value());
        }
    }

    /// Close the price confirmation, dropping the re-entered price
    pub fn close_confirm(&mut self) {
        self.confirm.hide();
    }

    /// Leave the dialog for the NFT's detail page
    pub fn cancel(&self) -> SellModalEvent {
        SellModalEvent::Navigate(locations::nft(
            &self.nft.contract_address,
            &self.nft.token_id,
        ))
    }

    /// Build the order from the current fields
    pub fn handle_create_order(&self) -> Option<SellModalEvent> {
        let Some(expires_at) = parse_expiration(self.expires_at.value()) else {
            tracing::warn!(value = self.expires_at.value(), "Unparsable expiration date");
            return None;
        };
        let price = from_mana(self.price.value());
        tracing::info!(
            token_id = %self.nft.token_id,
            price = %to_mana(price),
            expires_at,
            "Creating order"
        );
        Some(SellModalEvent::CreateOrder(OrderRequest {
            nft: self.nft.clone(),
            price,
            expires_at,
        }))
    }

    /// Confirmed submit: create the order directly when the marketplace is
    /// already approved for the NFT contract, otherwise ask for approval
    pub fn handle_submit(&mut self) -> Option<SellModalEvent> {
        if self.has_approval() {
            self.handle_create_order()
        } else {
            let owner = self.wallet_address().to_string();
            let marketplace = self.ctx.contracts.marketplace.clone();
            tracing::info!(
                contract = %self.nft.contract_address,
                "Marketplace not approved, requesting authorization"
            );
            self.authorization.show(
                &owner,
                &marketplace,
                &self.nft.contract_address,
                AuthorizationType::Approval,
                self.ctx.authorizations.as_ref(),
            );
            self.close_confirm();
            None
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<SellModalEvent> {
        if self.authorization.visible {
            return self.handle_authorization_key(key);
        }
        if self.confirm.visible {
            return self.handle_confirm_key(key);
        }
        self.handle_form_key(key)
    }

    fn handle_authorization_key(&mut self, key: KeyCode) -> Option<SellModalEvent> {
        let store = Arc::clone(&self.ctx.authorizations);
        match self.authorization.handle_key(key, store.as_ref())? {
            AuthorizationResult::Proceed => {
                self.authorization.hide();
                self.handle_create_order()
            }
            AuthorizationResult::Cancelled => {
                self.authorization.hide();
                None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) -> Option<SellModalEvent> {
        let price = self.price.value().to_string();
        match self.confirm.handle_key(key, &price)? {
            ConfirmPriceResult::Proceed => self.handle_submit(),
            ConfirmPriceResult::Cancelled => {
                self.close_confirm();
                None
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) -> Option<SellModalEvent> {
        match key {
            KeyCode::Esc => Some(self.cancel()),
            KeyCode::Tab | KeyCode::Down => {
                self.set_focus(self.focus.next());
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.set_focus(self.focus.prev());
                None
            }
            KeyCode::Enter => match self.focus {
                SellFocus::Price | SellFocus::ExpiresAt => {
                    self.set_focus(self.focus.next());
                    None
                }
                SellFocus::Cancel => Some(self.cancel()),
                SellFocus::Submit => {
                    self.open_confirm();
                    None
                }
            },
            KeyCode::Left | KeyCode::Right
                if matches!(self.focus, SellFocus::Cancel | SellFocus::Submit) =>
            {
                self.focus = if self.focus == SellFocus::Cancel {
                    SellFocus::Submit
                } else {
                    SellFocus::Cancel
                };
                None
            }
            _ => {
                match self.focus {
                    SellFocus::Price => {
                        self.price.handle_key(key);
                    }
                    SellFocus::ExpiresAt => {
                        self.expires_at.handle_key(key);
                    }
                    _ => {}
                }
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let tr = self.ctx.translator.as_ref();
        let name = nft_name(&self.nft);
        let update = self.is_update();

        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);

        let title_key = if update {
            "sell_page.update_title"
        } else {
            "sell_page.title"
        };
        let block = Block::default()
            .title(format!(" {} ", tr.t(title_key)))
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Subtitle
                Constraint::Length(self.price.render_height()),
                Constraint::Length(self.expires_at.render_height()),
                Constraint::Length(1), // Ownership notice
                Constraint::Min(0),
                Constraint::Length(1), // Buttons
            ])
            .margin(1)
            .split(inner);

        let subtitle_key = if update {
            "sell_page.update_subtitle"
        } else {
            "sell_page.subtitle"
        };
        frame.render_widget(
            Paragraph::new(tr.t_with(subtitle_key, &json!({ "name": name })))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        self.price.render(
            frame,
            chunks[1],
            &tr.t("sell_page.price"),
            self.focus == SellFocus::Price,
            None,
        );

        let invalid_date = tr.t("sell_page.invalid_date");
        self.expires_at.render(
            frame,
            chunks[2],
            &tr.t("sell_page.expiration_date"),
            self.focus == SellFocus::ExpiresAt,
            self.is_invalid_date().then_some(invalid_date.as_str()),
        );

        if !self.is_owner() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    tr.t("sell_page.not_owner"),
                    Style::default().fg(Color::Yellow),
                )),
                chunks[3],
            );
        }

        let submit_key = if update {
            "sell_page.update_submit"
        } else {
            "sell_page.submit"
        };
        let buttons = Line::from(vec![
            button_span(&tr.t("global.cancel"), self.focus == SellFocus::Cancel, true),
            Span::raw("   "),
            button_span(
                &tr.t(submit_key),
                self.focus == SellFocus::Submit,
                self.can_submit(),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[5],
        );

        self.confirm.render(frame, tr, &name, self.price.value());
        self.authorization.render(frame, tr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::{Authorization, LocalAuthorizations};
    use crate::nft::NftCategory;
    use chrono::TimeZone;
    use ratatui::{backend::TestBackend, Terminal};

    const OWNER: &str = "0x1111111111111111111111111111111111111111";
    const STRANGER: &str = "0x9999999999999999999999999999999999999999";
    const TOKEN: &str = "0x3333333333333333333333333333333333333333";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn make_nft() -> Nft {
        Nft {
            contract_address: TOKEN.to_string(),
            token_id: "42".to_string(),
            name: Some("Genesis Plaza".to_string()),
            category: NftCategory::Parcel,
            owner: OWNER.to_string(),
        }
    }

    fn make_ctx(store: Arc<LocalAuthorizations>) -> SellContext {
        SellContext {
            contracts: ContractAddresses::default(),
            authorizations: store,
            translator: Arc::new(Translator::english()),
            default_expiration_days: 30,
            clock: fixed_now,
        }
    }

    fn make_modal(order: Option<Order>, wallet: &str, store: Arc<LocalAuthorizations>) -> SellModal {
        let listing = Listing {
            nft: make_nft(),
            order,
            wallet: Some(Wallet {
                address: wallet.to_string(),
            }),
        };
        SellModal::new(listing, make_ctx(store))
    }

    fn approved_store() -> Arc<LocalAuthorizations> {
        Arc::new(LocalAuthorizations::with_entries([Authorization {
            owner: OWNER.to_string(),
            authorized_address: ContractAddresses::default().marketplace,
            contract_address: TOKEN.to_string(),
            authorization_type: AuthorizationType::Approval,
        }]))
    }

    fn type_str(modal: &mut SellModal, s: &str) -> Option<SellModalEvent> {
        let mut last = None;
        for c in s.chars() {
            last = modal.handle_key(KeyCode::Char(c));
        }
        last
    }

    #[test]
    fn test_new_without_order_uses_defaults() {
        let modal = make_modal(None, OWNER, approved_store());
        assert!(!modal.is_update());
        assert_eq!(modal.price.value(), "");
        assert_eq!(modal.expires_at.value(), "2024-06-09");
    }

    #[test]
    fn test_new_with_order_uses_order_values() {
        let expires = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let order = Order {
            price: from_mana("1500.25"),
            expires_at: expires.timestamp_millis(),
        };
        let modal = make_modal(Some(order), OWNER, approved_store());
        assert!(modal.is_update());
        assert_eq!(modal.price.value(), "1,500.25");
        assert_eq!(modal.expires_at.value(), "2024-08-01");
    }

    #[test]
    fn test_submit_disabled_rules() {
        let mut modal = make_modal(None, OWNER, approved_store());
        assert!(!modal.can_submit(), "empty price");

        modal.price.set_value("10");
        assert!(modal.can_submit());

        modal.expires_at.set_value("2024-05-01");
        assert!(modal.is_invalid_date());
        assert!(!modal.can_submit(), "past date");

        let mut stranger = make_modal(None, STRANGER, approved_store());
        stranger.price.set_value("10");
        assert!(!stranger.can_submit(), "not owner");
    }

    #[test]
    fn test_submit_button_opens_confirm_only_when_allowed() {
        let mut modal = make_modal(None, OWNER, approved_store());
        modal.focus = SellFocus::Submit;
        modal.handle_key(KeyCode::Enter);
        assert!(!modal.show_confirm());

        modal.price.set_value("10");
        modal.handle_key(KeyCode::Enter);
        assert!(modal.show_confirm());
    }

    #[test]
    fn test_confirm_close_clears_confirm_price() {
        let mut modal = make_modal(None, OWNER, approved_store());
        modal.price.set_value("10");
        modal.open_confirm();
        type_str(&mut modal, "10");
        assert_eq!(modal.confirm.confirm_price.value(), "10");

        modal.handle_key(KeyCode::Esc);
        assert!(!modal.show_confirm());
        assert_eq!(modal.confirm.confirm_price.value(), "");
    }

    #[test]
    fn test_authorized_submit_creates_order() {
        let mut modal = make_modal(None, OWNER, approved_store());
        modal.price.set_value("1,000");
        modal.open_confirm();
        type_str(&mut modal, "1000");
        modal.confirm.focus = crate::ui::dialogs::ConfirmPriceFocus::Proceed;

        let event = modal.handle_key(KeyCode::Enter);
        let expected_expiry = Utc
            .with_ymd_and_hms(2024, 6, 9, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            event,
            Some(SellModalEvent::CreateOrder(OrderRequest {
                nft: make_nft(),
                price: from_mana("1000"),
                expires_at: expected_expiry,
            }))
        );
        assert!(!modal.show_authorization_modal());
    }

    #[test]
    fn test_unauthorized_submit_opens_authorization() {
        let store = Arc::new(LocalAuthorizations::new());
        let mut modal = make_modal(None, OWNER, Arc::clone(&store));
        modal.price.set_value("5");
        modal.open_confirm();

        assert_eq!(modal.handle_submit(), None);
        assert!(modal.show_authorization_modal());
        assert!(!modal.show_confirm());
        assert_eq!(modal.confirm.confirm_price.value(), "");
    }

    #[test]
    fn test_approval_is_keyed_on_wallet() {
        assert!(make_modal(None, OWNER, approved_store()).has_approval());
        // The NFT owner's approval does not count for another wallet
        assert!(!make_modal(None, STRANGER, approved_store()).has_approval());
    }

    #[test]
    fn test_authorization_success_creates_order() {
        let store = Arc::new(LocalAuthorizations::new());
        let mut modal = make_modal(None, OWNER, Arc::clone(&store));
        modal.price.set_value("5");
        modal.handle_submit();

        // Toggle grants, then Enter on Proceed
        assert_eq!(modal.handle_key(KeyCode::Enter), None);
        let event = modal.handle_key(KeyCode::Enter);
        assert!(matches!(
            event,
            Some(SellModalEvent::CreateOrder(OrderRequest { price, .. })) if price == from_mana("5")
        ));
        assert!(!modal.show_authorization_modal());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_authorization_cancel_only_closes() {
        let store = Arc::new(LocalAuthorizations::new());
        let mut modal = make_modal(None, OWNER, store);
        modal.price.set_value("5");
        modal.handle_submit();

        assert_eq!(modal.handle_key(KeyCode::Esc), None);
        assert!(!modal.show_authorization_modal());
        assert!(!modal.show_confirm());
    }

    #[test]
    fn test_cancel_navigates_to_nft() {
        let mut modal = make_modal(None, OWNER, approved_store());
        assert_eq!(
            modal.handle_key(KeyCode::Esc),
            Some(SellModalEvent::Navigate(locations::nft(TOKEN, "42")))
        );
    }

    #[test]
    fn test_cleared_date_restores_default_on_blur() {
        let mut modal = make_modal(None, OWNER, approved_store());
        modal.focus = SellFocus::ExpiresAt;
        for _ in 0..10 {
            modal.handle_key(KeyCode::Backspace);
        }
        assert_eq!(modal.expires_at.value(), "");
        modal.handle_key(KeyCode::Tab);
        assert_eq!(modal.expires_at.value(), "2024-06-09");
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut modal = make_modal(None, OWNER, approved_store());
        type_str(&mut modal, "2500");
        assert_eq!(modal.price.value(), "2,500");
    }

    #[derive(Default)]
    struct Recorder {
        navigated: Vec<Location>,
        orders: Vec<(Nft, Mana, i64)>,
    }

    impl SellHandler for Recorder {
        fn on_navigate(&mut self, location: Location) {
            self.navigated.push(location);
        }

        fn on_create_order(&mut self, nft: &Nft, price: Mana, expires_at_ms: i64) {
            self.orders.push((nft.clone(), price, expires_at_ms));
        }
    }

    #[test]
    fn test_dispatch_routes_to_handler() {
        let mut recorder = Recorder::default();
        let modal = make_modal(None, OWNER, approved_store());
        modal.cancel().dispatch(&mut recorder);
        SellModalEvent::CreateOrder(OrderRequest {
            nft: make_nft(),
            price: from_mana("3"),
            expires_at: 7,
        })
        .dispatch(&mut recorder);

        assert_eq!(recorder.navigated, vec![locations::nft(TOKEN, "42")]);
        assert_eq!(recorder.orders, vec![(make_nft(), from_mana("3"), 7)]);
    }

    #[test]
    fn test_render_shows_title_and_confirm() {
        let mut modal = make_modal(None, OWNER, approved_store());
        modal.price.set_value("10");
        modal.open_confirm();

        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| modal.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("List for sale"));
        assert!(text.contains("Confirm price"));
    }
}
