use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::json;

use super::{button_span, centered_rect};
use crate::authorization::{Authorization, AuthorizationStore, AuthorizationType};
use crate::i18n::Translator;

/// Selection state for the authorization dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationSelection {
    Toggle,
    Cancel,
    Proceed,
}

impl AuthorizationSelection {
    fn next(self) -> Self {
        match self {
            Self::Toggle => Self::Cancel,
            Self::Cancel => Self::Proceed,
            Self::Proceed => Self::Toggle,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Toggle => Self::Proceed,
            Self::Cancel => Self::Toggle,
            Self::Proceed => Self::Cancel,
        }
    }
}

/// Outcome of a key press in the authorization dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationResult {
    Proceed,
    Cancelled,
}

/// Lets the owner grant the marketplace permission to move their tokens
pub struct AuthorizationDialog {
    pub visible: bool,
    /// Address that receives the authorization (the marketplace)
    pub contract_address: String,
    /// Token contract being authorized
    pub token_address: String,
    pub owner: String,
    pub authorization_type: AuthorizationType,
    pub selection: AuthorizationSelection,
    pub authorized: bool,
    pub error: Option<String>,
}

impl Default for AuthorizationDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            contract_address: String::new(),
            token_address: String::new(),
            owner: String::new(),
            authorization_type: AuthorizationType::Approval,
            selection: AuthorizationSelection::Toggle,
            authorized: false,
            error: None,
        }
    }

    pub fn show(
        &mut self,
        owner: &str,
        contract_address: &str,
        token_address: &str,
        authorization_type: AuthorizationType,
        store: &dyn AuthorizationStore,
    ) {
        self.owner = owner.to_string();
        self.contract_address = contract_address.to_string();
        self.token_address = token_address.to_string();
        self.authorization_type = authorization_type;
        self.authorized =
            store.has_authorization(owner, contract_address, token_address, authorization_type);
        self.selection = if self.authorized {
            AuthorizationSelection::Proceed
        } else {
            AuthorizationSelection::Toggle
        };
        self.error = None;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.error = None;
    }

    /// Grant the authorization through the store
    pub fn grant(&mut self, store: &dyn AuthorizationStore) {
        if self.authorized {
            return;
        }
        let authorization = Authorization {
            owner: self.owner.clone(),
            authorized_address: self.contract_address.clone(),
            contract_address: self.token_address.clone(),
            authorization_type: self.authorization_type,
        };
        match store.grant(authorization) {
            Ok(()) => {
                self.authorized = true;
                self.error = None;
                self.selection = AuthorizationSelection::Proceed;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to grant authorization");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyCode,
        store: &dyn AuthorizationStore,
    ) -> Option<AuthorizationResult> {
        match key {
            KeyCode::Esc => Some(AuthorizationResult::Cancelled),
            KeyCode::Tab | KeyCode::Down | KeyCode::Right => {
                self.selection = self.selection.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Left => {
                self.selection = self.selection.prev();
                None
            }
            KeyCode::Char(' ') if self.selection == AuthorizationSelection::Toggle => {
                self.grant(store);
                None
            }
            KeyCode::Enter => match self.selection {
                AuthorizationSelection::Toggle => {
                    self.grant(store);
                    None
                }
                AuthorizationSelection::Cancel => Some(AuthorizationResult::Cancelled),
                AuthorizationSelection::Proceed => {
                    self.authorized.then_some(AuthorizationResult::Proceed)
                }
            },
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, tr: &Translator) {
        if !self.visible {
            return;
        }

        let area = centered_rect(55, 45, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", tr.t("authorization_modal.title")))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Description
                Constraint::Length(2), // Toggle
                Constraint::Length(1), // Error
                Constraint::Length(1), // Buttons
            ])
            .margin(1)
            .split(inner);

        let values = json!({ "token": self.token_address });
        frame.render_widget(
            Paragraph::new(tr.t_with("authorization_modal.description", &values))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let (mark, status_key, status_color) = if self.authorized {
            ("[x]", "authorization_modal.authorized", Color::Green)
        } else {
            ("[ ]", "authorization_modal.unauthorized", Color::Red)
        };
        let toggle_style = if self.selection == AuthorizationSelection::Toggle {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let toggle = Line::from(vec![
            Span::styled(
                format!("{mark} {}", tr.t_with("authorization_modal.toggle", &values)),
                toggle_style,
            ),
            Span::raw("  "),
            Span::styled(tr.t(status_key), Style::default().fg(status_color)),
        ]);
        frame.render_widget(Paragraph::new(toggle).wrap(Wrap { trim: true }), chunks[1]);

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    tr.t_with("authorization_modal.failed", &json!({ "error": error })),
                    Style::default().fg(Color::Red),
                )),
                chunks[2],
            );
        }

        let buttons = Line::from(vec![
            button_span(
                &tr.t("global.cancel"),
                self.selection == AuthorizationSelection::Cancel,
                true,
            ),
            Span::raw("   "),
            button_span(
                &tr.t("global.proceed"),
                self.selection == AuthorizationSelection::Proceed,
                self.authorized,
            ),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[3],
        );
    }
}
