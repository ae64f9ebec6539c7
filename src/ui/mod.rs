pub mod dialogs;
pub mod form_field;
pub mod sell_modal;
pub mod terminal_guard;

pub use sell_modal::{OrderRequest, SellContext, SellHandler, SellModal, SellModalEvent};
