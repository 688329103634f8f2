pub mod campaign_panel;
pub mod chat_view;
pub mod connect;
pub mod customer_panel;
pub mod dialogs;
pub mod inbox;
pub mod log_view;
pub mod main_window;
pub mod sidebar;
pub mod templates_panel;
