mod api;
mod app;
mod campaign;
mod conversations;
mod csv_import;
mod customers;
mod error;
mod presets;
mod storage;
mod templates;
mod ui;
mod utils;

use adw::prelude::*;
use adw::Application;
use tracing_subscriber::EnvFilter;

fn main() -> glib::ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let app = Application::builder()
        .application_id("com.example.CampaignDashboard")
        .build();
    app.connect_activate(|app| {
        crate::app::build_ui(app);
    });
    app.run()
}
