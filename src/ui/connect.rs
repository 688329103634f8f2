use crate::api::client::ApiClient;
use crate::app::Settings;
use adw::prelude::*;
use adw::Application;
use gtk4 as gtk;
use std::rc::Rc;

pub fn show_connect_window(app: &Application) {
    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Campaign Dashboard")
        .default_width(420)
        .default_height(240)
        .resizable(false)
        .build();

    let toast_overlay = adw::ToastOverlay::new();

    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_margin_top(24);
    root.set_margin_bottom(24);
    root.set_margin_start(24);
    root.set_margin_end(24);

    let title = gtk::Label::new(Some("Connect to the campaign backend"));
    title.add_css_class("title-2");
    title.set_halign(gtk::Align::Start);
    root.append(&title);

    let server_entry = gtk::Entry::new();
    server_entry.set_placeholder_text(Some("Backend URL (e.g. http://localhost:8000)"));
    server_entry.set_hexpand(true);
    server_entry.set_text(&Settings::load().base_url);
    root.append(&server_entry);

    let status = gtk::Label::new(None);
    status.add_css_class("dim-label");
    status.set_halign(gtk::Align::Start);
    root.append(&status);

    let connect_btn = gtk::Button::with_label("Connect");
    connect_btn.add_css_class("suggested-action");
    connect_btn.set_halign(gtk::Align::End);
    root.append(&connect_btn);

    toast_overlay.set_child(Some(&root));
    let container = gtk::Box::new(gtk::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    container.append(&header);
    container.append(&toast_overlay);
    window.set_content(Some(&container));

    let pending = Rc::new(crate::utils::InFlight::default());
    let on_connect = {
        let connect_btn = connect_btn.clone();
        let pending = pending.clone();
        let app = app.clone();
        let window = window.clone();
        let overlay = toast_overlay.clone();
        let server_entry = server_entry.clone();
        move || {
            let url = crate::utils::normalize_url(&server_entry.text());
            if url.is_empty() {
                overlay.add_toast(adw::Toast::new("Please enter the backend URL."));
                return;
            }
            let api = match ApiClient::new(&url) {
                Ok(api) => api,
                Err(e) => {
                    overlay.add_toast(adw::Toast::new(&format!("Invalid URL: {e}")));
                    return;
                }
            };
            if !pending.begin() {
                return;
            }
            connect_btn.set_sensitive(false);
            status.set_label("Connecting…");

            let connect_btn = connect_btn.clone();
            let pending = pending.clone();

            let app = app.clone();
            let window = window.clone();
            let overlay = overlay.clone();
            let status = status.clone();
            crate::utils::run_then(async move { api.ping().await }, move |res| {
                let message = match res {
                    Ok(code) if (200..300).contains(&code) => "Connected".to_string(),
                    Ok(code) => format!("Saved (backend answered HTTP {code})"),
                    Err(e) => {
                        log::warn!("backend check failed: {e}");
                        "Saved (backend unreachable)".to_string()
                    }
                };
                pending.finish();
                connect_btn.set_sensitive(true);
                log::info!("backend check for {url}: {message}");
                status.set_label(&message);

                // The URL is kept even when the backend is down right now.
                let mut settings = Settings::load();
                settings.base_url = url;
                if let Err(e) = settings.save() {
                    overlay.add_toast(adw::Toast::new(&format!("Failed to save settings: {}", e)));
                }
                crate::ui::main_window::show_main_window(&app, settings);
                window.close();
            });
        }
    };

    let on_connect: Rc<dyn Fn()> = Rc::new(on_connect);
    {
        let on_connect = on_connect.clone();
        connect_btn.connect_clicked(move |_| (on_connect)());
    }
    {
        let on_connect = on_connect.clone();
        server_entry.connect_activate(move |_| (on_connect)());
    }

    window.present();
}
