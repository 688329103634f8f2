use crate::api::client::ApiClient;
use crate::api::events::LogLine;
use crate::api::log_stream::{self, StreamHandle, TokioSleeper, WsTransport};
use crate::app::Settings;
use crate::customers::CustomerList;
use crate::presets::{KvStore, MemoryStore, PresetStore};
use crate::storage::SqliteStore;
use crate::ui::campaign_panel::CampaignPanel;
use crate::ui::customer_panel::CustomerPanel;
use crate::ui::inbox::Inbox;
use crate::ui::log_view::LogView;
use crate::ui::templates_panel::TemplatesPanel;
use adw::prelude::*;
use adw::Application;
use std::cell::RefCell;
use std::rc::Rc;

fn preset_backend() -> Box<dyn KvStore> {
    match SqliteStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::error!("preset storage unavailable, presets will not persist: {e}");
            Box::new(MemoryStore::default())
        }
    }
}

pub fn show_main_window(app: &Application, settings: Settings) {
    let api = match ApiClient::new(&settings.base_url) {
        Ok(api) => api,
        Err(e) => {
            log::error!("invalid backend URL {:?}: {e}", settings.base_url);
            crate::ui::connect::show_connect_window(app);
            return;
        }
    };

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .title("Campaign Dashboard")
        .default_width(1100)
        .default_height(720)
        .build();

    let log_view = Rc::new(LogView::new());
    let customers = Rc::new(RefCell::new(CustomerList::new()));

    let campaign = CampaignPanel::new(
        api.clone(),
        PresetStore::new(preset_backend()),
        customers.clone(),
        log_view.clone(),
    );
    let customer_panel = CustomerPanel::new(customers, log_view.clone());
    let inbox = Inbox::new(api.clone());
    let templates = TemplatesPanel::new(api.clone());

    // Campaign page: form and roster on the left, live log on the right.
    let left = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    left.append(&campaign.widget());
    left.append(&customer_panel.widget());
    let campaign_page = gtk4::Paned::new(gtk4::Orientation::Horizontal);
    campaign_page.set_start_child(Some(&left));
    campaign_page.set_end_child(Some(&log_view.widget()));
    campaign_page.set_position(560);

    let stack = adw::ViewStack::new();
    stack.add_titled(&campaign_page, Some("campaign"), "Campaign");
    stack.add_titled(&inbox.widget(), Some("inbox"), "Inbox");
    stack.add_titled(&templates.widget(), Some("templates"), "Templates");

    let switcher = adw::ViewSwitcher::builder()
        .stack(&stack)
        .policy(adw::ViewSwitcherPolicy::Wide)
        .build();

    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&switcher));

    let server_btn = gtk4::Button::with_label("Server…");
    header.pack_end(&server_btn);
    container.append(&header);
    container.append(&stack);
    stack.set_vexpand(true);
    window.set_content(Some(&container));
    window.present();

    {
        let app = app.clone();
        let window = window.clone();
        server_btn.connect_clicked(move |_| {
            crate::ui::connect::show_connect_window(&app);
            window.close();
        });
    }

    // Live log stream. Destroying the window aborts it, so a reopened
    // dashboard never runs alongside the old connection.
    let stream = match api.log_stream_url() {
        Ok(url) => {
            let (tx, rx) = crate::utils::main_channel::<LogLine>();
            let weak_log = Rc::downgrade(&log_view);
            crate::utils::attach_receiver(rx, move |line| match weak_log.upgrade() {
                Some(view) => {
                    view.append(&line);
                    glib::ControlFlow::Continue
                }
                None => glib::ControlFlow::Break,
            });
            Some(StreamHandle::spawn(
                crate::utils::RUNTIME.handle(),
                log_stream::run(url, WsTransport, TokioSleeper, tx, settings.reconnect_delay()),
            ))
        }
        Err(e) => {
            log::error!("no log stream endpoint: {e}");
            None
        }
    };

    let polling = inbox.start_polling(settings.poll_interval_secs);
    templates.refresh();

    // The window owns the panels; their signal handlers only hold weak refs.
    let owned = RefCell::new(Some((
        stream,
        polling,
        campaign,
        customer_panel,
        inbox,
        templates,
        log_view,
    )));
    window.connect_destroy(move |_| {
        if let Some((stream, polling, ..)) = owned.borrow_mut().take() {
            if let Some(stream) = stream {
                stream.stop();
            }
            polling.remove();
        }
    });
}
