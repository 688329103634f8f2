use crate::api::client::ApiClient;
use crate::api::events::LogLine;
use crate::campaign::{self, CampaignForm, CampaignType, ImagePreview};
use crate::customers::CustomerList;
use crate::error::ValidationError;
use crate::presets::{KvStore, Preset, PresetStore};
use crate::ui::dialogs;
use crate::ui::log_view::LogView;
use crate::utils::{attach_receiver, main_channel, run_then, spawn_async};
use gtk4 as gtk;
use gtk4::gdk_pixbuf::prelude::*;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub type Presets = PresetStore<Box<dyn KvStore>>;

pub struct CampaignPanel {
    root: gtk::Box,
    campaign: gtk::DropDown,
    template_entry: gtk::Entry,
    image_entry: gtk::Entry,
    preview: gtk::Stack,
    picture: gtk::Picture,
    preset_dropdown: gtk::DropDown,
    preset_labels: RefCell<Vec<String>>,
    presets: RefCell<Presets>,
    customers: Rc<RefCell<CustomerList>>,
    api: ApiClient,
    log: Rc<LogView>,
}

fn texture_from(bytes: &[u8]) -> Result<gtk::gdk::Texture, String> {
    let loader = gtk::gdk_pixbuf::PixbufLoader::new();
    loader.write(bytes).map_err(|e| e.to_string())?;
    loader.close().map_err(|e| e.to_string())?;
    let pixbuf = loader
        .pixbuf()
        .ok_or_else(|| "image could not be decoded".to_string())?;
    Ok(gtk::gdk::Texture::for_pixbuf(&pixbuf))
}

impl CampaignPanel {
    pub fn new(
        api: ApiClient,
        presets: Presets,
        customers: Rc<RefCell<CustomerList>>,
        log: Rc<LogView>,
    ) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Campaign"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        // Presets
        let preset_dropdown = gtk::DropDown::from_strings(&[]);
        preset_dropdown.set_hexpand(true);
        let save_preset = gtk::Button::with_label("Save Preset");
        let delete_preset = gtk::Button::with_label("Delete");
        delete_preset.add_css_class("destructive-action");
        let preset_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        preset_row.append(&preset_dropdown);
        preset_row.append(&save_preset);
        preset_row.append(&delete_preset);
        root.append(&preset_row);

        let campaign = gtk::DropDown::from_strings(&campaign::campaign_labels());
        root.append(&campaign);

        let template_entry = gtk::Entry::new();
        template_entry.set_placeholder_text(Some("Meta template name"));
        root.append(&template_entry);

        let image_entry = gtk::Entry::new();
        image_entry.set_placeholder_text(Some("Header image URL (optional)"));
        root.append(&image_entry);

        let picture = gtk::Picture::new();
        picture.set_can_shrink(true);
        picture.set_size_request(-1, 140);
        let placeholder = gtk::Label::new(Some("No image"));
        placeholder.add_css_class("dim-label");
        let preview = gtk::Stack::new();
        preview.add_named(&placeholder, Some("placeholder"));
        preview.add_named(&picture, Some("image"));
        preview.set_visible_child_name("placeholder");
        root.append(&preview);

        let start_btn = gtk::Button::with_label("Start Campaign");
        start_btn.add_css_class("suggested-action");
        start_btn.set_halign(gtk::Align::End);
        root.append(&start_btn);

        let focus = gtk::EventControllerFocus::new();
        image_entry.add_controller(focus.clone());

        let panel = Rc::new(Self {
            root,
            campaign,
            template_entry,
            image_entry,
            preview,
            picture,
            preset_dropdown,
            preset_labels: RefCell::new(Vec::new()),
            presets: RefCell::new(presets),
            customers,
            api,
            log,
        });
        panel.rebuild_presets();

        // Handlers hold the panel weakly; the main window owns it.
        let weak = Rc::downgrade(&panel);
        focus.connect_leave(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.refresh_preview();
            }
        });
        let weak = Rc::downgrade(&panel);
        panel.image_entry.connect_activate(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.refresh_preview();
            }
        });
        let weak = Rc::downgrade(&panel);
        start_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.start();
            }
        });
        let weak = Rc::downgrade(&panel);
        panel.preset_dropdown.connect_selected_notify(move |dd| {
            if let Some(panel) = weak.upgrade() {
                panel.load_preset(dd.selected());
            }
        });
        let weak = Rc::downgrade(&panel);
        save_preset.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.save_preset();
            }
        });
        let weak = Rc::downgrade(&panel);
        delete_preset.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.delete_preset();
            }
        });
        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    fn form(&self) -> CampaignForm {
        CampaignForm {
            campaign: CampaignType::at_position(self.campaign.selected()),
            template_name: self.template_entry.text().to_string(),
            image_url: self.image_entry.text().to_string(),
        }
    }

    fn apply_form(self: &Rc<Self>, form: &CampaignForm) {
        self.campaign
            .set_selected(form.campaign.map_or(0, CampaignType::position));
        self.template_entry.set_text(&form.template_name);
        self.image_entry.set_text(&form.image_url);
        self.refresh_preview();
    }

    fn refresh_preview(self: &Rc<Self>) {
        let url = match campaign::image_preview(&self.image_entry.text()) {
            ImagePreview::Placeholder => {
                self.preview.set_visible_child_name("placeholder");
                return;
            }
            ImagePreview::Show(url) => url,
        };
        let api = self.api.clone();
        let target = url.clone();
        let panel = self.clone();
        run_then(async move { api.fetch_bytes(&target).await }, move |res| {
            // The field may have changed while the image was in flight.
            if campaign::image_preview(&panel.image_entry.text()) != ImagePreview::Show(url) {
                return;
            }
            match res.map_err(|e| e.to_string()).and_then(|bytes| texture_from(&bytes)) {
                Ok(texture) => {
                    panel.picture.set_paintable(Some(&texture));
                    panel.preview.set_visible_child_name("image");
                }
                Err(e) => {
                    log::warn!("image preview failed: {e}");
                    panel.preview.set_visible_child_name("placeholder");
                }
            }
        });
    }

    fn start(&self) {
        let request = {
            let customers = self.customers.borrow();
            self.form().prepare(customers.customers())
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                dialogs::alert(&self.root, &e.to_string());
                return;
            }
        };

        let (tx, rx) = main_channel::<LogLine>();
        let log = self.log.clone();
        attach_receiver(rx, move |line| {
            log.append(&line);
            glib::ControlFlow::Continue
        });
        let api = self.api.clone();
        spawn_async(async move {
            let _ = campaign::submit(&api, &request, move |line| {
                let _ = tx.send(line);
            })
            .await;
        });
    }

    /// Rebuilds the preset dropdown from the persisted mapping.
    fn rebuild_presets(&self) {
        let labels = match self.presets.borrow().labels() {
            Ok(labels) => labels,
            Err(e) => {
                log::error!("could not read presets: {e}");
                vec![crate::presets::PRESET_PLACEHOLDER.to_string()]
            }
        };
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        self.preset_labels.replace(labels.clone());
        self.preset_dropdown
            .set_model(Some(&gtk::StringList::new(&refs)));
        self.preset_dropdown.set_selected(0);
    }

    fn selected_preset(&self) -> Option<String> {
        let pos = self.preset_dropdown.selected();
        if pos == 0 || pos == gtk::INVALID_LIST_POSITION {
            return None;
        }
        self.preset_labels.borrow().get(pos as usize).cloned()
    }

    fn load_preset(self: &Rc<Self>, pos: u32) {
        if pos == 0 || pos == gtk::INVALID_LIST_POSITION {
            return;
        }
        let Some(name) = self.preset_labels.borrow().get(pos as usize).cloned() else {
            return;
        };
        let loaded = self.presets.borrow().load(&name);
        match loaded {
            Ok(Some(preset)) => self.apply_form(&preset.to_form()),
            Ok(None) => {}
            Err(e) => dialogs::alert(&self.root, &format!("Could not load preset: {e}")),
        }
    }

    fn save_preset(self: &Rc<Self>) {
        let panel = self.clone();
        dialogs::prompt(&self.root, "Enter a name for this preset:", move |name| {
            let snapshot = Preset::snapshot(&panel.form());
            let saved = panel.presets.borrow_mut().save(&name, snapshot);
            match saved {
                Ok(true) => {
                    panel.rebuild_presets();
                    dialogs::alert(&panel.root, &format!("Preset '{}' saved!", name.trim()));
                }
                Ok(false) => {}
                Err(e) => dialogs::alert(&panel.root, &format!("Could not save preset: {e}")),
            }
        });
    }

    fn delete_preset(self: &Rc<Self>) {
        let Some(name) = self.selected_preset() else {
            dialogs::alert(&self.root, &ValidationError::NoPresetSelected.to_string());
            return;
        };
        let panel = self.clone();
        let question = format!("Are you sure you want to delete the preset '{name}'?");
        dialogs::confirm(&self.root, &question, move || {
            let deleted = panel.presets.borrow_mut().delete(&name);
            match deleted {
                Ok(_) => {
                    panel.rebuild_presets();
                    dialogs::alert(&panel.root, &format!("Preset '{name}' deleted."));
                }
                Err(e) => dialogs::alert(&panel.root, &format!("Could not delete preset: {e}")),
            }
        });
    }
}
