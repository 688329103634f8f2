use crate::api::client::ApiClient;
use crate::templates::{self, TemplateDraft, TemplateManager};
use crate::ui::dialogs;
use crate::utils::run_then;
use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct TemplatesPanel {
    root: gtk::Box,
    name_entry: gtk::Entry,
    body_view: gtk::TextView,
    list: gtk::ListBox,
    status: gtk::Label,
    editing: Cell<Option<i64>>,
    state: RefCell<TemplateManager>,
    api: ApiClient,
}

impl TemplatesPanel {
    pub fn new(api: ApiClient) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 8);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Message Templates"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some("Template name"));
        root.append(&name_entry);

        let body_view = gtk::TextView::new();
        body_view.set_wrap_mode(gtk::WrapMode::WordChar);
        let body_scroller = gtk::ScrolledWindow::builder()
            .min_content_height(90)
            .child(&body_view)
            .build();
        body_scroller.add_css_class("card");
        root.append(&body_scroller);

        let save_btn = gtk::Button::with_label("Save Template");
        save_btn.add_css_class("suggested-action");
        let clear_btn = gtk::Button::with_label("Clear");
        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        actions.set_halign(gtk::Align::End);
        actions.append(&clear_btn);
        actions.append(&save_btn);
        root.append(&actions);

        let status = gtk::Label::new(None);
        status.add_css_class("dim-label");
        status.set_halign(gtk::Align::Start);
        root.append(&status);

        let list = gtk::ListBox::new();
        list.set_selection_mode(gtk::SelectionMode::None);
        list.add_css_class("boxed-list");
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .child(&list)
            .build();
        root.append(&scroller);

        let panel = Rc::new(Self {
            root,
            name_entry,
            body_view,
            list,
            status,
            editing: Cell::new(None),
            state: RefCell::new(TemplateManager::new()),
            api,
        });
        let weak = Rc::downgrade(&panel);
        save_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.save();
            }
        });
        let weak = Rc::downgrade(&panel);
        clear_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.clear_form();
            }
        });
        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn refresh(self: &Rc<Self>) {
        let api = self.api.clone();
        let panel = self.clone();
        run_then(async move { templates::list(&api).await }, move |res| match res {
            Ok(list) => {
                panel.status.set_label("");
                panel.state.borrow_mut().set_templates(list);
                panel.render();
            }
            Err(e) => {
                log::error!("failed to load templates: {e}");
                panel.status.set_label("Error loading templates.");
            }
        });
    }

    fn render(self: &Rc<Self>) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        let state = self.state.borrow();
        if state.rows().is_empty() {
            let empty = gtk::Label::new(Some("No templates yet."));
            empty.add_css_class("dim-label");
            empty.set_margin_top(8);
            empty.set_margin_bottom(8);
            self.list.append(&empty);
            return;
        }
        for template in state.rows() {
            let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
            row.set_margin_top(6);
            row.set_margin_bottom(6);
            row.set_margin_start(8);
            row.set_margin_end(8);

            let name = gtk::Label::new(Some(&template.template_name));
            name.add_css_class("heading");
            name.set_halign(gtk::Align::Start);
            let body = gtk::Label::new(Some(&template.template_body));
            body.set_hexpand(true);
            body.set_halign(gtk::Align::Start);
            body.set_ellipsize(gtk::pango::EllipsizeMode::End);

            let edit_btn = gtk::Button::with_label("Edit");
            let delete_btn = gtk::Button::with_label("Delete");
            delete_btn.add_css_class("destructive-action");
            let id = template.id;
            let weak = Rc::downgrade(self);
            edit_btn.connect_clicked(move |_| {
                if let Some(panel) = weak.upgrade() {
                    panel.edit(id);
                }
            });
            let weak = Rc::downgrade(self);
            delete_btn.connect_clicked(move |_| {
                if let Some(panel) = weak.upgrade() {
                    panel.delete(id);
                }
            });

            row.append(&name);
            row.append(&body);
            row.append(&edit_btn);
            row.append(&delete_btn);
            self.list.append(&row);
        }
    }

    fn body_text(&self) -> String {
        let buffer = self.body_view.buffer();
        buffer
            .text(&buffer.start_iter(), &buffer.end_iter(), false)
            .to_string()
    }

    fn clear_form(&self) {
        self.editing.set(None);
        self.name_entry.set_text("");
        self.body_view.buffer().set_text("");
    }

    fn edit(&self, id: i64) {
        let draft = self.state.borrow().edit(id);
        if let Some(draft) = draft {
            self.editing.set(draft.id);
            self.name_entry.set_text(&draft.name);
            self.body_view.buffer().set_text(&draft.body);
        }
    }

    fn save(self: &Rc<Self>) {
        let draft = TemplateDraft {
            id: self.editing.get(),
            name: self.name_entry.text().to_string(),
            body: self.body_text(),
        };
        let request = match draft.prepare() {
            Ok(request) => request,
            Err(e) => {
                dialogs::alert(&self.root, &e.to_string());
                return;
            }
        };
        let api = self.api.clone();
        let panel = self.clone();
        run_then(async move { templates::save(&api, request).await }, move |res| match res {
            Ok(()) => {
                panel.clear_form();
                panel.refresh();
            }
            Err(e) => dialogs::alert(&panel.root, &templates::save_failure(&e)),
        });
    }

    fn delete(self: &Rc<Self>, id: i64) {
        let panel = self.clone();
        dialogs::confirm(&self.root, templates::DELETE_CONFIRMATION, move || {
            let api = panel.api.clone();
            let panel = panel.clone();
            run_then(async move { templates::delete(&api, id).await }, move |res| match res {
                Ok(()) => panel.refresh(),
                Err(e) => dialogs::alert(&panel.root, &templates::delete_failure(&e)),
            });
        });
    }
}
