use crate::customers::{self, CustomerList, CustomerTable};
use crate::ui::dialogs;
use crate::ui::log_view::LogView;
use gtk4 as gtk;
use gtk4::gio::prelude::FileExt;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

pub struct CustomerPanel {
    root: gtk::Box,
    title: gtk::Label,
    name_entry: gtk::Entry,
    cc_entry: gtk::Entry,
    phone_entry: gtk::Entry,
    table: gtk::ListBox,
    chooser: RefCell<Option<gtk::FileChooserNative>>,
    customers: Rc<RefCell<CustomerList>>,
    log: Rc<LogView>,
}

impl CustomerPanel {
    pub fn new(customers: Rc<RefCell<CustomerList>>, log: Rc<LogView>) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let title = gtk::Label::new(Some("Customers"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let name_entry = gtk::Entry::new();
        name_entry.set_placeholder_text(Some("Name"));
        name_entry.set_hexpand(true);
        let cc_entry = gtk::Entry::new();
        cc_entry.set_placeholder_text(Some("Country code"));
        cc_entry.set_width_chars(6);
        let phone_entry = gtk::Entry::new();
        phone_entry.set_placeholder_text(Some("Phone"));
        phone_entry.set_hexpand(true);
        let add_btn = gtk::Button::with_label("Add");

        let manual_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        manual_row.append(&name_entry);
        manual_row.append(&cc_entry);
        manual_row.append(&phone_entry);
        manual_row.append(&add_btn);
        root.append(&manual_row);

        let load_btn = gtk::Button::with_label("Load CSV…");
        let clear_btn = gtk::Button::with_label("Clear List");
        clear_btn.add_css_class("destructive-action");
        let actions = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        actions.append(&load_btn);
        actions.append(&clear_btn);
        root.append(&actions);

        let table = gtk::ListBox::new();
        table.set_selection_mode(gtk::SelectionMode::None);
        table.add_css_class("boxed-list");
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .min_content_height(120)
            .child(&table)
            .build();
        root.append(&scroller);

        let panel = Rc::new(Self {
            root,
            title,
            name_entry,
            cc_entry,
            phone_entry,
            table,
            chooser: RefCell::new(None),
            customers,
            log,
        });
        panel.render();

        let weak = Rc::downgrade(&panel);
        add_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.add_manual();
            }
        });
        let weak = Rc::downgrade(&panel);
        load_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                panel.choose_csv();
            }
        });
        let weak = Rc::downgrade(&panel);
        clear_btn.connect_clicked(move |_| {
            if let Some(panel) = weak.upgrade() {
                let line = panel.customers.borrow_mut().clear();
                panel.log.append(&line);
                panel.render();
            }
        });
        panel
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn render(&self) {
        let count = self.customers.borrow().len();
        self.title.set_label(&format!("Customers ({count})"));
        while let Some(child) = self.table.first_child() {
            self.table.remove(&child);
        }
        match self.customers.borrow().table() {
            CustomerTable::Placeholder(text) => {
                let label = gtk::Label::new(Some(text));
                label.add_css_class("dim-label");
                label.set_margin_top(8);
                label.set_margin_bottom(8);
                self.table.append(&label);
            }
            CustomerTable::Rows(rows) => {
                for row in rows {
                    let line = gtk::Box::new(gtk::Orientation::Horizontal, 12);
                    line.set_margin_top(4);
                    line.set_margin_bottom(4);
                    line.set_margin_start(8);
                    line.set_margin_end(8);
                    let name = gtk::Label::new(Some(&row.name));
                    name.set_hexpand(true);
                    name.set_halign(gtk::Align::Start);
                    let phone = gtk::Label::new(Some(&row.phone));
                    phone.set_halign(gtk::Align::End);
                    line.append(&name);
                    line.append(&phone);
                    self.table.append(&line);
                }
            }
        }
    }

    fn add_manual(&self) {
        let result = self.customers.borrow_mut().add_manual(
            &self.name_entry.text(),
            &self.phone_entry.text(),
            &self.cc_entry.text(),
        );
        match result {
            Ok(line) => {
                self.log.append(&line);
                self.render();
                self.name_entry.set_text("");
                self.phone_entry.set_text("");
                self.cc_entry.set_text("");
            }
            Err(e) => dialogs::alert(&self.root, &e.to_string()),
        }
    }

    fn choose_csv(self: &Rc<Self>) {
        let parent = self
            .root
            .root()
            .and_then(|r| r.downcast::<gtk::Window>().ok());
        let chooser = gtk::FileChooserNative::new(
            Some("Load customers from CSV"),
            parent.as_ref(),
            gtk::FileChooserAction::Open,
            Some("Open"),
            Some("Cancel"),
        );
        let filter = gtk::FileFilter::new();
        filter.set_name(Some("CSV files"));
        filter.add_pattern("*.csv");
        chooser.add_filter(&filter);

        let weak = Rc::downgrade(self);
        chooser.connect_response(move |dlg, resp| {
            let Some(panel) = weak.upgrade() else {
                return;
            };
            if resp == gtk::ResponseType::Accept {
                if let Some(path) = dlg.file().and_then(|f| f.path()) {
                    match std::fs::read_to_string(&path) {
                        Ok(text) => panel.load_csv(&text),
                        Err(e) => {
                            log::error!("could not read {}: {e}", path.display());
                            panel.csv_failed();
                        }
                    }
                }
            }
            panel.chooser.replace(None);
        });
        chooser.show();
        self.chooser.replace(Some(chooser));
    }

    fn load_csv(&self, text: &str) {
        let result = self.customers.borrow_mut().load_from_csv(text);
        match result {
            Ok(line) => {
                self.log.append(&line);
                self.render();
            }
            Err(e) => {
                log::warn!("CSV import failed: {e}");
                self.csv_failed();
            }
        }
    }

    fn csv_failed(&self) {
        self.log.append(&customers::csv_failure_line());
        dialogs::alert(&self.root, "Error: Could not parse the CSV file.");
    }
}
