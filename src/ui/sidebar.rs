use crate::conversations::ConversationListView;
use gtk4::prelude::*;
use gtk4 as gtk;

pub struct Sidebar {
    root: gtk::Box,
    list: gtk::ListBox,
}

impl Sidebar {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        root.set_size_request(220, -1);

        let title = gtk::Label::new(Some("Conversations"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);

        let list = gtk::ListBox::new();
        list.add_css_class("navigation-sidebar");
        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .child(&list)
            .build();
        root.append(&scroller);

        Self { root, list }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Calls `on_activate` with the index of the clicked conversation.
    pub fn connect_activated<F: Fn(usize) + 'static>(&self, on_activate: F) {
        self.list.connect_row_activated(move |_, row| {
            if let Ok(index) = usize::try_from(row.index()) {
                on_activate(index);
            }
        });
    }

    pub fn render(&self, view: &ConversationListView) {
        while let Some(child) = self.list.first_child() {
            self.list.remove(&child);
        }
        match view {
            ConversationListView::Notice(text) => {
                let row = Self::row(text);
                row.set_activatable(false);
                row.set_selectable(false);
                self.list.append(&row);
            }
            ConversationListView::Items(items) => {
                for item in items {
                    let row = Self::row(&item.sender_id);
                    self.list.append(&row);
                    if item.active {
                        self.list.select_row(Some(&row));
                    }
                }
            }
        }
    }

    fn row(text: &str) -> gtk::ListBoxRow {
        let row = gtk::ListBoxRow::new();
        let label = gtk::Label::new(Some(text));
        label.set_margin_top(8);
        label.set_margin_bottom(8);
        label.set_margin_start(8);
        label.set_margin_end(8);
        label.set_halign(gtk::Align::Start);
        row.set_child(Some(&label));
        row
    }
}
