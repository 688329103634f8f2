use crate::conversations::HistoryView;
use gtk4::prelude::*;
use gtk4 as gtk;

pub struct ChatView {
    root: gtk::Box,
    scroller: gtk::ScrolledWindow,
    messages_box: gtk::Box,
    entry: gtk::Entry,
    send_btn: gtk::Button,
}

impl ChatView {
    pub fn new() -> Self {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .build();
        let messages_box = gtk::Box::new(gtk::Orientation::Vertical, 6);
        scroller.set_child(Some(&messages_box));
        root.append(&scroller);

        // Input row
        let input_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let entry = gtk::Entry::new();
        entry.set_hexpand(true);
        entry.set_placeholder_text(Some("Type a reply…"));
        let send_btn = gtk::Button::with_label("Send");
        send_btn.add_css_class("suggested-action");
        input_row.append(&entry);
        input_row.append(&send_btn);
        root.append(&input_row);

        let view = Self { root, scroller, messages_box, entry, send_btn };
        view.render(&HistoryView::Idle);
        view.set_reply_state(false, false);
        view
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Both the button and Enter in the entry trigger `on_send`.
    pub fn connect_send<F: Fn() + 'static>(&self, on_send: F) {
        use std::rc::Rc;
        let on_send: Rc<dyn Fn()> = Rc::new(on_send);
        {
            let on_send = on_send.clone();
            self.send_btn.connect_clicked(move |_| (on_send)());
        }
        self.entry.connect_activate(move |_| (on_send)());
    }

    pub fn text(&self) -> String {
        self.entry.text().to_string()
    }

    pub fn clear_input(&self) {
        self.entry.set_text("");
    }

    pub fn set_reply_state(&self, input_enabled: bool, send_enabled: bool) {
        self.entry.set_sensitive(input_enabled);
        self.send_btn.set_sensitive(send_enabled);
    }

    pub fn render(&self, view: &HistoryView) {
        while let Some(child) = self.messages_box.first_child() {
            self.messages_box.remove(&child);
        }
        match view {
            HistoryView::Idle => self.notice("Select a conversation.", "dim-label"),
            HistoryView::Notice(text) => self.notice(text, "dim-label"),
            HistoryView::Error(text) => self.notice(text, "error"),
            HistoryView::Messages(bubbles) => {
                for bubble in bubbles {
                    let card = gtk::Box::new(gtk::Orientation::Vertical, 2);
                    card.add_css_class("card");
                    card.set_halign(if bubble.incoming { gtk::Align::Start } else { gtk::Align::End });
                    if !bubble.incoming {
                        card.add_css_class("accent");
                    }
                    let text = gtk::Label::new(Some(&bubble.text));
                    text.set_wrap(true);
                    text.set_xalign(0.0);
                    text.set_selectable(true);
                    text.set_margin_top(6);
                    text.set_margin_start(8);
                    text.set_margin_end(8);
                    let time = gtk::Label::new(Some(&bubble.time));
                    time.add_css_class("caption");
                    time.add_css_class("dim-label");
                    time.set_xalign(0.0);
                    time.set_margin_bottom(6);
                    time.set_margin_start(8);
                    time.set_margin_end(8);
                    card.append(&text);
                    card.append(&time);
                    self.messages_box.append(&card);
                }
                let adj = self.scroller.vadjustment();
                glib::idle_add_local_once(move || adj.set_value(adj.upper() - adj.page_size()));
            }
        }
    }

    fn notice(&self, text: &str, class: &str) {
        let lbl = gtk::Label::new(Some(text));
        lbl.add_css_class(class);
        lbl.set_margin_top(12);
        lbl.set_halign(gtk::Align::Center);
        self.messages_box.append(&lbl);
    }
}
