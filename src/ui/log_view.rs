use crate::api::events::{LogLine, LogStatus};
use gtk4 as gtk;
use gtk4::prelude::*;

/// Append-only live log, auto-scrolled to the newest line.
pub struct LogView {
    root: gtk::Box,
    view: gtk::TextView,
    buffer: gtk::TextBuffer,
    end: gtk::TextMark,
}

impl LogView {
    pub fn new() -> Self {
        let buffer = gtk::TextBuffer::new(None);
        for (status, color) in [
            (LogStatus::Info, "#1c71d8"),
            (LogStatus::Success, "#26a269"),
            (LogStatus::Warning, "#c64600"),
            (LogStatus::Error, "#c01c28"),
        ] {
            buffer.create_tag(Some(status.css_class()), &[("foreground", &color)]);
        }
        let end = buffer.create_mark(None, &buffer.end_iter(), false);

        let view = gtk::TextView::with_buffer(&buffer);
        view.set_editable(false);
        view.set_cursor_visible(false);
        view.set_monospace(true);
        view.set_wrap_mode(gtk::WrapMode::WordChar);

        let scroller = gtk::ScrolledWindow::builder()
            .vexpand(true)
            .hexpand(true)
            .min_content_height(160)
            .child(&view)
            .build();

        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.set_margin_top(8);
        root.set_margin_bottom(8);
        root.set_margin_start(8);
        root.set_margin_end(8);
        let title = gtk::Label::new(Some("Live Log"));
        title.add_css_class("heading");
        title.set_halign(gtk::Align::Start);
        root.append(&title);
        root.append(&scroller);

        Self { root, view, buffer, end }
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    pub fn append(&self, line: &LogLine) {
        let text = if self.buffer.char_count() == 0 {
            line.render()
        } else {
            format!("\n{}", line.render())
        };
        let mut iter = self.buffer.end_iter();
        self.buffer
            .insert_with_tags_by_name(&mut iter, &text, &[line.status.css_class()]);
        self.view.scroll_mark_onscreen(&self.end);
    }
}
