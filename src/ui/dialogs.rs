use gtk4 as gtk;
use gtk4::prelude::*;

fn parent_window(widget: &impl IsA<gtk::Widget>) -> Option<gtk::Window> {
    widget
        .as_ref()
        .root()
        .and_then(|root| root.downcast::<gtk::Window>().ok())
}

/// Modal message with a single OK button.
pub fn alert(parent: &impl IsA<gtk::Widget>, text: &str) {
    let dialog = gtk::MessageDialog::builder()
        .modal(true)
        .message_type(gtk::MessageType::Info)
        .buttons(gtk::ButtonsType::Ok)
        .text(text)
        .build();
    if let Some(window) = parent_window(parent) {
        dialog.set_transient_for(Some(&window));
    }
    dialog.connect_response(|dlg, _| dlg.close());
    dialog.present();
}

/// Yes/No question; `on_yes` runs only on Yes.
pub fn confirm<F>(parent: &impl IsA<gtk::Widget>, text: &str, on_yes: F)
where
    F: Fn() + 'static,
{
    let dialog = gtk::MessageDialog::builder()
        .modal(true)
        .message_type(gtk::MessageType::Question)
        .buttons(gtk::ButtonsType::YesNo)
        .text(text)
        .build();
    if let Some(window) = parent_window(parent) {
        dialog.set_transient_for(Some(&window));
    }
    dialog.connect_response(move |dlg, resp| {
        dlg.close();
        if resp == gtk::ResponseType::Yes {
            on_yes();
        }
    });
    dialog.present();
}

/// Single-line text prompt; `on_submit` gets the entered text unless cancelled.
pub fn prompt<F>(parent: &impl IsA<gtk::Widget>, title: &str, on_submit: F)
where
    F: Fn(String) + 'static,
{
    let dialog = gtk::Dialog::builder().title(title).modal(true).build();
    if let Some(window) = parent_window(parent) {
        dialog.set_transient_for(Some(&window));
    }
    let entry = gtk::Entry::new();
    entry.set_hexpand(true);
    entry.set_activates_default(true);
    entry.set_margin_top(12);
    entry.set_margin_bottom(12);
    entry.set_margin_start(12);
    entry.set_margin_end(12);
    dialog.content_area().append(&entry);

    let _ = dialog.add_button("Cancel", gtk::ResponseType::Cancel);
    let ok_btn = dialog.add_button("Save", gtk::ResponseType::Ok);
    ok_btn.add_css_class("suggested-action");
    dialog.set_default_response(gtk::ResponseType::Ok);

    dialog.connect_response(move |dlg, resp| {
        let text = entry.text().to_string();
        dlg.close();
        if resp == gtk::ResponseType::Ok {
            on_submit(text);
        }
    });
    dialog.present();
}
