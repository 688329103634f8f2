use crate::api::client::ApiClient;
use crate::conversations::{self, ConversationBrowser, HistoryTicket, ReplyOutcome};
use crate::ui::chat_view::ChatView;
use crate::ui::dialogs;
use crate::ui::sidebar::Sidebar;
use crate::utils::run_then;
use gtk4 as gtk;
use gtk4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Conversation list plus the selected thread, kept in sync with the backend.
pub struct Inbox {
    root: gtk::Paned,
    sidebar: Sidebar,
    chat: ChatView,
    state: RefCell<ConversationBrowser>,
    api: ApiClient,
}

impl Inbox {
    pub fn new(api: ApiClient) -> Rc<Self> {
        let sidebar = Sidebar::new();
        let chat = ChatView::new();
        let root = gtk::Paned::new(gtk::Orientation::Horizontal);
        root.set_start_child(Some(&sidebar.widget()));
        root.set_end_child(Some(&chat.widget()));
        root.set_shrink_start_child(false);

        let inbox = Rc::new(Self {
            root,
            sidebar,
            chat,
            state: RefCell::new(ConversationBrowser::new()),
            api,
        });
        let weak = Rc::downgrade(&inbox);
        inbox.sidebar.connect_activated(move |index| {
            if let Some(inbox) = weak.upgrade() {
                inbox.select(index);
            }
        });
        let weak = Rc::downgrade(&inbox);
        inbox.chat.connect_send(move || {
            if let Some(inbox) = weak.upgrade() {
                inbox.send_reply();
            }
        });
        inbox
    }

    pub fn widget(&self) -> gtk::Widget {
        self.root.clone().upcast()
    }

    /// Fetches the list now and then every `interval_secs`.
    pub fn start_polling(self: &Rc<Self>, interval_secs: u64) -> glib::SourceId {
        self.refresh_list();
        let weak = Rc::downgrade(self);
        glib::timeout_add_seconds_local(interval_secs.max(1) as u32, move || match weak.upgrade() {
            Some(inbox) => {
                inbox.refresh_list();
                glib::ControlFlow::Continue
            }
            None => glib::ControlFlow::Break,
        })
    }

    pub fn refresh_list(self: &Rc<Self>) {
        let api = self.api.clone();
        let inbox = self.clone();
        run_then(async move { api.conversations().await }, move |res| {
            let view = {
                let mut state = inbox.state.borrow_mut();
                state.set_conversations(res);
                state.list_view()
            };
            inbox.sidebar.render(&view);
        });
    }

    fn render_thread(&self) {
        let state = self.state.borrow();
        self.chat.render(state.history());
        self.chat
            .set_reply_state(state.reply_enabled(), state.send_enabled());
    }

    fn select(self: &Rc<Self>, index: usize) {
        let ticket = {
            let mut state = self.state.borrow_mut();
            let Some(sender_id) = state.sender_at(index).map(str::to_string) else {
                return;
            };
            state.select(&sender_id)
        };
        self.render_thread();
        self.fetch_history(ticket);
    }

    fn fetch_history(self: &Rc<Self>, ticket: HistoryTicket) {
        let api = self.api.clone();
        let inbox = self.clone();
        run_then(
            async move { conversations::load_history(&api, ticket).await },
            move |(ticket, res)| {
                let applied = inbox.state.borrow_mut().apply_history(&ticket, res);
                if applied {
                    inbox.render_thread();
                }
            },
        );
    }

    fn send_reply(self: &Rc<Self>) {
        let text = self.chat.text();
        let ticket = self.state.borrow_mut().begin_reply(&text);
        let Some(ticket) = ticket else {
            return;
        };
        self.render_thread();

        let api = self.api.clone();
        let inbox = self.clone();
        run_then(
            async move { conversations::send_reply(&api, ticket).await },
            move |(ticket, res)| {
                let outcome = inbox.state.borrow_mut().finish_reply(&ticket, res);
                inbox.render_thread();
                if outcome.clears_input() {
                    inbox.chat.clear_input();
                }
                match outcome {
                    ReplyOutcome::Sent(Some(reload)) => inbox.fetch_history(reload),
                    ReplyOutcome::Sent(None) => {}
                    ReplyOutcome::Failed(message) => dialogs::alert(&inbox.chat.widget(), &message),
                }
            },
        );
    }
}
