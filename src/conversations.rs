//! Conversation browser state.
//!
//! Every history fetch carries a [`HistoryTicket`]; only the ticket issued
//! last is allowed to change the history pane, so a slow response for an
//! earlier selection can never overwrite a later one.

use crate::api::client::ApiClient;
use crate::api::models::Message;
use crate::error::ApiError;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

pub const NO_CONVERSATIONS: &str = "No conversations found.";
pub const CONVERSATIONS_ERROR: &str = "Error loading conversations.";
pub const LOADING_MESSAGES: &str = "Loading messages...";
pub const NO_MESSAGES: &str = "No messages in this conversation.";
pub const MESSAGES_ERROR: &str = "Error loading messages.";
pub const REPLY_FAILED: &str = "Failed to send reply.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    pub sender_id: String,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTicket {
    pub sender_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationItem {
    pub sender_id: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationListView {
    Items(Vec<ConversationItem>),
    Notice(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub text: String,
    pub time: String,
    pub incoming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Idle,
    Notice(&'static str),
    Error(&'static str),
    Messages(Vec<MessageBubble>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Input should be cleared; the history is reloaded with this ticket.
    Sent(Option<HistoryTicket>),
    Failed(String),
}

impl ReplyOutcome {
    /// Only a reply to the still-open conversation clears the input; after a
    /// switch the entry holds a draft for the new one.
    pub fn clears_input(&self) -> bool {
        matches!(self, ReplyOutcome::Sent(Some(_)))
    }
}

#[derive(Debug)]
pub struct ConversationBrowser {
    senders: Vec<String>,
    list_failed: bool,
    selected: Option<String>,
    generation: u64,
    history: HistoryView,
    reply_enabled: bool,
    sending: bool,
}

impl Default for ConversationBrowser {
    fn default() -> Self {
        Self {
            senders: Vec::new(),
            list_failed: false,
            selected: None,
            generation: 0,
            history: HistoryView::Idle,
            reply_enabled: false,
            sending: false,
        }
    }
}

impl ConversationBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    pub fn reply_enabled(&self) -> bool {
        self.reply_enabled
    }

    /// Whether the send control should accept clicks.
    pub fn send_enabled(&self) -> bool {
        self.reply_enabled && !self.sending
    }

    /// Applies a poll of the conversation list. The open history is untouched.
    pub fn set_conversations(&mut self, result: Result<Vec<String>, ApiError>) {
        match result {
            Ok(senders) => {
                self.senders = senders;
                self.list_failed = false;
            }
            Err(e) => {
                log::error!("failed to fetch conversations: {e}");
                self.senders.clear();
                self.list_failed = true;
            }
        }
    }

    pub fn list_view(&self) -> ConversationListView {
        if self.list_failed {
            return ConversationListView::Notice(CONVERSATIONS_ERROR);
        }
        if self.senders.is_empty() {
            return ConversationListView::Notice(NO_CONVERSATIONS);
        }
        ConversationListView::Items(
            self.senders
                .iter()
                .map(|id| ConversationItem {
                    sender_id: id.clone(),
                    active: self.selected.as_deref() == Some(id.as_str()),
                })
                .collect(),
        )
    }

    pub fn sender_at(&self, index: usize) -> Option<&str> {
        self.senders.get(index).map(String::as_str)
    }

    fn issue(&mut self, sender_id: &str) -> HistoryTicket {
        self.generation += 1;
        HistoryTicket {
            sender_id: sender_id.to_string(),
            generation: self.generation,
        }
    }

    pub fn select(&mut self, sender_id: &str) -> HistoryTicket {
        self.selected = Some(sender_id.to_string());
        self.history = HistoryView::Notice(LOADING_MESSAGES);
        self.reply_enabled = false;
        self.issue(sender_id)
    }

    /// Applies a history response. Returns `false` when the ticket is stale.
    pub fn apply_history(
        &mut self,
        ticket: &HistoryTicket,
        result: Result<Vec<Message>, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation
            || self.selected.as_deref() != Some(ticket.sender_id.as_str())
        {
            log::debug!("discarding stale history for {}", ticket.sender_id);
            return false;
        }
        match result {
            Ok(messages) => {
                self.history = history_view(messages);
                self.reply_enabled = true;
            }
            Err(e) => {
                log::error!("failed to load messages for {}: {e}", ticket.sender_id);
                self.history = HistoryView::Error(MESSAGES_ERROR);
                self.reply_enabled = false;
            }
        }
        true
    }

    /// Starts a reply. `None` when there is nothing to send, nothing selected,
    /// or a send is already in flight.
    pub fn begin_reply(&mut self, text: &str) -> Option<ReplyTicket> {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return None;
        }
        let sender_id = self.selected.clone()?;
        self.sending = true;
        Some(ReplyTicket {
            sender_id,
            text: text.to_string(),
        })
    }

    pub fn finish_reply(&mut self, ticket: &ReplyTicket, result: Result<(), ApiError>) -> ReplyOutcome {
        self.sending = false;
        match result {
            Ok(()) => {
                let reload = (self.selected.as_deref() == Some(ticket.sender_id.as_str()))
                    .then(|| self.issue(&ticket.sender_id));
                ReplyOutcome::Sent(reload)
            }
            Err(e) => {
                log::error!("reply to {} failed: {e}", ticket.sender_id);
                ReplyOutcome::Failed(REPLY_FAILED.to_string())
            }
        }
    }
}

pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Local));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Oldest first. Server order is kept unless every timestamp parses.
pub fn history_view(mut messages: Vec<Message>) -> HistoryView {
    if messages.is_empty() {
        return HistoryView::Notice(NO_MESSAGES);
    }
    let keys: Option<Vec<DateTime<Local>>> =
        messages.iter().map(|m| parse_timestamp(&m.timestamp)).collect();
    if let Some(keys) = keys {
        let mut keyed: Vec<_> = keys.into_iter().zip(messages).collect();
        keyed.sort_by_key(|(k, _)| *k);
        messages = keyed.into_iter().map(|(_, m)| m).collect();
    }
    HistoryView::Messages(
        messages
            .into_iter()
            .map(|m| MessageBubble {
                incoming: m.is_incoming(),
                time: format_timestamp(&m.timestamp),
                text: m.text,
            })
            .collect(),
    )
}

pub async fn load_history(api: &ApiClient, ticket: HistoryTicket) -> (HistoryTicket, Result<Vec<Message>, ApiError>) {
    let result = api.history(&ticket.sender_id).await;
    (ticket, result)
}

pub async fn send_reply(api: &ApiClient, ticket: ReplyTicket) -> (ReplyTicket, Result<(), ApiError>) {
    let result = api.reply(&ticket.sender_id, &ticket.text).await;
    (ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn msg(text: &str, timestamp: &str, direction: &str) -> Message {
        Message {
            text: text.into(),
            timestamp: timestamp.into(),
            direction: direction.into(),
        }
    }

    fn texts(view: &HistoryView) -> Vec<String> {
        match view {
            HistoryView::Messages(bubbles) => bubbles.iter().map(|b| b.text.clone()).collect(),
            other => panic!("expected messages, got {other:?}"),
        }
    }

    #[test]
    fn late_response_for_earlier_selection_is_dropped() {
        let mut browser = ConversationBrowser::new();
        let c1 = browser.select("C1");
        let c2 = browser.select("C2");

        assert!(browser.apply_history(&c2, Ok(vec![msg("from c2", "2024-01-01 10:00:00", "incoming")])));
        assert!(!browser.apply_history(&c1, Ok(vec![msg("from c1", "2024-01-01 09:00:00", "incoming")])));

        assert_eq!(texts(browser.history()), vec!["from c2"]);
        assert_eq!(browser.selected(), Some("C2"));
    }

    #[test]
    fn selection_disables_reply_until_loaded() {
        let mut browser = ConversationBrowser::new();
        let t = browser.select("C1");
        assert_eq!(browser.history(), &HistoryView::Notice(LOADING_MESSAGES));
        assert!(!browser.reply_enabled());

        browser.apply_history(&t, Err(ApiError::BaseUrl));
        assert_eq!(browser.history(), &HistoryView::Error(MESSAGES_ERROR));
        assert!(!browser.reply_enabled());

        let t = browser.select("C1");
        browser.apply_history(&t, Ok(vec![]));
        assert_eq!(browser.history(), &HistoryView::Notice(NO_MESSAGES));
        assert!(browser.reply_enabled());
    }

    #[test]
    fn poll_keeps_highlight_and_history() {
        let mut browser = ConversationBrowser::new();
        browser.set_conversations(Ok(vec!["A".into(), "B".into()]));
        let t = browser.select("B");
        browser.apply_history(&t, Ok(vec![msg("hi", "2024-01-01 10:00:00", "incoming")]));

        browser.set_conversations(Ok(vec!["B".into(), "C".into()]));
        assert_eq!(
            browser.list_view(),
            ConversationListView::Items(vec![
                ConversationItem { sender_id: "B".into(), active: true },
                ConversationItem { sender_id: "C".into(), active: false },
            ])
        );
        assert_eq!(texts(browser.history()), vec!["hi"]);

        browser.set_conversations(Ok(vec![]));
        assert_eq!(browser.list_view(), ConversationListView::Notice(NO_CONVERSATIONS));
        browser.set_conversations(Err(ApiError::BaseUrl));
        assert_eq!(browser.list_view(), ConversationListView::Notice(CONVERSATIONS_ERROR));
        assert_eq!(texts(browser.history()), vec!["hi"]);
    }

    #[test]
    fn history_sorted_oldest_first() {
        let view = history_view(vec![
            msg("second", "2024-01-01T10:05:00Z", "outgoing"),
            msg("first", "2024-01-01T10:00:00Z", "incoming"),
        ]);
        assert_eq!(texts(&view), vec!["first", "second"]);

        let unparsed = history_view(vec![
            msg("b", "later", "outgoing"),
            msg("a", "2024-01-01 10:00:00", "incoming"),
        ]);
        assert_eq!(texts(&unparsed), vec!["b", "a"]);
    }

    #[test]
    fn reply_guards() {
        let mut browser = ConversationBrowser::new();
        assert!(browser.begin_reply("hello").is_none());

        let t = browser.select("C1");
        browser.apply_history(&t, Ok(vec![]));
        assert!(browser.begin_reply("   ").is_none());

        let ticket = browser.begin_reply(" hello ").unwrap();
        assert_eq!(ticket.text, "hello");
        assert!(!browser.send_enabled());
        assert!(browser.begin_reply("again").is_none());

        let outcome = browser.finish_reply(&ticket, Err(ApiError::BaseUrl));
        assert_eq!(outcome, ReplyOutcome::Failed(REPLY_FAILED.into()));
        assert!(browser.send_enabled());
    }

    #[test]
    fn reply_landing_after_switch_keeps_new_draft() {
        let mut browser = ConversationBrowser::new();
        let t = browser.select("C1");
        browser.apply_history(&t, Ok(vec![]));
        let ticket = browser.begin_reply("see you").unwrap();

        browser.select("C2");
        let outcome = browser.finish_reply(&ticket, Ok(()));
        assert_eq!(outcome, ReplyOutcome::Sent(None));
        assert!(!outcome.clears_input());

        let t = browser.select("C2");
        browser.apply_history(&t, Ok(vec![]));
        let ticket = browser.begin_reply("hi").unwrap();
        let outcome = browser.finish_reply(&ticket, Ok(()));
        assert!(outcome.clears_input());
        assert!(!ReplyOutcome::Failed(REPLY_FAILED.into()).clears_input());
    }

    #[tokio::test]
    async fn reply_then_reload_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversations/C1/reply"))
            .and(body_json(serde_json::json!({"message": "Thanks!"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/conversations/C1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"text": "Hi", "timestamp": "2024-01-01 10:00:00", "direction": "incoming"},
                {"text": "Thanks!", "timestamp": "2024-01-01 10:01:00", "direction": "outgoing"}
            ])))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut browser = ConversationBrowser::new();
        let (t, res) = load_history(&api, browser.select("C1")).await;
        browser.apply_history(&t, res);

        let ticket = browser.begin_reply("Thanks!").unwrap();
        let (ticket, res) = send_reply(&api, ticket).await;
        let ReplyOutcome::Sent(Some(reload)) = browser.finish_reply(&ticket, res) else {
            panic!("reply should succeed and reload");
        };
        let (t, res) = load_history(&api, reload).await;
        assert!(browser.apply_history(&t, res));
        let first = browser.history().clone();
        assert_eq!(texts(&first), vec!["Hi", "Thanks!"]);

        let (t, res) = load_history(&api, browser.select("C1")).await;
        browser.apply_history(&t, res);
        assert_eq!(browser.history(), &first);
    }

    #[tokio::test]
    async fn concurrent_fetches_render_latest_selection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations/C1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([
                        {"text": "old", "timestamp": "2024-01-01 09:00:00", "direction": "incoming"}
                    ]))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/conversations/C2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"text": "new", "timestamp": "2024-01-01 10:00:00", "direction": "incoming"}
            ])))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let mut browser = ConversationBrowser::new();
        let c1 = browser.select("C1");
        let c2 = browser.select("C2");
        let slow = tokio::spawn({
            let api = api.clone();
            async move { load_history(&api, c1).await }
        });
        let (t2, r2) = load_history(&api, c2).await;
        browser.apply_history(&t2, r2);
        let (t1, r1) = slow.await.unwrap();
        browser.apply_history(&t1, r1);

        assert_eq!(texts(browser.history()), vec!["new"]);
    }
}
