//! Live log stream: a reconnecting WebSocket client for `/ws/log`.
//!
//! [`LogStream`] is the connection state machine. [`run`] drives it over a
//! [`Transport`], pausing between attempts through a [`Sleeper`], and pushes
//! every resulting line into a [`LogSink`] until the sink goes away.

use crate::api::events::{LogEvent, LogLine};
use futures_util::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

pub const CONNECTED_MESSAGE: &str = "Connected to backend log...";
pub const CONNECTION_LOST_MESSAGE: &str = "Connection lost. Attempting to reconnect...";

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("connect: {0}")]
    Connect(String),
    #[error("read: {0}")]
    Read(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Disconnected,
    Connecting,
    Open,
}

#[derive(Debug)]
pub struct LogStream {
    state: StreamState,
    delay: Duration,
    reconnects: u64,
}

impl LogStream {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: StreamState::Disconnected,
            delay,
            reconnects: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Reconnects scheduled so far.
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Moves to `Connecting`. Refused while a connection is connecting or open.
    pub fn begin_connect(&mut self) -> bool {
        if self.state != StreamState::Disconnected {
            log::debug!("log stream already {:?}, not connecting again", self.state);
            return false;
        }
        self.state = StreamState::Connecting;
        true
    }

    pub fn opened(&mut self) -> LogLine {
        self.state = StreamState::Open;
        LogLine::success(CONNECTED_MESSAGE)
    }

    /// Turns one text frame into a log line; frames received outside `Open`
    /// or that do not parse are dropped.
    pub fn receive(&self, frame: &str) -> Option<LogLine> {
        if self.state != StreamState::Open {
            return None;
        }
        match serde_json::from_str::<LogEvent>(frame) {
            Ok(event) => Some(event.into()),
            Err(e) => {
                log::debug!("ignoring unparseable log frame: {e}");
                None
            }
        }
    }

    /// Handles a close (or failed connect) and returns the warning line plus
    /// the delay before the single reconnect attempt.
    pub fn closed(&mut self) -> (LogLine, Duration) {
        self.state = StreamState::Disconnected;
        self.reconnects += 1;
        (LogLine::warning(CONNECTION_LOST_MESSAGE), self.delay)
    }
}

#[allow(async_fn_in_trait)]
pub trait Connection {
    /// Next text frame; `None` once the peer closed.
    async fn next_frame(&mut self) -> Option<Result<String, StreamError>>;
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    type Conn: Connection;

    async fn connect(&self, url: &Url) -> Result<Self::Conn, StreamError>;
}

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Error)]
#[error("log sink closed")]
pub struct SinkClosed;

pub trait LogSink {
    fn push(&self, line: LogLine) -> Result<(), SinkClosed>;
}

impl LogSink for tokio::sync::mpsc::UnboundedSender<LogLine> {
    fn push(&self, line: LogLine) -> Result<(), SinkClosed> {
        self.send(line).map_err(|_| SinkClosed)
    }
}

pub struct WsTransport;

pub struct WsConnection {
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
}

impl Transport for WsTransport {
    type Conn = WsConnection;

    async fn connect(&self, url: &Url) -> Result<WsConnection, StreamError> {
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        Ok(WsConnection { stream })
    }
}

impl Connection for WsConnection {
    async fn next_frame(&mut self) -> Option<Result<String, StreamError>> {
        loop {
            match self.stream.next().await? {
                Ok(WsMessage::Text(text)) => return Some(Ok(text)),
                Ok(WsMessage::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(StreamError::Read(e.to_string()))),
            }
        }
    }
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// A spawned [`run`] driver. Stopping or dropping it aborts the task, which
/// closes its connection with it.
pub struct StreamHandle {
    task: tokio::task::JoinHandle<()>,
}

impl StreamHandle {
    pub fn spawn<F>(runtime: &tokio::runtime::Handle, driver: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: runtime.spawn(driver),
        }
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connects, forwards lines, and reconnects after every close, forever or
/// until `sink` rejects a line.
pub async fn run<T, S, K>(url: Url, transport: T, sleeper: S, sink: K, delay: Duration)
where
    T: Transport,
    S: Sleeper,
    K: LogSink,
{
    let mut stream = LogStream::new(delay);
    loop {
        if !stream.begin_connect() {
            return;
        }
        log::info!("connecting log stream to {url}");
        match transport.connect(&url).await {
            Ok(mut conn) => {
                if sink.push(stream.opened()).is_err() {
                    return;
                }
                while let Some(frame) = conn.next_frame().await {
                    match frame {
                        Ok(text) => {
                            if let Some(line) = stream.receive(&text) {
                                if sink.push(line).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => {
                            log::warn!("log stream error: {e}");
                            break;
                        }
                    }
                }
            }
            Err(e) => log::warn!("log stream unavailable: {e}"),
        }
        let (line, wait) = stream.closed();
        if sink.push(line).is_err() {
            return;
        }
        sleeper.sleep(wait).await;
    }
}
