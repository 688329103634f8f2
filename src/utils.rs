use once_cell::sync::Lazy;
use std::cell::Cell;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

pub fn main_channel<T>() -> (UnboundedSender<T>, UnboundedReceiver<T>) {
    unbounded_channel()
}

/// Hands every value from `rx` to `on_item` on the GTK main loop, until the
/// channel closes or `on_item` breaks.
pub fn attach_receiver<T, F>(mut rx: UnboundedReceiver<T>, mut on_item: F)
where
    T: 'static,
    F: FnMut(T) -> glib::ControlFlow + 'static,
{
    glib::spawn_future_local(async move {
        while let Some(item) = rx.recv().await {
            if matches!(on_item(item), glib::ControlFlow::Break) {
                break;
            }
        }
    });
}

/// Runs `fut` on the runtime and hands its output to `on_done` on the GTK main loop.
pub fn run_then<T, Fut, F>(fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let task = RUNTIME.spawn(fut);
    glib::spawn_future_local(async move {
        match task.await {
            Ok(res) => on_done(res),
            Err(e) => log::error!("background task failed: {e}"),
        }
    });
}

/// Single-flight flag for UI actions that must not overlap.
#[derive(Debug, Default)]
pub struct InFlight(Cell<bool>);

impl InFlight {
    /// `false` when the action is already running.
    pub fn begin(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn finish(&self) {
        self.0.set(false);
    }
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
