// router module: forwards client messages to the task backend

pub mod backend;
mod interface;
pub mod stub;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};

pub use backend::BackendRouter;
pub use interface::{
    ImportOutcome, ImportRequest, Message, Port, Request, Response, RouterHandle, SIDEPANEL_PORT,
};
pub use stub::StubRouter;

/// Trait implemented by both `BackendRouter` and `StubRouter`.
///
/// `handle` turns one message into its one response. It returns a
/// `Response`, not a `Result`: failures must already be folded into the
/// failure shape for the message's tag.
pub trait Router: Send + Sync + 'static {
    fn handle(&self, message: Message) -> impl Future<Output = Response> + Send;

    /// Start serving on the current Tokio runtime.
    fn spawn(self) -> RouterHandle
    where
        Self: Sized,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Request>();
        let open_panels = Arc::new(AtomicUsize::new(0));
        let handle = RouterHandle::new(tx, Arc::clone(&open_panels));
        tokio::spawn(run_loop(Arc::new(self), rx, open_panels));
        handle
    }
}

async fn run_loop<R: Router>(
    router: Arc<R>,
    mut rx: mpsc::UnboundedReceiver<Request>,
    open_panels: Arc<AtomicUsize>,
) {
    tracing::info!("router: started");
    while let Some(req) = rx.recv().await {
        match req {
            Request::Dispatch { message, reply_tx } => {
                tokio::spawn(dispatch(Arc::clone(&router), message, reply_tx));
            }
            Request::Connect { name, closed_rx } => {
                watch_port(name, closed_rx, Arc::clone(&open_panels));
            }
            Request::Shutdown => break,
        }
    }
    tracing::info!("router: shutting down");
}

/// Serve one message on its own task so a slow backend call never holds up
/// the others. Exactly one response is sent, even if the handler panics.
async fn dispatch<R: Router>(
    router: Arc<R>,
    message: Message,
    reply_tx: oneshot::Sender<Response>,
) {
    let tag = message.tag();
    tracing::debug!("router: received {tag}");
    let fallback = message.failure_response("internal router error");

    let response = match tokio::spawn(async move { router.handle(message).await }).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("router: {tag} handler failed: {e}");
            fallback
        }
    };

    if reply_tx.send(response).is_err() {
        tracing::debug!("router: {tag} requester went away, response discarded");
    }
}

fn watch_port(name: String, closed_rx: oneshot::Receiver<()>, open_panels: Arc<AtomicUsize>) {
    if name != SIDEPANEL_PORT {
        tracing::debug!("router: ignoring port {name:?}");
        return;
    }
    open_panels.fetch_add(1, Ordering::SeqCst);
    tracing::info!("router: side panel opened");
    tokio::spawn(async move {
        // Resolves with an error once the panel drops its end.
        let _ = closed_rx.await;
        open_panels.fetch_sub(1, Ordering::SeqCst);
        tracing::info!("router: side panel closed");
    });
}
