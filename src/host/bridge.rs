//! Background bridge for non-blocking host calls.
//!
//! The UI loop submits [`HostRequest`]s tagged with a [`Ticket`]. Each call
//! runs on the bridge's tokio runtime and its outcome comes back as a
//! [`HostReply`] carrying the same ticket. Replies are drained with
//! [`HostBridge::poll`] once per frame, so every continuation runs on the UI
//! thread, one at a time.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

use super::{ExtensionId, ExtensionRecord, Host, HostError, TabFilter, TabId, TabRecord};

/// Worker threads for the bridge runtime.
const BRIDGE_WORKER_THREADS: usize = 2;

/// Correlates a request with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// A single host API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    EnumerateExtensions,
    SetEnabled { id: ExtensionId, enabled: bool },
    EnumerateTabs(TabFilter),
    ReloadTab(TabId),
    ActivateTab(TabId),
}

/// A call plus the ticket its reply will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRequest {
    pub ticket: Ticket,
    pub call: HostCall,
}

/// Outcome of a host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResult {
    Extensions(Result<Vec<ExtensionRecord>, HostError>),
    Tabs(Result<Vec<TabRecord>, HostError>),
    /// Completion of a call with no payload.
    Done(Result<(), HostError>),
}

/// Completion delivered back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReply {
    pub ticket: Ticket,
    pub result: HostResult,
}

type ResultFuture = Pin<Box<dyn Future<Output = HostResult> + Send + 'static>>;

/// Runs host calls off the UI thread and queues their replies.
pub struct HostBridge {
    /// Host being driven.
    host: Arc<dyn Host>,
    /// Runtime the calls run on.
    runtime: Arc<Runtime>,
    /// Cloned into every spawned call.
    reply_tx: UnboundedSender<HostReply>,
    /// Drained by the UI loop.
    reply_rx: UnboundedReceiver<HostReply>,
    /// Calls submitted but not yet replied to.
    in_flight: Arc<AtomicUsize>,
}

impl HostBridge {
    /// Creates a bridge with its own runtime.
    ///
    /// # Errors
    /// Returns error if the runtime cannot be built.
    pub fn new(host: Arc<dyn Host>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(BRIDGE_WORKER_THREADS)
            .enable_all()
            .thread_name("host-bridge")
            .build()?;

        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        info!("[HOST-BRIDGE] Started for {}", host.self_identifier());

        Ok(Self {
            host,
            runtime: Arc::new(runtime),
            reply_tx,
            reply_rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Identifier of the extension hosting the popup.
    #[must_use]
    pub fn self_identifier(&self) -> ExtensionId {
        self.host.self_identifier()
    }

    /// Starts a host call. Non-blocking; the reply arrives via [`Self::poll`].
    pub fn submit(&self, request: HostRequest) {
        debug!("[HOST-BRIDGE] Submit {:?}: {:?}", request.ticket, request.call);

        let ticket = request.ticket;
        let call = self.start_call(request.call);
        let reply_tx = self.reply_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        in_flight.fetch_add(1, Ordering::SeqCst);
        self.runtime.spawn(async move {
            let result = call.await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if reply_tx.send(HostReply { ticket, result }).is_err() {
                debug!("[HOST-BRIDGE] Reply for {:?} dropped, bridge closed", ticket);
            }
        });
    }

    /// Starts every request in order.
    pub fn submit_all(&self, requests: impl IntoIterator<Item = HostRequest>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Returns the next queued reply, if any.
    pub fn poll(&mut self) -> Option<HostReply> {
        match self.reply_rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("[HOST-BRIDGE] Reply channel disconnected");
                None
            }
        }
    }

    /// Number of calls still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Creates the host future for a call, wrapped to yield a [`HostResult`].
    fn start_call(&self, call: HostCall) -> ResultFuture {
        match call {
            HostCall::EnumerateExtensions => {
                let future = self.host.enumerate_extensions();
                Box::pin(async move { HostResult::Extensions(future.await) })
            }
            HostCall::SetEnabled { id, enabled } => {
                let future = self.host.set_extension_enabled(&id, enabled);
                Box::pin(async move { HostResult::Done(future.await) })
            }
            HostCall::EnumerateTabs(filter) => {
                let future = self.host.enumerate_tabs(filter);
                Box::pin(async move { HostResult::Tabs(future.await) })
            }
            HostCall::ReloadTab(id) => {
                let future = self.host.reload_tab(id);
                Box::pin(async move { HostResult::Done(future.await) })
            }
            HostCall::ActivateTab(id) => {
                let future = self.host.set_tab_active(id);
                Box::pin(async move { HostResult::Done(future.await) })
            }
        }
    }
}
