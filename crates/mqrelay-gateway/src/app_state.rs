//! Shared application state for the mqrelay gateway.
//!
//! Built once at startup from an explicit config struct — no environment
//! lookups or global singletons past this point.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use mqrelay_core::envelope::MessageType;
use mqrelay_core::error::Result;
use mqrelay_core::routing::{route, ChannelKind};

use crate::config::RelayConfig;
use crate::consume::Poller;
use crate::dispatch::Dispatcher;
use crate::queue::Broker;
use crate::runtime::{ActionLog, HandlerCtx, NotifySink, PlayerDirectory, SessionBoard};
use crate::services::{DiscordNotifyService, McBridgeService, WebSessionService};
use crate::sign::Verifier;

const FAIL_FAST_ON_UNHANDLED_TYPE: bool = false; // if changed to true, boot fails.

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RelayConfig,
    broker: Arc<Broker>,
    verifier: Verifier,
    dispatcher: Arc<Dispatcher>,
    ctx: HandlerCtx,
}

impl AppState {
    /// Build application state. Returns Result so main can handle errors
    /// gracefully (no panic).
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        let broker = Arc::new(Broker::new(&cfg.queue));
        let verifier = Verifier::new(&cfg.auth);

        let dispatcher = Arc::new(Dispatcher::new());
        dispatcher.register(Arc::new(DiscordNotifyService::new()));
        dispatcher.register(Arc::new(McBridgeService::new()));
        dispatcher.register(Arc::new(WebSessionService::new()));

        // routing table <-> dispatcher sanity check
        for kind in MessageType::ALL {
            if !dispatcher.has(kind) {
                tracing::warn!(
                    msg_type = kind.as_str(),
                    channel = %route(kind),
                    "routable type has no registered handler"
                );
                if FAIL_FAST_ON_UNHANDLED_TYPE {
                    return Err(mqrelay_core::RelayError::Internal(format!(
                        "no handler registered for routable type: {}",
                        kind.as_str()
                    )));
                }
            }
        }

        let ctx = HandlerCtx::new(
            Arc::clone(&broker),
            Arc::new(NotifySink::new()),
            Arc::new(PlayerDirectory::new()),
            Arc::new(SessionBoard::new()),
            Arc::new(ActionLog::new()),
            cfg.ingress.mc_to_web_source.as_str(),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                broker,
                verifier,
                dispatcher,
                ctx,
            }),
        })
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.inner.broker
    }

    pub fn verifier(&self) -> &Verifier {
        &self.inner.verifier
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.inner.dispatcher
    }

    /// Handler context shared by all pollers (and by tests for inspection).
    pub fn handler_ctx(&self) -> &HandlerCtx {
        &self.inner.ctx
    }

    /// Producer identity stamped as the `source` attribute for a path.
    pub fn source_for(&self, kind: ChannelKind) -> &str {
        let ingress = &self.inner.cfg.ingress;
        match kind {
            ChannelKind::Discord => &ingress.discord_source,
            ChannelKind::WebToMc => &ingress.web_to_mc_source,
            ChannelKind::McToWeb => &ingress.mc_to_web_source,
        }
    }

    /// One poller per channel, each on its own task.
    pub fn spawn_pollers(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        ChannelKind::ALL
            .into_iter()
            .map(|kind| self.spawn_poller(kind, shutdown.clone()))
            .collect()
    }

    /// Spawn the poller for a single channel (tests use this to leave other
    /// channels unconsumed).
    pub fn spawn_poller(
        &self,
        kind: ChannelKind,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let poll_wait = Duration::from_millis(self.inner.cfg.queue.max_wait_ms);
        Poller::new(
            self.inner.broker.channel(kind),
            Arc::clone(&self.inner.dispatcher),
            self.inner.ctx.clone(),
            poll_wait,
        )
        .spawn(shutdown)
    }
}
