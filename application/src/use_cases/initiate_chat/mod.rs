//! Chat initiation use case
//!
//! This module provides the [`InitiationOrchestrator`], which owns the chat
//! lifecycle and presents observers with a single authoritative
//! [`LifecycleState`].
//!
//! # Overview
//!
//! An initiation runs two phases in sequence:
//!
//! 1. **Descriptor acquisition** - use pre-built session parameters from the
//!    input, or ask the [`SessionDescriptorFactory`] to create the chat
//! 2. **Session opening** - build a [`ChatSession`] from the descriptor and
//!    wait for its transport connection
//!
//! ```text
//! NotInitiated ──initiate──▶ Initiating ──ok──▶ Initiated ──endChat──▶ NotInitiated
//!                                 │
//!                                 └──error──▶ InitiateFailed ──reset──▶ NotInitiated
//! ```
//!
//! # Attempts
//!
//! Every call to [`initiate`](InitiationOrchestrator::initiate) starts a new
//! numbered attempt. An attempt's result is applied only if no newer attempt
//! has started since; otherwise it resolves to
//! [`InitiationOutcome::Superseded`] and its session (if any) is closed
//! without ever being published.
//!
//! # Events
//!
//! The orchestrator subscribes to `initChat` (start an attempt) and
//! `endChat` (reset) on construction and unsubscribes when dropped. Each
//! session it opens publishes `endChat` when its connection terminates.

mod types;


pub use types::{
    FailureCallback, InitiationCallbacks, InitiationError, InitiationOutcome, LifecycleSnapshot,
    SuccessCallback,
};

use crate::config::OrchestratorParams;
use crate::events::{EndChat, EventBus, InitChat, InitChatRequest, SubscriptionId};
use crate::ports::chat_session::{
    ChatSession, ChatSessionConnector, CloseReason, SessionOpenError, SessionParams,
};
use crate::ports::diagnostics_logger::{DiagnosticsEvent, DiagnosticsLogger, NoDiagnosticsLogger};
use crate::ports::session_factory::SessionDescriptorFactory;
use crate::ports::session_registry::{InMemorySessionRegistry, SessionRegistry};
use chatlink_domain::{
    ComposerConfig, InitiationInput, Language, LifecycleState, SessionDescriptor,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Mutable lifecycle data, only ever changed by the orchestrator itself.
struct Inner {
    state: LifecycleState,
    attempt: u64,
    session: Option<Arc<dyn ChatSession>>,
    composer: Option<ComposerConfig>,
    language: Language,
    /// The latest attempt has completed or failed.
    settled: bool,
    /// The latest attempt's session closed before the attempt settled.
    closed_early: Option<CloseReason>,
}

/// What `complete` found when it took the lock.
enum Completion {
    Published(ComposerConfig, Language),
    ClosedDuringOpen(CloseReason),
    Stale,
}

impl Inner {
    fn snapshot(&self) -> LifecycleSnapshot {
        let initiated = self.state == LifecycleState::Initiated;
        LifecycleSnapshot {
            state: self.state,
            composer: if initiated { self.composer } else { None },
            language: self.language.clone(),
            attempt: self.attempt,
            contact_id: self
                .session
                .as_ref()
                .filter(|_| initiated)
                .map(|s| s.contact_id().to_string()),
        }
    }
}

/// Builder for [`InitiationOrchestrator`].
pub struct InitiationOrchestratorBuilder {
    factory: Arc<dyn SessionDescriptorFactory>,
    connector: Arc<dyn ChatSessionConnector>,
    bus: Arc<EventBus>,
    registry: Arc<dyn SessionRegistry>,
    logger: Arc<dyn DiagnosticsLogger>,
    params: OrchestratorParams,
}

impl InitiationOrchestratorBuilder {
    /// Use a shared registry instead of a private in-memory one.
    pub fn with_registry(mut self, registry: Arc<dyn SessionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn DiagnosticsLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_params(mut self, params: OrchestratorParams) -> Self {
        self.params = params;
        self
    }

    /// Build the orchestrator and subscribe it to `initChat` / `endChat`.
    pub fn build(self) -> Arc<InitiationOrchestrator> {
        Arc::new_cyclic(|this: &Weak<InitiationOrchestrator>| {
            let subscriptions = vec![
                InitiationOrchestrator::subscribe_init_chat(&self.bus, this.clone()),
                InitiationOrchestrator::subscribe_end_chat(&self.bus, this.clone()),
            ];

            let inner = Inner {
                state: LifecycleState::NotInitiated,
                attempt: 0,
                session: None,
                composer: None,
                language: self.params.default_language.clone(),
                settled: true,
                closed_early: None,
            };
            let (state_tx, _) = watch::channel(inner.snapshot());

            InitiationOrchestrator {
                factory: self.factory,
                connector: self.connector,
                registry: self.registry,
                bus: self.bus,
                logger: self.logger,
                params: self.params,
                inner: Mutex::new(inner),
                state_tx,
                subscriptions,
            }
        })
    }
}

/// Owns the chat lifecycle: starts sessions, publishes the current one and
/// resets when the chat ends.
///
/// # Examples
///
/// ```ignore
/// let orchestrator = InitiationOrchestrator::builder(factory, connector, bus)
///     .with_registry(registry)
///     .build();
///
/// let pending = orchestrator.initiate(input, InitiationCallbacks::none());
/// assert_eq!(orchestrator.state(), LifecycleState::Initiating);
///
/// match pending.await {
///     InitiationOutcome::Initiated(session) => println!("chat {}", session.contact_id()),
///     InitiationOutcome::Failed(e) => eprintln!("{e}"),
///     InitiationOutcome::Superseded => {}
/// }
/// ```
pub struct InitiationOrchestrator {
    factory: Arc<dyn SessionDescriptorFactory>,
    connector: Arc<dyn ChatSessionConnector>,
    registry: Arc<dyn SessionRegistry>,
    bus: Arc<EventBus>,
    logger: Arc<dyn DiagnosticsLogger>,
    params: OrchestratorParams,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<LifecycleSnapshot>,
    subscriptions: Vec<SubscriptionId>,
}

impl InitiationOrchestrator {
    pub fn builder(
        factory: Arc<dyn SessionDescriptorFactory>,
        connector: Arc<dyn ChatSessionConnector>,
        bus: Arc<EventBus>,
    ) -> InitiationOrchestratorBuilder {
        InitiationOrchestratorBuilder {
            factory,
            connector,
            bus,
            registry: Arc::new(InMemorySessionRegistry::new()),
            logger: Arc::new(NoDiagnosticsLogger),
            params: OrchestratorParams::default(),
        }
    }

    fn subscribe_init_chat(bus: &EventBus, this: Weak<Self>) -> SubscriptionId {
        bus.on::<InitChat, _>(move |request: &InitChatRequest| {
            let Some(orchestrator) = this.upgrade() else {
                return;
            };
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                error!("initChat received outside a tokio runtime; request ignored");
                return;
            };
            let pending = orchestrator.initiate(request.input.clone(), request.callbacks.clone());
            runtime.spawn(pending);
        })
    }

    fn subscribe_end_chat(bus: &EventBus, this: Weak<Self>) -> SubscriptionId {
        bus.on::<EndChat, _>(move |_| {
            if let Some(orchestrator) = this.upgrade() {
                debug!("endChat received");
                orchestrator.reset();
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.snapshot());
    }

    // ==================== Observers ====================

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        self.lock().snapshot()
    }

    /// Receiver updated on every transition.
    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleSnapshot> {
        self.state_tx.subscribe()
    }

    /// The session opened by the latest successful attempt.
    pub fn current_session(&self) -> Option<Arc<dyn ChatSession>> {
        self.lock().session.clone()
    }

    pub fn composer_config(&self) -> Option<ComposerConfig> {
        self.lock().snapshot().composer
    }

    pub fn language(&self) -> Language {
        self.lock().language.clone()
    }

    pub fn registry(&self) -> &Arc<dyn SessionRegistry> {
        &self.registry
    }

    /// Note that `attempt`'s session closed. Returns whether `endChat`
    /// should be published for it.
    ///
    /// A close that lands before the attempt settles is kept for `complete`,
    /// which then fails the attempt instead of publishing a dead session.
    fn record_close(&self, attempt: u64, reason: &CloseReason) -> bool {
        let mut inner = self.lock();
        if inner.attempt != attempt {
            return false;
        }
        if !inner.settled {
            inner.closed_early = Some(reason.clone());
            return false;
        }
        true
    }

    // ==================== Operations ====================

    /// Start a new initiation attempt.
    ///
    /// The transition to `Initiating` has already happened when this
    /// returns; the returned future performs both phases and resolves to the
    /// attempt's outcome after invoking the matching callback.
    pub fn initiate(
        self: &Arc<Self>,
        input: InitiationInput,
        callbacks: InitiationCallbacks,
    ) -> BoxFuture<'static, InitiationOutcome> {
        let attempt = self.begin_attempt(&input);
        let this = Arc::clone(self);

        async move {
            let outcome = match this.establish(attempt, &input).await {
                Ok((session, descriptor)) => {
                    this.complete(attempt, &input, &descriptor, session).await
                }
                Err(error) => this.fail(attempt, error),
            };
            callbacks.dispatch(&outcome);
            outcome
        }
        .boxed()
    }

    /// Change the language tag without touching the lifecycle state.
    pub fn set_language(&self, language: Language) {
        let mut inner = self.lock();
        debug!("Language changed from {} to {}", inner.language, language);
        inner.language = language;
        self.publish(&inner);
    }

    /// Drop the session reference and return to `NotInitiated`.
    ///
    /// Safe from any state. Does not close the session; whoever ended the
    /// chat is responsible for that.
    pub fn reset(&self) {
        // The attempt counter is left alone: an attempt still in flight keeps
        // its token, so `complete` may yet move the lifecycle to `Initiated`.
        // Only a new `initiate` (`begin_attempt`) supersedes it.
        let (previous, session, attempt) = {
            let mut inner = self.lock();
            let previous = inner.state;
            let session = inner.session.take();
            inner.state = LifecycleState::NotInitiated;
            inner.composer = None;
            self.publish(&inner);
            (previous, session, inner.attempt)
        };

        let cleared = session
            .as_ref()
            .is_some_and(|s| self.registry.clear_if_current(s));

        info!("Chat lifecycle reset ({} -> NotInitiated)", previous);
        self.logger.log(DiagnosticsEvent::new(
            "session_reset",
            json!({
                "attempt": attempt,
                "previous_state": previous.as_str(),
                "had_session": session.is_some(),
                "registry_cleared": cleared,
            }),
        ));
    }

    // ==================== Attempt phases ====================

    fn begin_attempt(&self, input: &InitiationInput) -> u64 {
        let attempt = {
            let mut inner = self.lock();
            inner.attempt += 1;
            inner.state = LifecycleState::Initiating;
            inner.composer = None;
            inner.settled = false;
            inner.closed_early = None;
            self.publish(&inner);
            inner.attempt
        };

        info!(
            "Starting chat initiation attempt {} (contact flow {:?}, instance {:?})",
            attempt, input.contact_flow_id, input.instance_id
        );
        self.logger.log(DiagnosticsEvent::new(
            "initiation_started",
            json!({
                "attempt": attempt,
                "contact_flow_id": input.contact_flow_id,
                "instance_id": input.instance_id,
                "region": input.region,
                "stage": input.stage,
                "display_name": input.display_name,
                "language": input.language,
                "prebuilt_parameters": !input.requires_factory(),
            }),
        ));
        attempt
    }

    async fn establish(
        self: &Arc<Self>,
        attempt: u64,
        input: &InitiationInput,
    ) -> Result<(Arc<dyn ChatSession>, SessionDescriptor), InitiationError> {
        let descriptor = match &input.chat_session_parameters {
            Some(prebuilt) => {
                debug!("Attempt {}: using pre-built session parameters", attempt);
                prebuilt.clone()
            }
            None => {
                debug!("Attempt {}: requesting session descriptor", attempt);
                self.factory.create(input).await?
            }
        };

        let session = self
            .connector
            .connect(SessionParams::from_input(descriptor.clone(), input));
        self.watch_close(attempt, &session);

        debug!(
            "Attempt {}: opening session for contact {}",
            attempt,
            descriptor.contact_id()
        );
        session.open().await?;

        Ok((session, descriptor))
    }

    /// Publish `endChat` when this attempt's session terminates, unless a
    /// newer attempt has started since or the attempt has not settled yet.
    fn watch_close(self: &Arc<Self>, attempt: u64, session: &Arc<dyn ChatSession>) {
        let orchestrator = Arc::downgrade(self);
        let bus = Arc::clone(&self.bus);
        let contact_id = session.contact_id().to_string();

        session.on_close(Box::new(move |reason| {
            let publish = orchestrator
                .upgrade()
                .is_none_or(|o| o.record_close(attempt, &reason));
            if !publish {
                debug!(
                    "Session {} from attempt {} closed before it was published: {:?}",
                    contact_id, attempt, reason
                );
                return;
            }
            info!("Chat session {} closed: {:?}", contact_id, reason);
            bus.trigger::<EndChat>(&());
        }));
    }

    async fn complete(
        &self,
        attempt: u64,
        input: &InitiationInput,
        descriptor: &SessionDescriptor,
        session: Arc<dyn ChatSession>,
    ) -> InitiationOutcome {
        let completion = {
            let mut inner = self.lock();
            if inner.attempt != attempt {
                Completion::Stale
            } else if let Some(reason) = inner.closed_early.take() {
                Completion::ClosedDuringOpen(reason)
            } else {
                let composer = ComposerConfig::derive(input, descriptor);
                let language = self.params.resolve_language(input.language.as_deref());

                self.registry.set_current(Arc::clone(&session));
                inner.session = Some(Arc::clone(&session));
                inner.composer = Some(composer);
                inner.language = language.clone();
                inner.state = LifecycleState::Initiated;
                inner.settled = true;
                self.publish(&inner);
                Completion::Published(composer, language)
            }
        };

        let (composer, language) = match completion {
            Completion::Published(composer, language) => (composer, language),
            Completion::ClosedDuringOpen(reason) => {
                return self.fail(attempt, SessionOpenError::ClosedDuringOpen(reason).into());
            }
            Completion::Stale => {
                self.discard_stale(attempt, session).await;
                return InitiationOutcome::Superseded;
            }
        };

        info!(
            "Chat initiated: contact {} (attachments: {}, rich messaging: {}, language: {})",
            session.contact_id(),
            composer.attachments_enabled,
            composer.rich_messaging_enabled,
            language
        );
        self.logger.log(DiagnosticsEvent::new(
            "initiation_succeeded",
            json!({
                "attempt": attempt,
                "contact_id": session.contact_id(),
                "connection_id": session.connection_id(),
                "attachments_enabled": composer.attachments_enabled,
                "rich_messaging_enabled": composer.rich_messaging_enabled,
                "language": language.as_str(),
            }),
        ));
        InitiationOutcome::Initiated(session)
    }

    fn fail(&self, attempt: u64, error: InitiationError) -> InitiationOutcome {
        let applied = {
            let mut inner = self.lock();
            if inner.attempt == attempt {
                inner.state = LifecycleState::InitiateFailed;
                inner.composer = None;
                inner.settled = true;
                self.publish(&inner);
                true
            } else {
                false
            }
        };

        if !applied {
            debug!(
                "Attempt {} failed after being superseded: {}",
                attempt, error
            );
            self.logger.log(DiagnosticsEvent::new(
                "initiation_superseded",
                json!({ "attempt": attempt, "error": error.to_string() }),
            ));
            return InitiationOutcome::Superseded;
        }

        warn!(
            "Chat initiation attempt {} failed during {}: {}",
            attempt,
            error.phase(),
            error
        );
        self.logger.log(DiagnosticsEvent::new(
            "initiation_failed",
            json!({
                "attempt": attempt,
                "phase": error.phase(),
                "error": error.to_string(),
            }),
        ));
        InitiationOutcome::Failed(error)
    }

    async fn discard_stale(&self, attempt: u64, session: Arc<dyn ChatSession>) {
        warn!(
            "Attempt {} superseded; discarding session {}",
            attempt,
            session.contact_id()
        );
        self.logger.log(DiagnosticsEvent::new(
            "initiation_superseded",
            json!({ "attempt": attempt, "contact_id": session.contact_id() }),
        ));

        if self.params.close_superseded_sessions
            && let Err(e) = session.close().await
        {
            debug!("Closing superseded session failed: {}", e);
        }
    }
}

impl Drop for InitiationOrchestrator {
    fn drop(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.off(id);
        }
        debug!("InitiationOrchestrator dropped; event subscriptions removed");
    }
}
