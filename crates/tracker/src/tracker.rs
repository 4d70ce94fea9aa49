//! Registry of tracked tasks and their lifecycle

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use taskwatch_errors::{Error, NetworkError, TrackerError, UserFacingError};
use taskwatch_events::{AppEvent, EventEmitter, EventSender, FailureContext, PollEvent};
use taskwatch_net::StatusSource;
use taskwatch_types::{ActiveView, CardStyle, Severity, StatusPayload, TaskState, TaskType};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::card::TaskCard;
use crate::hooks::{NoopHooks, TrackerHooks};
use crate::reconcile::{reconcile, Verdict, TIMEOUT_STATUS};
use crate::task::{Registration, TaskSnapshot, TrackedTask};
use crate::{poller, TrackerOptions};

struct TaskEntry {
    task: TrackedTask,
    card: TaskCard,
    cancel: CancellationToken,
}

pub(crate) struct Inner {
    tasks: DashMap<String, TaskEntry>,
    source: Arc<dyn StatusSource>,
    hooks: Arc<dyn TrackerHooks>,
    tx: Option<EventSender>,
    view: watch::Receiver<ActiveView>,
    pub(crate) options: TrackerOptions,
}

impl EventEmitter for Inner {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

/// What the polling loop should do after a tick
pub(crate) enum TickAction {
    /// Send the next status request
    Issue { poll_count: u32 },
    /// Ceiling exceeded, the task is timed out and lingers before removal
    TimedOut,
    /// Task is gone, terminal, or re-registered under a new session
    Stop,
}

/// What the polling loop should do after a response
pub(crate) enum ResponseAction {
    /// Good response applied, task still running
    Applied,
    /// Stale response dropped
    Ignored,
    /// Defer the next request by this much
    Backoff(Duration),
    /// Terminal success, remove the task after the linger delay
    Linger,
    Stop,
}

/// Handle to the task tracker
///
/// Cloning is cheap; all clones share one registry.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("tracked", &self.inner.tasks.len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    #[must_use]
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    /// Start tracking a task
    ///
    /// The card is announced before any request goes out. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::EmptyTaskId` for a blank id.
    pub fn register(
        &self,
        task_id: &str,
        task_type: TaskType,
        metadata: serde_json::Value,
    ) -> Result<Registration, Error> {
        if task_id.trim().is_empty() {
            return Err(TrackerError::EmptyTaskId.into());
        }

        let (session, cancel, card) = match self.inner.tasks.entry(task_id.to_string()) {
            Entry::Occupied(_) => return Ok(Registration::AlreadyTracked),
            Entry::Vacant(slot) => {
                let task = TrackedTask::new(task_id, task_type, metadata.clone());
                let card = TaskCard::new(task_type);
                let cancel = CancellationToken::new();
                let session = task.session;
                slot.insert(TaskEntry {
                    task,
                    card: card.clone(),
                    cancel: cancel.clone(),
                });
                (session, cancel, card)
            }
        };

        tracing::info!(task_id, %task_type, "tracking task");
        self.inner.emit_task_registered(task_id, task_type, metadata);
        self.inner.emit(AppEvent::Task(card.update_event(task_id)));

        tokio::spawn(poller::run(
            Arc::clone(&self.inner),
            task_id.to_string(),
            session,
            cancel,
        ));

        Ok(Registration::Started)
    }

    /// Stop tracking a task and dismiss its card
    ///
    /// Returns `false` when the id was not tracked.
    #[must_use = "returns whether the task was tracked"]
    pub fn unregister(&self, task_id: &str) -> bool {
        self.inner.unregister_where(task_id, |_| true)
    }

    /// Unregister every tracked task, returning how many were removed
    pub fn unregister_all(&self) -> usize {
        self.tracked_ids()
            .iter()
            .filter(|id| self.unregister(id))
            .count()
    }

    #[must_use]
    pub fn is_tracked(&self, task_id: &str) -> bool {
        self.inner.tasks.contains_key(task_id)
    }

    #[must_use]
    pub fn tracked_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.tasks.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.is_empty()
    }

    #[must_use]
    pub fn state(&self, task_id: &str) -> Option<TaskState> {
        self.inner.tasks.get(task_id).map(|e| e.task.state)
    }

    /// Copy of a task and its card
    #[must_use]
    pub fn snapshot(&self, task_id: &str) -> Option<TaskSnapshot> {
        self.inner.tasks.get(task_id).map(|e| TaskSnapshot {
            task: e.task.clone(),
            card: e.card.clone(),
        })
    }

    /// Whether every tracked task has reached a terminal state
    #[must_use]
    pub fn all_settled(&self) -> bool {
        self.inner.tasks.iter().all(|e| e.task.state.is_terminal())
    }

    #[must_use]
    pub fn options(&self) -> &TrackerOptions {
        &self.inner.options
    }
}

impl Inner {
    /// Remove a task if `keep` approves, cancel its loop and emit the dismissal
    fn unregister_where(&self, task_id: &str, keep: impl FnOnce(&TaskEntry) -> bool) -> bool {
        let Some((_, entry)) = self.tasks.remove_if(task_id, |_, entry| keep(entry)) else {
            return false;
        };
        entry.cancel.cancel();

        let mut state = entry.task.state;
        if !state.is_terminal() {
            self.emit_state_changed(task_id, state, TaskState::Cancelled);
            state = TaskState::Cancelled;
        }
        tracing::info!(task_id, %state, "task dismissed");
        self.emit_dismissed(task_id, state, self.options.exit_animation);
        true
    }

    /// Linger expiry: remove the task only if it is still this registration
    pub(crate) fn expire(&self, task_id: &str, session: Uuid) {
        self.unregister_where(task_id, |entry| entry.task.session == session);
    }

    /// Count a tick against the poll ceiling
    pub(crate) fn begin_poll(&self, task_id: &str, session: Uuid) -> TickAction {
        let Some(mut entry) = self.tasks.get_mut(task_id) else {
            return TickAction::Stop;
        };
        if entry.task.session != session || entry.task.state.is_terminal() {
            return TickAction::Stop;
        }

        entry.task.poll_count += 1;
        let poll_count = entry.task.poll_count;
        if poll_count <= self.options.max_polls {
            return TickAction::Issue { poll_count };
        }

        let polls = self.options.max_polls;
        let from = entry.task.state;
        entry.task.state = TaskState::TimedOut;
        let card = &mut entry.card;
        card.style = CardStyle::TimedOut;
        card.status_message = TIMEOUT_STATUS.to_string();
        let line = card.push_log(
            Severity::Warning,
            format!("No final status after {polls} polls, stopped tracking"),
        );
        let update = card.update_event(task_id);
        drop(entry);

        tracing::warn!(task_id, polls, "task timed out");
        self.emit_state_changed(task_id, from, TaskState::TimedOut);
        self.emit_log_appended(task_id, line);
        self.emit(AppEvent::Task(update));
        self.emit(AppEvent::Poll(PollEvent::TimedOut {
            task_id: task_id.to_string(),
            polls,
        }));
        self.hooks.notify(
            &format!("Task {task_id} timed out after {polls} polls"),
            Severity::Warning,
        );
        TickAction::TimedOut
    }

    /// Apply a finished request to the task
    pub(crate) fn apply_response(
        &self,
        task_id: &str,
        session: Uuid,
        seq: u64,
        result: Result<StatusPayload, Error>,
    ) -> ResponseAction {
        let Some(mut entry) = self.tasks.get_mut(task_id) else {
            self.emit_late(task_id, seq);
            return ResponseAction::Stop;
        };
        if entry.task.session != session {
            drop(entry);
            self.emit_late(task_id, seq);
            return ResponseAction::Stop;
        }
        if entry.task.state.is_terminal() {
            return ResponseAction::Stop;
        }

        // a failure newer than this response already opened a backoff window
        let newest = entry.task.last_applied_seq.max(entry.task.last_failed_seq);
        if seq <= newest {
            drop(entry);
            self.emit(AppEvent::Poll(PollEvent::StaleResponse {
                task_id: task_id.to_string(),
                seq,
                last_applied: newest,
            }));
            return ResponseAction::Ignored;
        }

        match result {
            Err(error) => {
                entry.task.last_failed_seq = seq;
                entry.task.consecutive_failures += 1;
                let failures = entry.task.consecutive_failures;
                let retry_in = retry_delay(&self.options, failures, &error);
                let line = entry.card.push_log(
                    Severity::Error,
                    format!("Network error: {}", error.user_message()),
                );
                drop(entry);

                tracing::warn!(task_id, seq, failures, error = %error, "status request failed");
                self.emit_log_appended(task_id, line);
                self.emit(AppEvent::Poll(PollEvent::NetworkError {
                    task_id: task_id.to_string(),
                    seq,
                    failure: FailureContext::from_error(&error),
                    consecutive_failures: failures,
                    retry_in,
                }));
                ResponseAction::Backoff(retry_in)
            }
            Ok(payload) => {
                let TaskEntry { task, card, .. } = &mut *entry;
                task.last_applied_seq = seq;
                task.consecutive_failures = 0;
                let outcome = reconcile(task, card, &payload);
                let update = card.update_event(task_id);
                drop(entry);

                tracing::debug!(task_id, seq, "applied status response");
                if let Some((from, to)) = outcome.transition {
                    self.emit_state_changed(task_id, from, to);
                }
                for line in outcome.logs {
                    self.emit_log_appended(task_id, line);
                }
                self.emit(AppEvent::Task(update));

                match outcome.verdict {
                    Verdict::Continue => ResponseAction::Applied,
                    Verdict::Succeeded => {
                        self.hooks
                            .notify(&format!("Task {task_id} completed"), Severity::Success);
                        if self.view.borrow().shows_file_listing() {
                            self.hooks.refresh_file_listing(task_id);
                        }
                        ResponseAction::Linger
                    }
                    Verdict::Failed { reason } => {
                        self.hooks
                            .notify(&format!("Task {task_id} failed: {reason}"), Severity::Error);
                        ResponseAction::Stop
                    }
                }
            }
        }
    }

    fn emit_late(&self, task_id: &str, seq: u64) {
        self.emit(AppEvent::Poll(PollEvent::LateResponse {
            task_id: task_id.to_string(),
            seq,
        }));
    }

    pub(crate) fn source(&self) -> Arc<dyn StatusSource> {
        Arc::clone(&self.source)
    }
}

/// Backoff after a failed request; a server-sent `Retry-After` is a floor
fn retry_delay(options: &TrackerOptions, failures: u32, error: &Error) -> Duration {
    let backoff = options.backoff.delay(failures);
    match error {
        Error::Network(NetworkError::RateLimited { seconds }) => {
            backoff.max(Duration::from_secs(*seconds))
        }
        _ => backoff,
    }
}

/// Builder for [`Tracker`]
pub struct TrackerBuilder {
    source: Option<Arc<dyn StatusSource>>,
    hooks: Option<Arc<dyn TrackerHooks>>,
    tx: Option<EventSender>,
    view: Option<watch::Receiver<ActiveView>>,
    options: TrackerOptions,
}

impl TrackerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            hooks: None,
            tx: None,
            view: None,
            options: TrackerOptions::default(),
        }
    }

    /// Set the status source (required)
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn StatusSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn TrackerHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Follow the hosting dashboard's active view
    #[must_use]
    pub fn with_view(mut self, view: watch::Receiver<ActiveView>) -> Self {
        self.view = Some(view);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: TrackerOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the tracker
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::MissingComponent` if no status source was set.
    pub fn build(self) -> Result<Tracker, Error> {
        let source = self.source.ok_or_else(|| TrackerError::MissingComponent {
            component: "status_source".to_string(),
        })?;
        let view = self
            .view
            .unwrap_or_else(|| watch::channel(ActiveView::default()).1);

        Ok(Tracker {
            inner: Arc::new(Inner {
                tasks: DashMap::new(),
                source,
                hooks: self.hooks.unwrap_or_else(|| Arc::new(NoopHooks)),
                tx: self.tx,
                view,
                options: self.options.sanitized(),
            }),
        })
    }
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
