//! Per-task polling loop

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::sync::Arc;
use taskwatch_errors::Error;
use taskwatch_events::{AppEvent, EventEmitter, PollEvent};
use taskwatch_types::StatusPayload;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::tracker::{Inner, ResponseAction, TickAction};

type Request = BoxFuture<'static, (u64, Result<StatusPayload, Error>)>;

/// Poll one task until it is cancelled, terminal or timed out
///
/// Requests are not awaited before the next tick, so several may be in
/// flight at once. Each carries a sequence number and responses older than
/// the last applied one are dropped. Cancelling drops whatever is still in
/// flight.
pub(crate) async fn run(
    inner: Arc<Inner>,
    task_id: String,
    session: Uuid,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(inner.options.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // first query goes out one interval after registration
    ticker.reset();

    let mut in_flight: FuturesUnordered<Request> = FuturesUnordered::new();
    let mut seq: u64 = 0;
    let mut retry_at: Option<Instant> = None;

    let linger = loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => return,

            Some((done_seq, result)) = in_flight.next(), if !in_flight.is_empty() => {
                match inner.apply_response(&task_id, session, done_seq, result) {
                    ResponseAction::Applied => retry_at = None,
                    ResponseAction::Ignored => {}
                    ResponseAction::Backoff(delay) => retry_at = Some(Instant::now() + delay),
                    ResponseAction::Linger => break true,
                    ResponseAction::Stop => break false,
                }
            }

            _ = ticker.tick() => {
                if retry_at.is_some_and(|at| Instant::now() < at) {
                    continue;
                }
                retry_at = None;

                match inner.begin_poll(&task_id, session) {
                    TickAction::Issue { poll_count } => {
                        seq += 1;
                        inner.emit(AppEvent::Poll(PollEvent::Issued {
                            task_id: task_id.clone(),
                            seq,
                            poll_count,
                        }));
                        let source = inner.source();
                        let id = task_id.clone();
                        let request_seq = seq;
                        in_flight.push(
                            async move { (request_seq, source.fetch_status(&id).await) }.boxed(),
                        );
                    }
                    TickAction::TimedOut => break true,
                    TickAction::Stop => break false,
                }
            }
        }
    };

    drop(in_flight);
    if linger {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(inner.options.linger) => inner.expire(&task_id, session),
        }
    }
}
