#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Client-side tracker for long-running download tasks
//!
//! A caller registers the task id returned by a job submission. The
//! tracker polls the status endpoint on a fixed interval, reconciles each
//! response into a [`TaskCard`] and removes the task on success (after a
//! linger delay), on cancellation, or on bulk teardown. Failed and timed
//! out tasks stay until dismissed.
//!
//! Every visible change is emitted as a `taskwatch_events::AppEvent`;
//! terminal outcomes additionally go through [`TrackerHooks`].

mod card;
mod hooks;
mod poller;
pub mod reconcile;
mod task;
mod tracker;

pub use card::{TaskCard, INITIAL_STATUS};
pub use hooks::{EventHooks, NoopHooks, TrackerHooks};
pub use task::{Registration, TaskSnapshot, TrackedTask};
pub use tracker::{Tracker, TrackerBuilder};

use std::time::Duration;
use taskwatch_config::Config;
use taskwatch_net::BackoffPolicy;

/// Timing knobs of the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerOptions {
    pub poll_interval: Duration,
    /// Requests issued before the task times out
    pub max_polls: u32,
    /// Delay between success and automatic removal
    pub linger: Duration,
    /// Fade duration handed to renderers on dismissal
    pub exit_animation: Duration,
    pub backoff: BackoffPolicy,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TrackerOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.tracker.poll_interval(),
            max_polls: config.tracker.max_polls,
            linger: config.tracker.linger(),
            exit_animation: config.tracker.exit_animation(),
            backoff: BackoffPolicy::from_config(&config.network),
        }
        .sanitized()
    }

    /// Clamp values the polling loop cannot run with
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.poll_interval = self.poll_interval.max(Duration::from_millis(1));
        self
    }
}
