//! Plumbing between a Rice screen and its host.
//!
//! A [`Runner`] owns the view tree of one screen. Blocking work (network
//! fetches) goes to a [`TaskPool`]; results come back on the UI thread when
//! the host calls [`Runner::tick`], which then lays out and paints into the
//! host's [`Surface`](rice_core::Surface) if anything changed.

pub mod request;
pub mod runner;
pub mod task;

pub use request::{Fetcher, Payload, Response, build_get_url, encode_url};
pub use runner::{RepaintSignal, Runner, Screen};
pub use task::{DEFAULT_TIMEOUT, TaskError, TaskId, TaskPool};
