//! Transition observers
//!
//! Side effects of firings (opening a transmission record, noting a
//! failure instant) are delivered through [`TransitionObserver`] instead of
//! closures stored on the transitions. The engine owns exactly one
//! observer; it is called for every transition and dispatches on the
//! transition name.

use serde::{Deserialize, Serialize};

/// Opaque value an observer hands out at firing time and gets back when
/// that same firing's output is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverHandle(pub u64);

/// Hooks invoked by the engine around each firing
///
/// Both methods default to doing nothing.
pub trait TransitionObserver {
    /// Called after `transition` consumed its inputs at `time`
    fn on_start(&mut self, transition: &str, time: f64) -> Option<ObserverHandle> {
        let _ = (transition, time);
        None
    }

    /// Called after the output of one firing of `transition` was applied
    ///
    /// `handle` is what `on_start` returned for that firing.
    fn on_complete(&mut self, transition: &str, time: f64, handle: Option<ObserverHandle>) {
        let _ = (transition, time, handle);
    }
}

/// Observer that ignores every firing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TransitionObserver for NoopObserver {}

impl<O: TransitionObserver + ?Sized> TransitionObserver for &mut O {
    fn on_start(&mut self, transition: &str, time: f64) -> Option<ObserverHandle> {
        (**self).on_start(transition, time)
    }

    fn on_complete(&mut self, transition: &str, time: f64, handle: Option<ObserverHandle>) {
        (**self).on_complete(transition, time, handle)
    }
}
