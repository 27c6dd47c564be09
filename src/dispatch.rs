//! Bookkeeping for asynchronous requests.
//!
//! Every dispatched request gets a fresh `RequestId`, and its callback is
//! stored under that id. Two requests to the same endpoint therefore never
//! share a callback slot. Once an id is taken, reset or answered through
//! `claim`, its transport future is aborted and whatever it produces is
//! dropped.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use futures_util::future::{AbortHandle, Abortable, BoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::InstagramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Delivery = Box<dyn FnOnce(Result<Value, InstagramError>)>;
type Completion = (RequestId, Result<String, InstagramError>);
/// Yields `None` when aborted.
type InFlight = BoxFuture<'static, Option<Completion>>;

pub(crate) struct Pending {
    endpoint: Endpoint,
    deliver: Option<Delivery>,
    abort: AbortHandle,
}

impl Pending {
    pub(crate) fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Hands the parsed envelope (or the failure) to the callback, if any.
    pub(crate) fn deliver(self, result: Result<Value, InstagramError>) {
        if let Some(deliver) = self.deliver {
            deliver(result);
        }
    }
}

#[derive(Default)]
pub(crate) struct Dispatcher {
    next_id: u64,
    pending: HashMap<RequestId, Pending>,
    in_flight: FuturesUnordered<InFlight>,
    /// Completions picked up by `sweep` that still await resolution.
    ready: VecDeque<Completion>,
}

impl Dispatcher {
    /// Records a new outstanding request and starts driving `response`.
    pub(crate) fn dispatch<T: 'static>(
        &mut self,
        endpoint: Endpoint,
        map: fn(&Value) -> T,
        callback: Option<Box<dyn FnOnce(Result<T, InstagramError>)>>,
        response: BoxFuture<'static, Result<String, InstagramError>>,
    ) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);

        let deliver = callback.map(|callback| -> Delivery {
            Box::new(move |result: Result<Value, InstagramError>| {
                callback(result.map(|json| map(&json)))
            })
        });
        let (abort, registration) = AbortHandle::new_pair();
        self.pending.insert(
            id,
            Pending {
                endpoint,
                deliver,
                abort,
            },
        );

        let response = Abortable::new(async move { (id, response.await) }, registration);
        self.in_flight.push(Box::pin(async move { response.await.ok() }));
        id
    }

    /// Removes `id` from the outstanding set.
    pub(crate) fn take(&mut self, id: RequestId) -> Option<Pending> {
        self.pending.remove(&id)
    }

    /// Removes `id` for a response that arrived from outside the transport.
    /// Its transport future is aborted.
    pub(crate) fn claim(&mut self, id: RequestId) -> Option<Pending> {
        let pending = self.pending.remove(&id)?;
        pending.abort.abort();
        self.sweep();
        Some(pending)
    }

    /// Waits for the next transport future of an outstanding request to
    /// finish. `None` once nothing is in flight.
    pub(crate) async fn next_completed(&mut self) -> Option<Completion> {
        while let Some((id, result)) = self.ready.pop_front() {
            if self.pending.contains_key(&id) {
                return Some((id, result));
            }
        }
        loop {
            match self.in_flight.next().await? {
                Some((id, result)) if self.pending.contains_key(&id) => return Some((id, result)),
                _ => continue,
            }
        }
    }

    /// Forgets every outstanding request and aborts its transport future.
    pub(crate) fn reset(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.abort.abort();
        }
        self.ready.clear();
        self.sweep();
    }

    /// Drops finished and aborted futures without waiting. Completions of
    /// outstanding requests are kept for `next_completed`.
    ///
    /// Transport futures may need the runtime's reactor, so outside a
    /// runtime nothing is polled and aborted futures are released by the
    /// next `next_completed`.
    fn sweep(&mut self) {
        if tokio::runtime::Handle::try_current().is_err() {
            return;
        }
        while let Some(Some(done)) = self.in_flight.next().now_or_never() {
            match done {
                Some((id, result)) if self.pending.contains_key(&id) => {
                    self.ready.push_back((id, result))
                }
                _ => {}
            }
        }
    }

    pub(crate) fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.len() + self.ready.len()
    }
}
