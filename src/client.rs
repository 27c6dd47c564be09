use futures_util::Stream;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::dispatch::{Dispatcher, Pending, RequestId};
use crate::endpoint::{ApiRequest, Endpoint, Endpoints};
use crate::error::InstagramError;
use crate::parse::parse_meta;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Meta, Posts};

/// Client for the Instagram v1 API.
///
/// Requests are built with [`Instagram::endpoints`] and then delivered in one
/// of three ways:
///
/// - [`Instagram::fetch`] awaits the result,
/// - [`Instagram::fetch_blocking`] blocks the calling thread,
/// - [`Instagram::dispatch_with`] returns immediately and invokes a callback
///   once the response is resolved by [`Instagram::next_response`] or
///   [`Instagram::run_until_idle`].
///
/// API-level failures (`meta.error_type`) are not errors here; check
/// [`Instagram::last_error`] after a call.
pub struct Instagram<T = HttpTransport> {
    config: Config,
    endpoints: Endpoints,
    transport: T,
    dispatcher: Dispatcher,
    last_response: Option<String>,
}

impl Instagram<HttpTransport> {
    pub fn new(config: Config) -> Result<Self, InstagramError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> Instagram<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        let endpoints = Endpoints::new(&config.api_root, &config.access_token);
        Self {
            config,
            endpoints,
            transport,
            dispatcher: Dispatcher::default(),
            last_response: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn fetch<R>(&mut self, request: ApiRequest<R>) -> Result<R, InstagramError> {
        let (endpoint, http, map) = request.into_parts();
        debug!(endpoint = %endpoint, url = %redact(&http.url), "sending request");

        let body = self
            .transport
            .send(http)
            .await
            .map_err(|e| log_failure(endpoint, e))?;
        let json = self.record(endpoint, body)?;
        Ok(map(&json))
    }

    /// Sends `request` and blocks the calling thread until it completes.
    ///
    /// Must not be called from async code. With [`HttpTransport`] such a
    /// call returns [`InstagramError::BlockingInRuntime`]; use
    /// [`Instagram::fetch`] there.
    pub fn fetch_blocking<R>(&mut self, request: ApiRequest<R>) -> Result<R, InstagramError> {
        let (endpoint, http, map) = request.into_parts();
        debug!(endpoint = %endpoint, url = %redact(&http.url), "sending blocking request");

        let body = self
            .transport
            .send_blocking(&http)
            .map_err(|e| log_failure(endpoint, e))?;
        let json = self.record(endpoint, body)?;
        Ok(map(&json))
    }

    /// Starts `request` without a callback. Its response still updates
    /// [`Instagram::last_error`].
    pub fn dispatch<R: 'static>(&mut self, request: ApiRequest<R>) -> RequestId {
        self.start(request, None)
    }

    /// Starts `request`; `callback` runs exactly once when the response is
    /// resolved, with either the mapped result or the failure.
    pub fn dispatch_with<R, F>(&mut self, request: ApiRequest<R>, callback: F) -> RequestId
    where
        R: 'static,
        F: FnOnce(Result<R, InstagramError>) + 'static,
    {
        self.start(request, Some(Box::new(callback)))
    }

    fn start<R: 'static>(
        &mut self,
        request: ApiRequest<R>,
        callback: Option<Box<dyn FnOnce(Result<R, InstagramError>)>>,
    ) -> RequestId {
        let (endpoint, http, map) = request.into_parts();
        let url = redact(&http.url);
        let response = self.transport.send(http);
        let id = self.dispatcher.dispatch(endpoint, map, callback, response);
        debug!(
            endpoint = %endpoint,
            request_id = %id,
            url = %url,
            in_flight = self.dispatcher.in_flight(),
            "dispatched request"
        );
        id
    }

    /// Resolves the next completed request and returns its id. Returns `None`
    /// when nothing outstanding is in flight. Requests that were reset or
    /// answered through [`Instagram::on_response`] are never reported.
    pub async fn next_response(&mut self) -> Option<RequestId> {
        loop {
            let (id, result) = self.dispatcher.next_completed().await?;
            match self.dispatcher.take(id) {
                Some(pending) => {
                    self.resolve(pending, result);
                    return Some(id);
                }
                None => debug!(request_id = %id, "ignoring response for untracked request"),
            }
        }
    }

    /// Resolves every request in flight.
    pub async fn run_until_idle(&mut self) {
        while self.next_response().await.is_some() {}
    }

    /// Delivers a response body for `id` that was received outside the
    /// transport. The transport's own request for `id` is aborted. Returns
    /// `false`, doing nothing else, when `id` is not outstanding (stale,
    /// duplicate or foreign).
    pub fn on_response(&mut self, id: RequestId, body: String) -> bool {
        match self.dispatcher.claim(id) {
            Some(pending) => {
                self.resolve(pending, Ok(body));
                true
            }
            None => {
                debug!(request_id = %id, "ignoring response for untracked request");
                false
            }
        }
    }

    fn resolve(&mut self, pending: Pending, result: Result<String, InstagramError>) {
        let endpoint = pending.endpoint();
        let result = result
            .map_err(|e| log_failure(endpoint, e))
            .and_then(|body| self.record(endpoint, body));
        pending.deliver(result);
    }

    /// Stores `body` as the last response and parses it.
    fn record(&mut self, endpoint: Endpoint, body: String) -> Result<Value, InstagramError> {
        let parsed = serde_json::from_str(&body).map_err(|e| {
            error!(endpoint = %endpoint, "parse error: {}", e);
            InstagramError::from(e)
        });
        self.last_response = Some(body);
        parsed
    }

    /// Forgets all outstanding requests and aborts their transport requests.
    pub fn reset(&mut self) {
        self.dispatcher.reset();
    }

    pub fn outstanding(&self) -> usize {
        self.dispatcher.outstanding()
    }

    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// The `meta` section of the last response, parsed anew on each call.
    pub fn last_error(&self) -> Meta {
        self.last_response
            .as_deref()
            .and_then(|body| serde_json::from_str::<Value>(body).ok())
            .map(|json| parse_meta(&json["meta"]))
            .unwrap_or_default()
    }

    /// The last response pretty-printed, or an empty string before the first
    /// response.
    pub fn parsed_json_string(&self) -> String {
        let body = match self.last_response {
            Some(ref body) => body,
            None => return String::new(),
        };
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or_else(|| body.clone())
    }

    /// Follows `pagination.next_url` from `first` onwards. Stops after the
    /// last page, the first error, or `limit` pages.
    pub fn pages(
        &mut self,
        first: ApiRequest<Posts>,
        limit: Option<usize>,
    ) -> impl Stream<Item = Result<Posts, InstagramError>> + '_ {
        let state = PageState {
            client: self,
            next: Some(first),
            count: 0,
            limit,
        };

        futures_util::stream::unfold(state, |mut state| async move {
            // Stop if limit reached
            if let Some(limit) = state.limit {
                if state.count >= limit {
                    return None;
                }
            }

            let request = state.next.take()?;
            match state.client.fetch(request.clone()).await {
                Ok(posts) => {
                    state.count += 1;
                    state.next = request.next_page(&posts.pagination);
                    Some((Ok(posts), state))
                }
                Err(e) => Some((Err(e), state)),
            }
        })
    }
}

struct PageState<'a, T> {
    client: &'a mut Instagram<T>,
    next: Option<ApiRequest<Posts>>,
    count: usize,
    limit: Option<usize>,
}

fn log_failure(endpoint: Endpoint, e: InstagramError) -> InstagramError {
    warn!(endpoint = %endpoint, "request failed: {}", e);
    e
}

/// Hides the access token so URLs can be logged.
fn redact(url: &str) -> String {
    let start = match url.find("access_token=") {
        Some(i) => i + "access_token=".len(),
        None => return url.to_owned(),
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    format!("{}***{}", &url[..start], &url[end..])
}
