//! The HTTP collaborator.
//!
//! Requests are described as plain data so any HTTP stack (or a test fake)
//! can execute them. Transports return the body for every HTTP status: the
//! API reports failures in the `meta` section of the body, so a 4xx response
//! is still a response.

use std::fs;

use futures_util::future::BoxFuture;
use once_cell::sync::OnceCell;
use reqwest::{Certificate, Client};

use crate::config::Config;
use crate::error::InstagramError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Form fields sent as `application/x-www-form-urlencoded`. Empty for GET.
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            form: Vec::new(),
        }
    }

    pub fn post(url: String, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            form,
        }
    }
}

pub trait Transport {
    /// Starts the request. The returned future owns everything it needs, so
    /// several can be in flight at once.
    fn send(&self, request: HttpRequest) -> BoxFuture<'static, Result<String, InstagramError>>;

    /// Executes the request on the calling thread.
    fn send_blocking(&self, request: &HttpRequest) -> Result<String, InstagramError>;
}

/// `reqwest` backed transport.
///
/// The blocking client is only created on the first blocking call. Blocking
/// calls made from inside an async runtime fail with
/// [`InstagramError::BlockingInRuntime`].
pub struct HttpTransport {
    client: Client,
    blocking: OnceCell<reqwest::blocking::Client>,
    config: TransportConfig,
}

struct TransportConfig {
    timeout: std::time::Duration,
    certificate: Option<Certificate>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, InstagramError> {
        let certificate = match config.cert_path {
            Some(ref path) => {
                let pem = fs::read(path)
                    .map_err(|e| InstagramError::Certificate(format!("{}: {}", path.display(), e)))?;
                let cert = Certificate::from_pem(&pem)
                    .map_err(|e| InstagramError::Certificate(e.to_string()))?;
                Some(cert)
            }
            None => None,
        };

        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(ref cert) = certificate {
            builder = builder.add_root_certificate(cert.clone());
        }

        Ok(Self {
            client: builder.build()?,
            blocking: OnceCell::new(),
            config: TransportConfig {
                timeout: config.timeout,
                certificate,
            },
        })
    }

    fn blocking_client(&self) -> Result<&reqwest::blocking::Client, InstagramError> {
        self.blocking.get_or_try_init(|| {
            let mut builder = reqwest::blocking::Client::builder().timeout(self.config.timeout);
            if let Some(ref cert) = self.config.certificate {
                builder = builder.add_root_certificate(cert.clone());
            }
            Ok(builder.build()?)
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'static, Result<String, InstagramError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let builder = match request.method {
                HttpMethod::Get => client.get(&request.url),
                HttpMethod::Post => client.post(&request.url).form(&request.form),
            };
            let response = builder.send().await?;
            Ok(response.text().await?)
        })
    }

    fn send_blocking(&self, request: &HttpRequest) -> Result<String, InstagramError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(InstagramError::BlockingInRuntime);
        }
        let client = self.blocking_client()?;
        let builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Post => client.post(&request.url).form(&request.form),
        };
        Ok(builder.send()?.text()?)
    }
}
