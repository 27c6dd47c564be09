use std::path::PathBuf;
use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::endpoint::DEFAULT_API_ROOT;

/// Everything an `Instagram` client needs before its first request. Nothing
/// here is validated locally: a bad token only shows up in `meta` of the
/// responses.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Config {
    #[builder(setter(into))]
    pub access_token: String,

    #[builder(default, setter(into))]
    pub client_id: String,

    /// PEM file added to the transport's trusted roots.
    #[builder(default, setter(strip_option, into))]
    pub cert_path: Option<PathBuf>,

    #[builder(default = DEFAULT_API_ROOT.to_owned(), setter(into))]
    pub api_root: String,

    #[builder(default = Duration::from_secs(10))]
    pub timeout: Duration,
}
