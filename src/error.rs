#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstagramError {
    Network(String),
    Parse(String),
    Certificate(String),
    /// A blocking call was made from a thread driving an async runtime.
    BlockingInRuntime,
}

impl std::fmt::Display for InstagramError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(s) => write!(f, "unable to send request: {}", s),
            Self::Parse(s) => write!(f, "unable to parse response: {}", s),
            Self::Certificate(s) => write!(f, "unable to load certificate: {}", s),
            Self::BlockingInRuntime => {
                write!(f, "blocking request made from inside an async runtime, use fetch instead")
            }
        }
    }
}

impl std::error::Error for InstagramError {}

impl From<reqwest::Error> for InstagramError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for InstagramError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
