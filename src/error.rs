//! Error types shared by every stage of the pipeline.
//!
//! Each variant maps onto one [`ErrorKind`], which is what the pipeline and
//! the binary use to describe a failure in logs.

use std::fmt;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential or invalid configuration.
    Configuration,
    /// Page fetch or API transport failure.
    Network,
    /// The extraction API answered, but not usefully.
    Upstream,
    /// The extraction payload was not valid JSON.
    Parse,
    /// Local file system failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Network => "network",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Parse => "parse",
            ErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API credential is absent or empty.
    #[error("missing API key: OPENAI_API_KEY not set")]
    MissingApiKey,

    /// Invalid configuration value or unknown lottery key.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file is not valid YAML for [`crate::config::Settings`].
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Every fetch candidate failed.
    #[error("no source reachable after {attempts} attempt(s)")]
    NoSourceReachable { attempts: usize },

    /// A page fetch answered with a non-success status.
    #[error("fetch failed with status {status}: {url}")]
    FetchStatus { status: u16, url: String },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The extraction API returned a non-success status.
    #[error("extraction API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The extraction API response carried no text output.
    #[error("no output from extraction API")]
    EmptyPayload,

    /// The extraction output was not valid JSON.
    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingApiKey | Error::Config(_) | Error::Yaml(_) => ErrorKind::Configuration,
            Error::NoSourceReachable { .. } | Error::FetchStatus { .. } | Error::Http(_) => {
                ErrorKind::Network
            }
            Error::Upstream { .. } | Error::EmptyPayload => ErrorKind::Upstream,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingApiKey;
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let err = Error::NoSourceReachable { attempts: 3 };
        assert_eq!(err.to_string(), "no source reachable after 3 attempt(s)");

        let err = Error::Upstream {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::MissingApiKey.kind(), ErrorKind::Configuration);
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Configuration);
        assert_eq!(Error::NoSourceReachable { attempts: 1 }.kind(), ErrorKind::Network);
        assert_eq!(
            Error::FetchStatus {
                status: 503,
                url: "https://example.test".into(),
            }
            .kind(),
            ErrorKind::Network
        );
        assert_eq!(Error::EmptyPayload.kind(), ErrorKind::Upstream);
        assert_eq!(
            Error::Upstream {
                status: 500,
                body: String::new(),
            }
            .kind(),
            ErrorKind::Upstream
        );

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(parse).kind(), ErrorKind::Parse);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(Error::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Upstream.to_string(), "upstream");
        assert_eq!(ErrorKind::Configuration.to_string(), "configuration");
    }
}
