//! Input acquisition: local file, stdin, or HTTP(S) URL

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::InputError;

/// User-Agent sent with every network fetch
pub const USER_AGENT: &str = concat!(
    "htmltab/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/flother/htmltab)"
);

/// Network fetches give up after this long
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the HTML document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Url(Url),
}

impl InputSource {
    /// Interpret a positional input argument
    ///
    /// `-` is stdin, anything with an `http`/`https` scheme is a URL, and
    /// everything else is a local path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            return InputSource::Stdin;
        }
        match Url::parse(arg) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => InputSource::Url(url),
            _ => InputSource::File(PathBuf::from(arg)),
        }
    }

    /// Read the whole input as raw bytes
    pub fn read(&self) -> Result<Vec<u8>, InputError> {
        let bytes = match self {
            InputSource::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|source| InputError::Io {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })?;
                buf
            }
            InputSource::File(path) => fs::read(path).map_err(|source| InputError::Io {
                path: path.clone(),
                source,
            })?,
            InputSource::Url(url) => fetch_blocking(url, FETCH_TIMEOUT)?,
        };
        debug!(source = %self, bytes = bytes.len(), "read input");
        Ok(bytes)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Fetch a URL using ureq (simple blocking HTTP)
///
/// One attempt only. Non-2xx responses are reported with their status code
/// and reason phrase.
pub fn fetch_blocking(url: &Url, timeout: Duration) -> Result<Vec<u8>, InputError> {
    let agent = ureq::Agent::new_with_config(
        ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .user_agent(USER_AGENT)
            .http_status_as_error(false)
            .build(),
    );

    let response = agent
        .get(url.as_str())
        .call()
        .map_err(|e| fetch_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InputError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
        });
    }

    // No size cap: the whole page is needed to find the table
    response
        .into_body()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(|e| fetch_error(url, e))
}

fn fetch_error(url: &Url, err: ureq::Error) -> InputError {
    let url = url.to_string();
    match err {
        ureq::Error::Timeout(_) => InputError::Timeout(url),
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
            InputError::Connection(url)
        }
        ureq::Error::TooManyRedirects => InputError::TooManyRedirects(url),
        other => InputError::Request {
            url,
            message: other.to_string(),
        },
    }
}
