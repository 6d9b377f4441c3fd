//! Blocking HTTP GET over the shared tokio runtime, with optional gzip decoding.
//!
//! Resources are small enough (tens of MB) to fetch in one request; there is
//! no ranged resume.
//!
//! The request runs on an async reqwest client; each read is bounded by the
//! configured read timeout so a stalled transfer surfaces as `TimedOut`
//! instead of hanging the caller.

use std::io::{self, BufReader, Read};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};
use std::task::Context;
use std::time::Duration;

use flate2::read::GzDecoder;
use futures_util::StreamExt;
use tokio::io::{AsyncRead, ReadBuf};

/// Buffer size for response readers (256KB)
const READ_BUF_SIZE: usize = 256 * 1024;

/// HTTP settings shared by every download in the process
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// No data for this long = stalled transfer
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install process-wide HTTP settings. Only the first call has effect.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::debug!("HTTP config already set, ignoring {config:?}");
    }
}

/// Current HTTP settings (defaults if never set)
pub fn http_config() -> HttpConfig {
    HTTP_CONFIG.get().copied().unwrap_or_default()
}

/// Error types for stream operations
#[derive(Debug)]
pub enum StreamError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { .. } => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl StreamError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(http_config().connect_timeout)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Received-bytes counter shared with progress reporting
pub type ByteCounter = Arc<AtomicU64>;

/// Response body of one GET, read synchronously.
///
/// With `gunzip`, reads yield decompressed bytes while [`Download::counter`]
/// keeps counting bytes received off the wire, so it stays comparable to
/// `content_length`.
pub struct Download {
    reader: BufReader<Box<dyn Read + Send>>,
    counter: ByteCounter,
    /// `Content-Length` header, if the server sent one
    pub content_length: Option<u64>,
}

impl Download {
    pub fn open(url: &str, gunzip: bool) -> Result<Self, StreamError> {
        let (body, content_length) = SHARED_RUNTIME.handle().block_on(send(url))?;

        let counter = ByteCounter::default();
        let counting = CountingReader::new(TimeoutReader::new(body), counter.clone());
        let inner: Box<dyn Read + Send> = if gunzip {
            Box::new(GzDecoder::new(counting))
        } else {
            Box::new(counting)
        };
        Ok(Self {
            reader: BufReader::with_capacity(READ_BUF_SIZE, inner),
            counter,
            content_length,
        })
    }

    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }
}

impl Read for Download {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

type AsyncBody = Pin<Box<dyn AsyncRead + Send + Sync>>;

async fn send(url: &str) -> Result<(AsyncBody, Option<u64>), StreamError> {
    let response = SHARED_CLIENT
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| StreamError::from_reqwest(&e))?;

    let content_length = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok());

    let stream = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(io::Error::other));
    let body: AsyncBody = Box::pin(tokio_util::io::StreamReader::new(stream));
    Ok((body, content_length))
}

/// Reader wrapper that tracks bytes read
pub struct CountingReader<R> {
    inner: R,
    count: ByteCounter,
}

impl<R> CountingReader<R> {
    pub fn new(inner: R, count: ByteCounter) -> Self {
        Self { inner, count }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Async-to-sync bridge with read timeout.
///
/// Each read waits at most [`HttpConfig::read_timeout`] for data, then fails
/// with `TimedOut`.
pub struct TimeoutReader {
    inner: AsyncBody,
    timeout: Duration,
}

impl TimeoutReader {
    fn new(inner: AsyncBody) -> Self {
        Self {
            inner,
            timeout: http_config().read_timeout,
        }
    }
}

impl Read for TimeoutReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let timeout = self.timeout;
        SHARED_RUNTIME.handle().block_on(async {
            let read_future = async {
                let mut read_buf = ReadBuf::new(buf);
                std::future::poll_fn(|cx: &mut Context<'_>| {
                    Pin::as_mut(&mut self.inner).poll_read(cx, &mut read_buf)
                })
                .await?;
                Ok::<_, io::Error>(read_buf.filled().len())
            };

            match tokio::time::timeout(timeout, read_future).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("read timeout ({}s with no data)", timeout.as_secs()),
                )),
            }
        })
    }
}
