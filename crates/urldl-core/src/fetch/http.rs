//! HTTP GET backend on libcurl (via the `curl` crate).
//!
//! libcurl pushes data through callbacks while `Read` pulls it, so the
//! transfer runs on a helper thread that forwards the status line and body
//! chunks over bounded channels. `CurlStream` owns the receiving end and the
//! thread handle. Dropping it raises a cancel flag and hangs up the channel;
//! the progress callback (called by libcurl even while the connection is idle)
//! or the next write callback then aborts the transfer, and the thread is
//! joined.
//!
//! A failure after the status line reaches the reader as an `io::Error`
//! wrapping the `curl::Error`; `FetchError::from_read_error` unwraps it.

use super::parse;
use super::{FetchError, ResourceFetcher};
use curl::easy::Easy;
use std::cell::Cell;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Body chunks buffered between the transfer thread and the reader.
const BODY_CHANNEL_DEPTH: usize = 16;

type HeadMessage = Result<u32, curl::Error>;
type BodyMessage = io::Result<Vec<u8>>;

/// Transfer tuning. Every field is optional; `None` keeps libcurl's default.
#[derive(Debug, Clone, Default)]
pub struct CurlOptions {
    pub connect_timeout: Option<Duration>,
    /// Limit for the whole transfer, body included.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Plain HTTP GET. Only status 200 counts as success; redirects are not followed.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: CurlOptions,
}

impl CurlFetcher {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }
}

impl ResourceFetcher for CurlFetcher {
    type Stream = CurlStream;

    fn fetch(&self, url: &str) -> Result<CurlStream, FetchError> {
        let (head_tx, head_rx) = mpsc::sync_channel::<HeadMessage>(1);
        let (body_tx, body_rx) = mpsc::sync_channel::<BodyMessage>(BODY_CHANNEL_DEPTH);

        let cancelled = Arc::new(AtomicBool::new(false));

        let thread_url = url.to_string();
        let options = self.options.clone();
        let thread_cancelled = Arc::clone(&cancelled);
        let worker = thread::Builder::new()
            .name("urldl-fetch".to_string())
            .spawn(move || run_transfer(&thread_url, &options, &thread_cancelled, head_tx, body_tx))
            .map_err(FetchError::transport)?;

        let head = head_rx.recv();
        match head {
            Ok(Ok(200)) => {
                tracing::debug!(url, "HTTP 200");
                Ok(CurlStream {
                    body: Some(body_rx),
                    chunk: Vec::new(),
                    pos: 0,
                    cancelled,
                    worker: Some(worker),
                })
            }
            Ok(Ok(code)) => {
                tracing::debug!(url, code, "unexpected HTTP status");
                drop(body_rx);
                join_worker(worker);
                Err(FetchError::Status {
                    url: url.to_string(),
                    code,
                })
            }
            Ok(Err(e)) => {
                drop(body_rx);
                join_worker(worker);
                Err(FetchError::transport(e))
            }
            Err(_) => {
                drop(body_rx);
                join_worker(worker);
                Err(FetchError::transport(io::Error::other(
                    "transfer thread exited without a response",
                )))
            }
        }
    }
}

/// Response body of a successful `CurlFetcher::fetch`.
pub struct CurlStream {
    body: Option<Receiver<BodyMessage>>,
    chunk: Vec<u8>,
    pos: usize,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Read for CurlStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.chunk.len() {
            let Some(rx) = &self.body else {
                return Ok(0);
            };
            match rx.recv() {
                Ok(Ok(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Err(e)) => {
                    self.body = None;
                    return Err(e);
                }
                // Sender dropped: the transfer finished cleanly.
                Err(_) => {
                    self.body = None;
                    return Ok(0);
                }
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Drop for CurlStream {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.body.take();
        if let Some(worker) = self.worker.take() {
            join_worker(worker);
        }
    }
}

fn join_worker(worker: JoinHandle<()>) {
    if worker.join().is_err() {
        tracing::warn!("fetch transfer thread panicked");
    }
}

fn run_transfer(
    url: &str,
    options: &CurlOptions,
    cancelled: &AtomicBool,
    head_tx: SyncSender<HeadMessage>,
    body_tx: SyncSender<BodyMessage>,
) {
    let mut easy = Easy::new();
    let reported = Cell::new(false);
    let result = configure(&mut easy, url, options)
        .and_then(|()| perform(&mut easy, cancelled, &head_tx, &body_tx, &reported));

    match result {
        Ok(()) if !reported.get() => {
            // Empty response without a header block.
            let code = easy.response_code().unwrap_or(0);
            let _ = head_tx.send(Ok(code));
        }
        Ok(()) => {}
        Err(e) if !reported.get() => {
            let _ = head_tx.send(Err(e));
        }
        Err(e) if cancelled.load(Ordering::Relaxed) => {
            tracing::debug!(url, "transfer cancelled: {}", e);
        }
        Err(e) => {
            // Fails silently when the reader already hung up.
            let _ = body_tx.send(Err(io::Error::other(e)));
        }
    }
}

fn configure(easy: &mut Easy, url: &str, options: &CurlOptions) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(false)?;
    // Needed for the progress callback that watches the cancel flag.
    easy.progress(true)?;
    if let Some(t) = options.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = options.timeout {
        easy.timeout(t)?;
    }
    if let Some(ua) = &options.user_agent {
        easy.useragent(ua)?;
    }
    Ok(())
}

/// Runs the transfer. The final status is sent on `head_tx` once the header
/// block ends; returning `false` from the header callback aborts non-200
/// responses before any body is read. Setting `cancelled` aborts it at the
/// next progress tick.
fn perform(
    easy: &mut Easy,
    cancelled: &AtomicBool,
    head_tx: &SyncSender<HeadMessage>,
    body_tx: &SyncSender<BodyMessage>,
    reported: &Cell<bool>,
) -> Result<(), curl::Error> {
    let status: Cell<Option<u32>> = Cell::new(None);
    let report = |code: u32| -> bool {
        reported.set(true);
        head_tx.send(Ok(code)).is_ok() && code == 200
    };

    let mut transfer = easy.transfer();
    transfer.header_function(|line| {
        if let Some(code) = parse::status_code(line) {
            status.set(Some(code));
            return true;
        }
        if reported.get() || !parse::is_end_of_headers(line) {
            return true;
        }
        match status.get() {
            Some(code) if parse::is_interim(code) => {
                status.set(None);
                true
            }
            Some(code) => report(code),
            None => true,
        }
    })?;
    transfer.write_function(|data| {
        if !reported.get() && !report(status.get().unwrap_or(0)) {
            return Ok(0);
        }
        match body_tx.send(Ok(data.to_vec())) {
            Ok(()) => Ok(data.len()),
            // Reader dropped the stream: abort.
            Err(_) => Ok(0),
        }
    })?;
    transfer.progress_function(|_, _, _, _| !cancelled.load(Ordering::Relaxed))?;
    transfer.perform()
}
