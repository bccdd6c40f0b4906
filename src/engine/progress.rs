//! Progress tracking for in-flight segment encodes
//!
//! ffmpeg reports progress as free text on stderr. The only grammar relied on
//! here is a `time=HH:MM:SS[.frac]` token somewhere on a line; every other
//! line, and any token that does not parse, is ignored. Stats lines are
//! separated by `\r` rather than `\n`, so the stream is split on both.

use std::collections::{BTreeMap, VecDeque};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::utils::time::TimeParser;
use crate::utils::Utils;

/// Number of trailing diagnostic lines kept for failure messages
const DIAGNOSTIC_TAIL: usize = 8;

/// Fractional completion of one segment job
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub job_id: usize,
    /// In `[0, 1]`
    pub fraction: f64,
}

pub type ProgressSender = mpsc::UnboundedSender<ProgressUpdate>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressUpdate>;

/// Single-writer channel from monitors to whatever displays progress
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// What the monitor saw besides progress, once the stream closed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSummary {
    /// Last few non-progress lines, oldest first
    pub tail: Vec<String>,
    pub lines_seen: usize,
}

/// Line-oriented parser turning tool output into a monotonic fraction
#[derive(Debug)]
pub struct ProgressMonitor {
    job_id: usize,
    window_duration: f64,
    fraction: f64,
    sender: Option<ProgressSender>,
}

impl ProgressMonitor {
    pub fn new(job_id: usize, window_duration: f64, sender: Option<ProgressSender>) -> Self {
        Self {
            job_id,
            window_duration,
            fraction: 0.0,
            sender,
        }
    }

    /// Highest fraction published so far
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Extract the seconds value of a `time=` token, if the line has a valid one
    pub fn parse_time_token(line: &str) -> Option<f64> {
        let start = line.find("time=")? + "time=".len();
        let token = line[start..].split_whitespace().next()?;
        TimeParser::parse_clock(token)
    }

    /// Feed one line. Returns the fraction if it advanced and was published.
    pub fn observe_line(&mut self, line: &str) -> Option<f64> {
        let seconds = Self::parse_time_token(line)?;

        let fraction = if self.window_duration > 0.0 {
            seconds.clamp(0.0, self.window_duration) / self.window_duration
        } else {
            0.0
        };
        if fraction <= self.fraction {
            return None;
        }

        self.fraction = fraction;
        if let Some(sender) = &self.sender {
            // Nobody listening is not an error for the encode
            let _ = sender.send(ProgressUpdate {
                job_id: self.job_id,
                fraction,
            });
        }
        Some(fraction)
    }

    /// Consume a child's output stream until EOF, publishing progress as it
    /// arrives. Read errors end monitoring early but never fail the encode.
    pub async fn consume<R>(&mut self, mut reader: R) -> StreamSummary
    where
        R: AsyncRead + Unpin,
    {
        let mut summary = StreamSummary::default();
        let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
        let mut pending: Vec<u8> = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let read = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(job = self.job_id, "Stopped reading tool output: {}", e);
                    break;
                }
            };

            for &byte in &buf[..read] {
                if byte == b'\n' || byte == b'\r' {
                    self.handle_raw_line(&pending, &mut summary, &mut tail);
                    pending.clear();
                } else {
                    pending.push(byte);
                }
            }
        }
        if !pending.is_empty() {
            self.handle_raw_line(&pending, &mut summary, &mut tail);
        }

        summary.tail = tail.into_iter().collect();
        summary
    }

    fn handle_raw_line(
        &mut self,
        raw: &[u8],
        summary: &mut StreamSummary,
        tail: &mut VecDeque<String>,
    ) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        summary.lines_seen += 1;

        if Self::parse_time_token(line).is_some() {
            self.observe_line(line);
        } else if !line.contains("time=") {
            if tail.len() == DIAGNOSTIC_TAIL {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
        }
    }
}

/// Renders progress updates for the operator
pub struct ConsoleProgress {
    total: usize,
    /// Draw a live bar; otherwise updates only go to the debug log
    live: bool,
}

impl ConsoleProgress {
    pub fn new(total: usize, live: bool) -> Self {
        Self { total, live }
    }

    /// Drain updates until every sender is dropped
    pub async fn run(self, mut receiver: ProgressReceiver) {
        let mut latest: BTreeMap<usize, f64> = BTreeMap::new();

        while let Some(update) = receiver.recv().await {
            latest.insert(update.job_id, update.fraction);
            if self.live {
                eprint!(
                    "\r🔄 [{}] {:>5.1}%  clip {}/{}",
                    Utils::progress_bar(update.fraction, 20),
                    update.fraction * 100.0,
                    update.job_id,
                    self.total
                );
                if update.fraction >= 1.0 {
                    eprintln!();
                }
            } else {
                debug!(
                    job = update.job_id,
                    fraction = update.fraction,
                    in_flight = latest.values().filter(|f| **f < 1.0).count(),
                    "Segment progress"
                );
            }
        }
    }
}
