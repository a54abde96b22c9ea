//! Compute backends: drive the escape evaluator over every pixel of a
//! [`RenderRequest`] and hand the results back as a typed stream.
//!
//! The stream abstraction keeps the contract polymorphic over the CPU worker
//! pool (results trickle in row by row) and the GPU dispatch (all results
//! arrive at once) without leaking either's concurrency primitive.

pub mod cpu;
pub mod gpu;

use std::error::Error;
use std::fmt;
use std::sync::mpsc;

use crate::core::data::render_request::RenderRequest;

/// One evaluated pixel. `iterations == max_iterations` means the point never
/// escaped within the cap.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelResult {
    pub x: u32,
    pub y: u32,
    pub iterations: u32,
}

/// Wire format between CPU workers and the consuming stream: chunks of
/// results tagged with the originating sequence number, then an end-of-stream
/// marker per worker.
#[derive(Debug)]
pub enum ResultMessage {
    Results {
        sequence: u64,
        results: Vec<PixelResult>,
    },
    End {
        sequence: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend cannot run at all (no GPU adapter, worker pool failed to
    /// come up). Callers fall back or surface the reason; they must never
    /// paint a blank frame silently.
    Unavailable { reason: String },
    /// Shader compilation or validation failed; fatal for this backend
    /// instance and not retried.
    ShaderCompile { diagnostic: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "backend unavailable: {}", reason),
            Self::ShaderCompile { diagnostic } => {
                write!(f, "shader compilation failed: {}", diagnostic)
            }
        }
    }
}

impl Error for BackendError {}

/// A finite sequence of pixel results belonging to one render request.
///
/// Order across pixels is unspecified; each pixel appears at most once.
pub struct PixelResultStream {
    sequence: u64,
    source: StreamSource,
}

enum StreamSource {
    /// Fed by worker threads; `outstanding_workers` end markers remain.
    Channel {
        rx: mpsc::Receiver<ResultMessage>,
        pending: std::vec::IntoIter<PixelResult>,
        outstanding_workers: usize,
    },
    /// Everything computed up front (GPU readback).
    Buffer(std::vec::IntoIter<PixelResult>),
}

impl PixelResultStream {
    #[must_use]
    pub fn from_channel(
        sequence: u64,
        rx: mpsc::Receiver<ResultMessage>,
        worker_count: usize,
    ) -> Self {
        Self {
            sequence,
            source: StreamSource::Channel {
                rx,
                pending: Vec::new().into_iter(),
                outstanding_workers: worker_count,
            },
        }
    }

    #[must_use]
    pub fn from_buffer(sequence: u64, results: Vec<PixelResult>) -> Self {
        Self {
            sequence,
            source: StreamSource::Buffer(results.into_iter()),
        }
    }

    /// Sequence number of the request these results belong to.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Iterator for PixelResultStream {
    type Item = PixelResult;

    fn next(&mut self) -> Option<PixelResult> {
        match &mut self.source {
            StreamSource::Buffer(iter) => iter.next(),
            StreamSource::Channel {
                rx,
                pending,
                outstanding_workers,
            } => loop {
                if let Some(result) = pending.next() {
                    return Some(result);
                }
                if *outstanding_workers == 0 {
                    return None;
                }
                match rx.recv() {
                    Ok(ResultMessage::Results { results, .. }) => {
                        *pending = results.into_iter();
                    }
                    Ok(ResultMessage::End { .. }) => {
                        *outstanding_workers -= 1;
                    }
                    // all senders gone; treat as end of stream
                    Err(mpsc::RecvError) => return None,
                }
            },
        }
    }
}

/// A backend evaluates every pixel of a request's viewport.
///
/// For any fixed request the CPU and GPU implementations must agree on the
/// iteration count per pixel, up to the precision limits of each backend's
/// native scalar width.
pub trait ComputeBackend: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<PixelResultStream, BackendError>;

    /// Short identifier for diagnostics ("cpu", "gpu").
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_stream_yields_everything() {
        let results = vec![
            PixelResult {
                x: 0,
                y: 0,
                iterations: 5,
            },
            PixelResult {
                x: 1,
                y: 0,
                iterations: 7,
            },
        ];

        let stream = PixelResultStream::from_buffer(3, results.clone());

        assert_eq!(stream.sequence(), 3);
        assert_eq!(stream.collect::<Vec<_>>(), results);
    }

    #[test]
    fn test_channel_stream_drains_chunks_until_all_workers_end() {
        let (tx, rx) = mpsc::channel();
        let one = PixelResult {
            x: 0,
            y: 0,
            iterations: 1,
        };
        let two = PixelResult {
            x: 0,
            y: 1,
            iterations: 2,
        };

        tx.send(ResultMessage::Results {
            sequence: 9,
            results: vec![one],
        })
        .unwrap();
        tx.send(ResultMessage::End { sequence: 9 }).unwrap();
        tx.send(ResultMessage::Results {
            sequence: 9,
            results: vec![two],
        })
        .unwrap();
        tx.send(ResultMessage::End { sequence: 9 }).unwrap();
        drop(tx);

        let stream = PixelResultStream::from_channel(9, rx, 2);
        let collected: Vec<_> = stream.collect();

        assert_eq!(collected, vec![one, two]);
    }

    #[test]
    fn test_channel_stream_ends_when_senders_drop() {
        let (tx, rx) = mpsc::channel::<ResultMessage>();
        drop(tx);

        let mut stream = PixelResultStream::from_channel(1, rx, 4);

        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Unavailable {
            reason: "no adapter".to_string(),
        };
        assert_eq!(format!("{}", err), "backend unavailable: no adapter");

        let err = BackendError::ShaderCompile {
            diagnostic: "syntax error".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "shader compilation failed: syntax error"
        );
    }
}
