//! Bidirectional relay that tears both ends down together.
//!
//! Each direction is driven as an independent poll-based state machine within
//! a single future, so back-pressure on one direction never stalls the other.
//! The relay ends as soon as **either** direction finishes (EOF or error);
//! both streams are then dropped, which closes them and unblocks whatever the
//! peers were waiting on.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Passes of both directions before yielding back to the runtime.
const MAX_ROUNDS_PER_POLL: usize = 16;

/// Trait for recording relay metrics.
pub trait RelayMetrics {
    /// Record bytes copied from the logical stream to the backend.
    fn record_inbound(&self, bytes: u64);
    /// Record bytes copied from the backend to the logical stream.
    fn record_outbound(&self, bytes: u64);
}

/// No-op metrics implementation for cases where metrics aren't needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl RelayMetrics for NoOpMetrics {
    #[inline]
    fn record_inbound(&self, _bytes: u64) {}
    #[inline]
    fn record_outbound(&self, _bytes: u64) {}
}

/// One copy direction of a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Logical stream → backend.
    Inbound,
    /// Backend → logical stream.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound"),
            Direction::Outbound => f.write_str("outbound"),
        }
    }
}

/// How a relay ended.
#[derive(Debug)]
pub struct RelayOutcome {
    /// The direction whose completion tore the relay down.
    pub first_closed: Direction,
    /// Error of that direction; `None` means a clean EOF.
    pub error: Option<io::Error>,
    /// Bytes copied logical stream → backend.
    pub inbound_bytes: u64,
    /// Bytes copied backend → logical stream.
    pub outbound_bytes: u64,
}

/// State machine for one-directional copy with flush.
enum CopyState {
    Reading,
    Writing(usize, usize), // (pos, len)
    Flushing(usize),       // bytes flushing
    ShuttingDown,
    Done,
}

/// Result of polling one copy direction.
enum CopyPoll {
    /// Data was flushed; carries the byte count.
    Flushed(usize),
    /// Direction finished (EOF + shutdown).
    Finished,
}

/// Poll-driven one-directional copy: read → write → flush.
fn poll_copy_direction<R, W>(
    cx: &mut Context<'_>,
    reader: &mut R,
    writer: &mut W,
    buf: &mut [u8],
    state: &mut CopyState,
) -> Poll<io::Result<CopyPoll>>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    loop {
        match state {
            CopyState::Reading => {
                let mut read_buf = ReadBuf::new(buf);
                match Pin::new(&mut *reader).poll_read(cx, &mut read_buf) {
                    Poll::Ready(Ok(())) => {
                        let n = read_buf.filled().len();
                        if n == 0 {
                            *state = CopyState::ShuttingDown;
                        } else {
                            *state = CopyState::Writing(0, n);
                        }
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                }
            }
            CopyState::Writing(pos, len) => {
                match Pin::new(&mut *writer).poll_write(cx, &buf[*pos..*len]) {
                    Poll::Ready(Ok(0)) => {
                        return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
                    }
                    Poll::Ready(Ok(n)) => {
                        *pos += n;
                        if *pos >= *len {
                            let total = *len;
                            *state = CopyState::Flushing(total);
                        }
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                }
            }
            CopyState::Flushing(bytes) => {
                let bytes = *bytes;
                match Pin::new(&mut *writer).poll_flush(cx) {
                    Poll::Ready(Ok(())) => {
                        *state = CopyState::Reading;
                        return Poll::Ready(Ok(CopyPoll::Flushed(bytes)));
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                }
            }
            CopyState::ShuttingDown => match Pin::new(&mut *writer).poll_shutdown(cx) {
                Poll::Ready(_) => {
                    *state = CopyState::Done;
                    return Poll::Ready(Ok(CopyPoll::Finished));
                }
                Poll::Pending => return Poll::Pending,
            },
            CopyState::Done => return Poll::Ready(Ok(CopyPoll::Finished)),
        }
    }
}

/// Relay `stream` ⇄ `backend` until either direction terminates.
///
/// Both directions run concurrently within the calling task. There is no idle
/// timeout: a relay lives exactly as long as both of its ends do. When this
/// returns, `stream` and `backend` have been dropped.
///
/// # Arguments
///
/// * `stream` - The logical stream accepted from the multiplexer
/// * `backend` - The freshly dialed backend connection
/// * `buffer_size` - Size of each direction's read buffer
/// * `metrics` - Metrics recorder for tracking bytes transferred
pub async fn relay_until_closed<A, B, M>(
    stream: A,
    backend: B,
    buffer_size: usize,
    metrics: &M,
) -> RelayOutcome
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
    M: RelayMetrics,
{
    let (mut stream_r, mut stream_w) = tokio::io::split(stream);
    let (mut backend_r, mut backend_w) = tokio::io::split(backend);

    let mut buf_in = vec![0u8; buffer_size];
    let mut buf_out = vec![0u8; buffer_size];
    let mut state_in = CopyState::Reading;
    let mut state_out = CopyState::Reading;
    let mut inbound_bytes = 0u64;
    let mut outbound_bytes = 0u64;

    let (first_closed, error) = std::future::poll_fn(|cx| {
        for _ in 0..MAX_ROUNDS_PER_POLL {
            let mut progressed = false;

            match poll_copy_direction(cx, &mut stream_r, &mut backend_w, &mut buf_in, &mut state_in)
            {
                Poll::Ready(Ok(CopyPoll::Flushed(n))) => {
                    metrics.record_inbound(n as u64);
                    inbound_bytes += n as u64;
                    progressed = true;
                }
                Poll::Ready(Ok(CopyPoll::Finished)) => {
                    return Poll::Ready((Direction::Inbound, None));
                }
                Poll::Ready(Err(e)) => return Poll::Ready((Direction::Inbound, Some(e))),
                Poll::Pending => {}
            }

            match poll_copy_direction(
                cx,
                &mut backend_r,
                &mut stream_w,
                &mut buf_out,
                &mut state_out,
            ) {
                Poll::Ready(Ok(CopyPoll::Flushed(n))) => {
                    metrics.record_outbound(n as u64);
                    outbound_bytes += n as u64;
                    progressed = true;
                }
                Poll::Ready(Ok(CopyPoll::Finished)) => {
                    return Poll::Ready((Direction::Outbound, None));
                }
                Poll::Ready(Err(e)) => return Poll::Ready((Direction::Outbound, Some(e))),
                Poll::Pending => {}
            }

            if !progressed {
                return Poll::Pending;
            }
        }

        // Both directions still have work; let other tasks run first.
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await;

    RelayOutcome {
        first_closed,
        error,
        inbound_bytes,
        outbound_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    struct TestMetrics {
        inbound: AtomicU64,
        outbound: AtomicU64,
    }

    impl TestMetrics {
        fn new() -> Self {
            Self {
                inbound: AtomicU64::new(0),
                outbound: AtomicU64::new(0),
            }
        }
    }

    impl RelayMetrics for TestMetrics {
        fn record_inbound(&self, bytes: u64) {
            self.inbound.fetch_add(bytes, Ordering::Relaxed);
        }
        fn record_outbound(&self, bytes: u64) {
            self.outbound.fetch_add(bytes, Ordering::Relaxed);
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_both_directions() {
        let (mut client, stream_side) = duplex(1024);
        let (backend_side, mut backend) = duplex(1024);

        let relay_handle = tokio::spawn(async move {
            let metrics = TestMetrics::new();
            let outcome = relay_until_closed(stream_side, backend_side, 1024, &metrics).await;
            (outcome, metrics)
        });

        client.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        backend.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");

        backend.write_all(b"world").await.unwrap();
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"world");

        // Client goes away: the inbound direction finishes first.
        drop(client);

        let (outcome, metrics) = tokio::time::timeout(Duration::from_secs(5), relay_handle)
            .await
            .expect("relay did not finish")
            .unwrap();
        assert_eq!(outcome.first_closed, Direction::Inbound);
        assert!(outcome.error.is_none());
        assert_eq!(outcome.inbound_bytes, 5);
        assert_eq!(outcome.outbound_bytes, 5);
        assert_eq!(metrics.inbound.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.outbound.load(Ordering::Relaxed), 5);

        // The backend observes the teardown as EOF.
        let n = backend.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_backend_close_tears_down_stream() {
        let (mut client, stream_side) = duplex(1024);
        let (backend_side, backend) = duplex(1024);

        let relay_handle = tokio::spawn(async move {
            relay_until_closed(stream_side, backend_side, 1024, &NoOpMetrics).await
        });

        // The client never sends anything; its copy loop is parked on a read.
        drop(backend);

        let outcome = tokio::time::timeout(Duration::from_secs(5), relay_handle)
            .await
            .expect("relay did not finish after backend close")
            .unwrap();
        assert_eq!(outcome.first_closed, Direction::Outbound);

        let mut buf = [0u8; 16];
        let n = tokio::time::timeout(Duration::from_secs(5), client.read(&mut buf))
            .await
            .expect("logical stream was not closed")
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_backend_half_close_ends_relay() {
        let (mut client, stream_side) = duplex(1024);
        let (backend_side, mut backend) = duplex(1024);

        let relay_handle = tokio::spawn(async move {
            relay_until_closed(stream_side, backend_side, 1024, &NoOpMetrics).await
        });

        // Only the backend's write side closes; first EOF still wins.
        backend.shutdown().await.unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), relay_handle)
            .await
            .expect("relay did not finish")
            .unwrap();
        assert_eq!(outcome.first_closed, Direction::Outbound);
        assert!(outcome.error.is_none());

        let mut buf = [0u8; 4];
        assert_eq!(client.read(&mut buf).await.unwrap(), 0);
        // The relay dropped its backend end, so writes from the backend fail.
        assert!(backend.write_all(b"late").await.is_err());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Inbound.to_string(), "inbound");
        assert_eq!(Direction::Outbound.to_string(), "outbound");
    }
}
