//! Bounded-chunk body relay.
//!
//! Backend bodies are handed to the caller frame by frame. Any data frame
//! larger than the chunk size is split before it is written, so the relay
//! never emits more than one chunk unit at a time and never collects the
//! whole payload.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use hyper::body::{Body, Bytes, Frame, SizeHint};

/// Largest data frame written to the caller.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Wraps a body and re-emits its data in frames of at most `max_chunk` bytes.
#[derive(Debug)]
pub struct ChunkedBody<B> {
    inner: B,
    pending: Bytes,
    max_chunk: usize,
}

impl<B> ChunkedBody<B> {
    pub fn new(inner: B) -> Self {
        Self::with_chunk_size(inner, CHUNK_SIZE)
    }

    pub fn with_chunk_size(inner: B, max_chunk: usize) -> Self {
        assert!(max_chunk > 0, "chunk size must be non-zero");
        Self {
            inner,
            pending: Bytes::new(),
            max_chunk,
        }
    }

    fn take_chunk(&mut self) -> Bytes {
        let len = self.pending.len().min(self.max_chunk);
        self.pending.split_to(len)
    }
}

impl<B> Body for ChunkedBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        if !this.pending.is_empty() {
            return Poll::Ready(Some(Ok(Frame::data(this.take_chunk()))));
        }

        match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
            Some(Ok(frame)) => match frame.into_data() {
                Ok(data) => {
                    this.pending = data;
                    Poll::Ready(Some(Ok(Frame::data(this.take_chunk()))))
                }
                // trailers pass through untouched
                Err(frame) => Poll::Ready(Some(Ok(frame))),
            },
            other => Poll::Ready(other),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.pending.is_empty() && self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let inner = self.inner.size_hint();
        let pending = self.pending.len() as u64;

        let mut hint = SizeHint::new();
        hint.set_lower(inner.lower() + pending);
        if let Some(upper) = inner.upper() {
            hint.set_upper(upper + pending);
        }
        hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full, StreamBody};
    use std::convert::Infallible;

    async fn frame_sizes<B>(mut body: B) -> Vec<usize>
    where
        B: Body<Data = Bytes> + Unpin,
        B::Error: std::fmt::Debug,
    {
        let mut sizes = Vec::new();
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame.unwrap().into_data() {
                sizes.push(data.len());
            }
        }
        sizes
    }

    #[tokio::test]
    async fn test_splits_large_frame() {
        let body = ChunkedBody::new(Full::new(Bytes::from(vec![7u8; 20_000])));
        assert_eq!(frame_sizes(body).await, vec![8192, 8192, 3616]);
    }

    #[tokio::test]
    async fn test_small_frames_pass_through() {
        let frames = futures_util::stream::iter(vec![
            Ok::<_, Infallible>(Frame::data(Bytes::from_static(b"hello "))),
            Ok(Frame::data(Bytes::from_static(b"world"))),
        ]);
        let body = ChunkedBody::with_chunk_size(StreamBody::new(frames), 8);
        assert_eq!(frame_sizes(body).await, vec![6, 5]);
    }

    #[tokio::test]
    async fn test_preserves_bytes() {
        let payload: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let body = ChunkedBody::with_chunk_size(Full::new(Bytes::from(payload.clone())), 1000);

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected.as_ref(), payload.as_slice());
    }

    #[test]
    fn test_size_hint_is_exact_for_known_length() {
        let body = ChunkedBody::new(Full::new(Bytes::from_static(b"0123456789")));
        assert_eq!(body.size_hint().exact(), Some(10));
    }
}
