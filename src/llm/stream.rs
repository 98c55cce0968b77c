// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Token streaming
//!
//! A streamed reply is an ordered sequence of [`StreamEvent`]s ending in
//! exactly one terminal event: `Done` or `Error`.

use futures::stream::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::errors::LlmError;
use super::types::StreamFragment;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A piece of generated text
    Token(String),
    /// Generation finished; `text` is the trimmed full reply
    Done { text: String, skipped_fragments: u64 },
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Token(_))
    }
}

/// Receiving end of a streamed reply
///
/// Dropping the stream or calling [`TokenStream::cancel`] closes the
/// channel; the producer stops at its next send.
pub struct TokenStream {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl TokenStream {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    pub fn channel() -> (mpsc::Sender<StreamEvent>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// A stream that replays fixed events, for stand-in models
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            if tx.try_send(event).is_err() {
                break;
            }
        }
        Self::new(rx)
    }

    pub fn cancel(&mut self) {
        self.receiver.close();
    }

    /// Drain the stream and return the final text
    pub async fn collect_text(mut self) -> Result<String, LlmError> {
        let mut partial = String::new();
        while let Some(event) = self.next().await {
            match event {
                StreamEvent::Token(token) => partial.push_str(&token),
                StreamEvent::Done { text, .. } => return Ok(text),
                StreamEvent::Error(message) => return Err(LlmError::Stream(message)),
            }
        }
        if partial.is_empty() {
            Err(LlmError::Stream("stream closed without output".to_string()))
        } else {
            Ok(partial.trim().to_string())
        }
    }
}

impl Stream for TokenStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Incremental decoder for newline-delimited JSON fragments
///
/// Bytes are buffered until a newline, so fragments split across network
/// chunks decode correctly. Malformed lines are skipped and counted.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    skipped: u64,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every complete fragment
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamFragment> {
        self.buffer.extend_from_slice(bytes);
        let mut fragments = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(fragment) = self.decode_line(&line) {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Decode whatever remains after the final newline
    pub fn finish(&mut self) -> Option<StreamFragment> {
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<StreamFragment> {
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str(text) {
            Ok(fragment) => Some(fragment),
            Err(e) => {
                self.skipped += 1;
                warn!("Skipping malformed stream fragment ({}): {:.80}", e, text);
                None
            }
        }
    }
}

enum Flow {
    Continue,
    Finished,
    Closed,
}

async fn deliver(tx: &mpsc::Sender<StreamEvent>, text: &mut String, fragment: StreamFragment) -> Flow {
    if !fragment.response.is_empty() {
        text.push_str(&fragment.response);
        if tx.send(StreamEvent::Token(fragment.response)).await.is_err() {
            return Flow::Closed;
        }
    }
    if fragment.done {
        Flow::Finished
    } else {
        Flow::Continue
    }
}

/// Decode a byte stream of NDJSON fragments into stream events
///
/// Stops at the first `done` fragment, at the end of input, or when the
/// receiver goes away. Skipped fragments are added to `skipped_total`.
pub async fn forward_fragments<S, B, E>(
    mut chunks: S,
    tx: mpsc::Sender<StreamEvent>,
    skipped_total: Arc<AtomicU64>,
) where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut decoder = NdjsonDecoder::new();
    let mut text = String::new();
    let mut finished = false;

    'read: while let Some(chunk) = chunks.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                skipped_total.fetch_add(decoder.skipped(), Ordering::Relaxed);
                warn!("Stream read failed: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        for fragment in decoder.push(chunk.as_ref()) {
            match deliver(&tx, &mut text, fragment).await {
                Flow::Continue => {}
                Flow::Finished => {
                    finished = true;
                    break 'read;
                }
                Flow::Closed => {
                    skipped_total.fetch_add(decoder.skipped(), Ordering::Relaxed);
                    debug!("Stream consumer closed early");
                    return;
                }
            }
        }
    }

    if !finished {
        if let Some(fragment) = decoder.finish() {
            match deliver(&tx, &mut text, fragment).await {
                Flow::Closed => {
                    skipped_total.fetch_add(decoder.skipped(), Ordering::Relaxed);
                    return;
                }
                Flow::Finished => finished = true,
                Flow::Continue => {}
            }
        }
    }

    let skipped = decoder.skipped();
    skipped_total.fetch_add(skipped, Ordering::Relaxed);

    let terminal = if finished || !text.is_empty() {
        if !finished {
            warn!("Stream ended without a done fragment; keeping partial text");
        }
        StreamEvent::Done {
            text: text.trim().to_string(),
            skipped_fragments: skipped,
        }
    } else {
        StreamEvent::Error("stream ended without output".to_string())
    };
    let _ = tx.send(terminal).await;
}
