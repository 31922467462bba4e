//! Progress delivery for the encoding pipeline.
//!
//! Delivery is fire-and-forget: sinks never report failure back to the
//! pipeline, and a dropped event cannot corrupt pipeline state.

use tokio::sync::mpsc;

use crate::types::{Phase, ProgressEvent};

/// Receiver of progress events. Called inline, in emission order.
pub trait ProgressSink: Send + Sync {
    fn push(&self, event: ProgressEvent);
}

/// Create an unbounded channel pair for progress events.
///
/// Unbounded so a slow consumer (e.g. a terminal progress bar) never stalls
/// an encode.
pub fn progress_channel() -> (
    mpsc::UnboundedSender<ProgressEvent>,
    mpsc::UnboundedReceiver<ProgressEvent>,
) {
    mpsc::unbounded_channel()
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn push(&self, event: ProgressEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn push(&self, _event: ProgressEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn push(&self, event: ProgressEvent) {
        match event.phase {
            Phase::Error => tracing::warn!(
                "[{}/{}] {}: {}",
                event.sequence_index + 1,
                event.total,
                event.source_filename,
                event.error_message.as_deref().unwrap_or("unknown error")
            ),
            phase => tracing::debug!(
                "[{}/{}] {}: {}",
                event.sequence_index + 1,
                event.total,
                event.source_filename,
                phase
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_preserves_order() {
        let (tx, mut rx) = progress_channel();
        tx.push(ProgressEvent::new(0, 1, "a.jpg", Phase::Resizing));
        tx.push(ProgressEvent::new(0, 1, "a.jpg", Phase::Complete));

        assert_eq!(rx.recv().await.unwrap().phase, Phase::Resizing);
        assert_eq!(rx.recv().await.unwrap().phase, Phase::Complete);
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = progress_channel();
        drop(rx);
        tx.push(ProgressEvent::new(0, 1, "a.jpg", Phase::Writing));
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_events() {
        NullSink.push(ProgressEvent::new(0, 1, "a.jpg", Phase::Writing));
        TracingSink.push(ProgressEvent::error(0, 1, "a.jpg", "boom"));
    }
}
