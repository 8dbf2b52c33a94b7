use futures::Stream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::engine::{BeatEvent, MetronomeHandle, SchedulerEvent};

/// Stream of beat events for the UI beat indicator
///
/// Yields one `BeatEvent` per tick. A subscriber that falls behind skips
/// the missed beats instead of ending the stream.
pub fn beat_stream(handle: &MetronomeHandle) -> impl Stream<Item = BeatEvent> + Send + 'static {
    skip_lagged(BroadcastStream::new(handle.subscribe_beats()), "beat")
}

/// Stream of lifecycle events (start/stop, tempo and grouping changes, warnings)
pub fn scheduler_event_stream(
    handle: &MetronomeHandle,
) -> impl Stream<Item = SchedulerEvent> + Send + 'static {
    skip_lagged(BroadcastStream::new(handle.subscribe_events()), "scheduler")
}

fn skip_lagged<T: Clone + Send + 'static>(
    stream: BroadcastStream<T>,
    channel: &'static str,
) -> impl Stream<Item = T> + Send + 'static {
    stream.filter_map(move |item| match item {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            log::warn!("[Streams] {} subscriber lagged, skipped {} events", channel, skipped);
            None
        }
    })
}
