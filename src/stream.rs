//! Paced walk over the dataset for `/api/vehicle-stream`.

use crate::{dataset::Dataset, types::StreamEvent};
use futures::{stream, Stream};
use rand::Rng;
use std::{ops::Range, sync::Arc, time::Duration};

pub const STREAM_SPEED_KMH: Range<f64> = 30.0..80.0;
pub const STREAM_ETA_MIN: Range<f64> = 5.0..20.0;

/// One event per row, in dataset order, `interval` apart. Ends after the
/// last row. Speed and ETA are plain random draws; the trained models are
/// not consulted on this path.
///
/// Dropping the stream (client disconnect) cancels the pending sleep.
pub fn event_stream(dataset: Arc<Dataset>, interval: Duration) -> impl Stream<Item = StreamEvent> {
    stream::unfold(0usize, move |index| {
        let dataset = Arc::clone(&dataset);
        async move {
            let row = dataset.get(index)?;
            if index > 0 {
                tokio::time::sleep(interval).await;
            }

            let mut rng = rand::thread_rng();
            let event = StreamEvent {
                latitude: row.latitude,
                longitude: row.longitude,
                speed: rng.gen_range(STREAM_SPEED_KMH),
                eta: rng.gen_range(STREAM_ETA_MIN),
            };
            Some((event, index + 1))
        }
    })
}
