use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::models::buffer::AudioBuffer;
use crate::models::sample::LevelSample;
use crate::stream::LevelPublisher;
use crate::traits::buffer_sink::BufferSink;

/// Sum per-channel average powers into one level.
///
/// Summing, not averaging: a stereo connection reads louder than either
/// channel alone. Returns `None` when there are no channel readings.
pub fn sum_channel_powers(powers: &[f32]) -> Option<f32> {
    if powers.is_empty() {
        None
    } else {
        Some(powers.iter().sum())
    }
}

/// Reduces each hardware buffer to one [`LevelSample`] and publishes it.
///
/// Runs inside the capture callback: no blocking, no I/O, allocation bounded
/// by the channel count. A buffer that arrives with zero channels (transient
/// device loss) produces no sample.
pub struct LevelReducer {
    publisher: LevelPublisher,
    // Touched only from the capture context; the lock is uncontended.
    last_at: Mutex<Option<DateTime<Utc>>>,
}

impl LevelReducer {
    pub fn new(publisher: LevelPublisher) -> Self {
        Self {
            publisher,
            last_at: Mutex::new(None),
        }
    }

    /// Next sample timestamp: wall clock, nudged forward 1 ns whenever the
    /// clock has not advanced past the previous sample. Keeps timestamps
    /// strictly increasing so they work as sample identity downstream.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let mut last = self.last_at.lock();
        let at = match *last {
            Some(prev) if now <= prev => prev + Duration::nanoseconds(1),
            _ => now,
        };
        *last = Some(at);
        at
    }
}

impl BufferSink for LevelReducer {
    fn on_buffer_ready(&self, buffer: AudioBuffer<'_>) {
        let channels = buffer.channels();
        if channels == 0 {
            // Transient disconnect; skip the buffer, not an error.
            log::debug!("buffer arrived with no channels, skipping");
            return;
        }

        let powers: Vec<f32> = (0..channels)
            .map(|channel| buffer.channel_average_power(channel))
            .collect();
        let Some(level) = sum_channel_powers(&powers) else {
            return;
        };

        self.publisher
            .publish(LevelSample::new(self.next_timestamp(), level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::LevelStream;
    use approx::assert_relative_eq;

    #[test]
    fn sums_channel_powers() {
        assert_eq!(sum_channel_powers(&[-20.0, -15.0]), Some(-35.0));
    }

    #[test]
    fn single_channel_passes_through() {
        assert_eq!(sum_channel_powers(&[-7.5]), Some(-7.5));
    }

    #[test]
    fn no_channels_yields_no_level() {
        assert_eq!(sum_channel_powers(&[]), None);
    }

    #[test]
    fn stereo_buffer_reduces_to_the_power_sum() {
        let stream = LevelStream::new(8);
        let reducer = LevelReducer::new(stream.publisher());
        let mut subscription = stream.subscribe();

        // Left mean power 10^-2 (−20 dB), right 10^-1.5 (−15 dB).
        let left = 0.01f32.sqrt();
        let right = 0.031_622_776f32.sqrt();
        let samples: Vec<f32> = std::iter::repeat([left, right])
            .take(480)
            .flatten()
            .collect();

        reducer.on_buffer_ready(AudioBuffer::new(&samples, 2, 48_000));

        let published = subscription.try_recv().expect("one sample");
        assert_relative_eq!(published.level, -35.0, epsilon = 1e-2);
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn zero_channel_buffer_publishes_nothing() {
        let stream = LevelStream::new(8);
        let reducer = LevelReducer::new(stream.publisher());
        let mut subscription = stream.subscribe();

        reducer.on_buffer_ready(AudioBuffer::new(&[], 0, 48_000));

        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn timestamps_strictly_increase() {
        let stream = LevelStream::new(64);
        let reducer = LevelReducer::new(stream.publisher());
        let mut subscription = stream.subscribe();
        let samples = vec![0.5f32; 48];

        for _ in 0..32 {
            reducer.on_buffer_ready(AudioBuffer::new(&samples, 1, 48_000));
        }

        let mut previous = None;
        while let Some(sample) = subscription.try_recv() {
            if let Some(prev) = previous {
                assert!(sample.at > prev, "timestamps must strictly increase");
            }
            previous = Some(sample.at);
        }
    }
}
