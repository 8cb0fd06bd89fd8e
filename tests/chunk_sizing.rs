//! Chunk sizing with awkward channel counts, end to end.

use wavstretch::audio::{MemorySink, MemorySource, SampleSink, StreamDescriptor};
use wavstretch::pipeline::{InputSelector, NullReporter, Pipeline, RunParameters, read_size};
use wavstretch::Result;

/// Sink that checks every write holds whole frames.
struct FrameCheckingSink {
    inner: MemorySink,
    channels: usize,
    largest_write: usize,
}

impl SampleSink for FrameCheckingSink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        assert_eq!(samples.len() % self.channels, 0, "split frame in write");
        self.largest_write = self.largest_write.max(samples.len());
        self.inner.write(samples)
    }
}

fn ramp(frames: usize, channels: usize) -> Vec<f32> {
    (0..frames * channels)
        .map(|i| ((i % 200) as f32 / 100.0) - 1.0)
        .collect()
}

#[test]
fn test_every_channel_count_streams_whole_frames() {
    for channels in [1u16, 2, 3, 5, 6, 7, 8] {
        let descriptor = StreamDescriptor::pcm16(channels, 16000);
        let ch = channels as usize;
        let mut source = MemorySource::new(descriptor, ramp(9_999, ch));
        let mut sink = FrameCheckingSink {
            inner: MemorySink::new(descriptor),
            channels: ch,
            largest_write: 0,
        };

        let mut params = RunParameters::new(InputSelector::Stdin, None);
        params.adjustments.tempo_delta_percent = -30.0;
        let summary = Pipeline::new(&params, &NullReporter)
            .run(&mut source, Some(&mut sink))
            .unwrap();

        let chunk = read_size(params.buffer_capacity, ch).unwrap();
        assert_eq!(summary.frames_read, 9_999, "{} channels", ch);
        assert!(sink.largest_write <= chunk, "{} channels", ch);
        assert_eq!(sink.inner.frames() as u64, summary.frames_written);
        assert_eq!(
            summary.frames_written,
            (9_999.0f64 / 0.7).round() as u64,
            "{} channels",
            ch
        );
    }
}

#[test]
fn test_small_capacity_still_processes_everything() {
    let descriptor = StreamDescriptor::pcm16(3, 8000);
    let input = ramp(2_000, 3);
    let mut source = MemorySource::new(descriptor, input.clone());
    let mut sink = MemorySink::new(descriptor);

    let mut params = RunParameters::new(InputSelector::Stdin, None);
    params.buffer_capacity = 8;
    let summary = Pipeline::new(&params, &NullReporter)
        .run(&mut source, Some(&mut sink))
        .unwrap();

    assert_eq!(summary.frames_read, 2_000);
    // Two frames per read
    assert_eq!(source.read_count(), 1_000);
    assert_eq!(sink.samples(), input.as_slice());
}

#[test]
fn test_capacity_smaller_than_one_frame_is_rejected() {
    let descriptor = StreamDescriptor::pcm16(8, 8000);
    let mut source = MemorySource::new(descriptor, ramp(100, 8));
    let mut params = RunParameters::new(InputSelector::Stdin, None);
    params.buffer_capacity = 6;

    let err = Pipeline::new(&params, &NullReporter)
        .run(&mut source, None)
        .unwrap_err();
    assert!(matches!(err, wavstretch::WavstretchError::InvalidStream { .. }));
    assert_eq!(source.read_count(), 0);
}
