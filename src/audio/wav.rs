//! WAV file sample source and sink.
//!
//! Samples are exchanged as interleaved `f32`; integer PCM is scaled to
//! `[-1.0, 1.0]` on read and quantized back to the source bit depth on write.

use crate::audio::sink::SampleSink;
use crate::audio::source::{SampleFormat, SampleSource, StreamDescriptor};
use crate::error::{Result, WavstretchError};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

/// Audio source that reads from WAV data.
///
/// Rewinding seeks the underlying reader back to the first frame.
pub struct WavSource<R: Read + Seek> {
    reader: hound::WavReader<R>,
    descriptor: StreamDescriptor,
    total_samples: usize,
    position: usize,
    scale: f32,
}

impl WavSource<BufReader<File>> {
    /// Open a WAV file by path.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(io) => WavstretchError::Io(io::Error::new(
                io.kind(),
                format!("Failed to open {}: {}", path.display(), io),
            )),
            other => WavstretchError::Wav {
                message: format!("Failed to parse {}: {}", path.display(), other),
            },
        })?;
        Self::from_wav_reader(reader)
    }
}

impl WavSource<Cursor<Vec<u8>>> {
    /// Create from stdin.
    ///
    /// Standard input cannot seek, so the whole stream is buffered in memory
    /// first; this is what makes `rewind` possible after a BPM pre-pass.
    pub fn from_stdin() -> Result<Self> {
        let mut buffer = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buffer)?;
        Self::from_reader(Cursor::new(buffer))
    }
}

impl<R: Read + Seek> WavSource<R> {
    /// Create from any seekable reader (for testing/flexibility).
    pub fn from_reader(reader: R) -> Result<Self> {
        let wav_reader = hound::WavReader::new(reader).map_err(|e| WavstretchError::Wav {
            message: format!("Failed to parse WAV data: {}", e),
        })?;
        Self::from_wav_reader(wav_reader)
    }

    fn from_wav_reader(reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let descriptor = StreamDescriptor {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: match spec.sample_format {
                hound::SampleFormat::Int => SampleFormat::Int,
                hound::SampleFormat::Float => SampleFormat::Float,
            },
        };
        descriptor.validate()?;

        // Drop a trailing partial frame so every chunk stays frame-aligned
        let len = reader.len() as usize;
        let total_samples = len - len % descriptor.channel_count();
        let scale = match descriptor.sample_format {
            SampleFormat::Int => 1.0 / (1u64 << (descriptor.bits_per_sample - 1)) as f32,
            SampleFormat::Float => 1.0,
        };

        Ok(Self {
            reader,
            descriptor,
            total_samples,
            position: 0,
            scale,
        })
    }

    /// Total number of frames in the stream.
    pub fn frames(&self) -> usize {
        self.total_samples / self.descriptor.channel_count()
    }
}

impl<R: Read + Seek> SampleSource for WavSource<R> {
    fn descriptor(&self) -> StreamDescriptor {
        self.descriptor
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.total_samples
    }

    fn read(&mut self, buffer: &mut [f32]) -> Result<usize> {
        let wanted = buffer.len().min(self.total_samples - self.position);
        let scale = self.scale;
        let mut count = 0;

        match self.descriptor.sample_format {
            SampleFormat::Int => {
                let mut samples = self.reader.samples::<i32>();
                while count < wanted {
                    let Some(sample) = samples.next() else { break };
                    buffer[count] = sample? as f32 * scale;
                    count += 1;
                }
            }
            SampleFormat::Float => {
                let mut samples = self.reader.samples::<f32>();
                while count < wanted {
                    let Some(sample) = samples.next() else { break };
                    buffer[count] = sample?;
                    count += 1;
                }
            }
        }

        self.position += count;
        if count < wanted {
            // Data chunk shorter than its header claims
            self.position = self.total_samples;
        }
        Ok(count)
    }

    fn rewind(&mut self) -> Result<()> {
        self.reader
            .seek(0)
            .map_err(|e| WavstretchError::NotRewindable {
                message: e.to_string(),
            })?;
        self.position = 0;
        Ok(())
    }
}

/// Audio sink that writes a WAV file with the source's format.
pub struct WavSink<W: Write + Seek> {
    writer: Option<hound::WavWriter<W>>,
    descriptor: StreamDescriptor,
    max_int: i64,
}

impl WavSink<BufWriter<File>> {
    /// Create (or truncate) a WAV file at `path`.
    pub fn create(path: &Path, descriptor: StreamDescriptor) -> Result<Self> {
        descriptor.validate()?;
        let writer = hound::WavWriter::create(path, wav_spec(&descriptor))?;
        Ok(Self::from_writer(writer, descriptor))
    }
}

impl<W: Write + Seek> WavSink<W> {
    /// Create over any seekable writer.
    pub fn new(target: W, descriptor: StreamDescriptor) -> Result<Self> {
        descriptor.validate()?;
        let writer = hound::WavWriter::new(target, wav_spec(&descriptor))?;
        Ok(Self::from_writer(writer, descriptor))
    }

    fn from_writer(writer: hound::WavWriter<W>, descriptor: StreamDescriptor) -> Self {
        Self {
            writer: Some(writer),
            descriptor,
            max_int: 1i64 << (descriptor.bits_per_sample - 1),
        }
    }
}

impl<W: Write + Seek> SampleSink for WavSink<W> {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(WavstretchError::Io(io::Error::other(
                "write after WAV sink was finalized",
            )));
        };
        match self.descriptor.sample_format {
            SampleFormat::Int => {
                for &sample in samples {
                    writer.write_sample(quantize(sample, self.max_int))?;
                }
            }
            SampleFormat::Float => {
                for &sample in samples {
                    writer.write_sample(sample)?;
                }
            }
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

/// WAV sink for non-seekable targets such as stdout.
///
/// The RIFF header carries the data length, so the file is assembled in
/// memory and copied to the target on `finalize`.
pub struct SpooledWavSink<T: Write> {
    inner: WavSink<SharedBuffer>,
    buffer: SharedBuffer,
    target: T,
}

impl SpooledWavSink<io::Stdout> {
    pub fn to_stdout(descriptor: StreamDescriptor) -> Result<Self> {
        Self::new(io::stdout(), descriptor)
    }
}

impl<T: Write> SpooledWavSink<T> {
    pub fn new(target: T, descriptor: StreamDescriptor) -> Result<Self> {
        let buffer = SharedBuffer::default();
        let inner = WavSink::new(buffer.clone(), descriptor)?;
        Ok(Self {
            inner,
            buffer,
            target,
        })
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

impl<T: Write> SampleSink for SpooledWavSink<T> {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.inner.write(samples)
    }

    fn finalize(&mut self) -> Result<()> {
        self.inner.finalize()?;
        let bytes = self.buffer.take();
        self.target.write_all(&bytes)?;
        self.target.flush()?;
        Ok(())
    }
}

/// Seekable in-memory buffer shared between the WAV writer and its owner.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Cursor<Vec<u8>>>>);

impl SharedBuffer {
    fn take(&self) -> Vec<u8> {
        std::mem::take(self.0.borrow_mut().get_mut())
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for SharedBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.borrow_mut().seek(pos)
    }
}

fn wav_spec(descriptor: &StreamDescriptor) -> hound::WavSpec {
    hound::WavSpec {
        channels: descriptor.channels,
        sample_rate: descriptor.sample_rate,
        bits_per_sample: descriptor.bits_per_sample,
        sample_format: match descriptor.sample_format {
            SampleFormat::Int => hound::SampleFormat::Int,
            SampleFormat::Float => hound::SampleFormat::Float,
        },
    }
}

/// Scale a float sample to the integer range, rounding and clipping.
fn quantize(sample: f32, max_int: i64) -> i32 {
    let scaled = (sample as f64 * max_int as f64).round() as i64;
    scaled.clamp(-max_int, max_int - 1) as i32
}
