//! Delay line: a mono ring buffer read one block behind the writer.
//!
//! Feedback is not built in; the graph routes the delay's output through a
//! gain node back into its own input.

use super::BLOCK_SIZE;

#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    sample_rate: f64,
}

impl DelayLine {
    /// Create a delay line holding up to `max_delay_seconds` of audio.
    pub fn new(sample_rate: f64, max_delay_seconds: f64) -> Self {
        let buffer_size = ((sample_rate * max_delay_seconds) as usize + 1).max(2 * BLOCK_SIZE);
        DelayLine {
            buffer: vec![0.0; buffer_size],
            write_pos: 0,
            sample_rate,
        }
    }

    /// Delay time in samples, clamped to at least one block (so a feedback
    /// cycle never reads samples it has not written yet) and to the capacity.
    pub fn delay_samples(&self, delay_time: f64) -> usize {
        let samples = (delay_time.max(0.0) * self.sample_rate) as usize;
        samples.clamp(BLOCK_SIZE, self.buffer.len() - 1)
    }

    /// Read the next `out.len()` delayed samples (at most one block).
    pub fn read_block(&self, out: &mut [f32], delay_time: f64) {
        let buffer_len = self.buffer.len();
        let delay_samples = self.delay_samples(delay_time);
        let read_start = if self.write_pos >= delay_samples {
            self.write_pos - delay_samples
        } else {
            buffer_len - (delay_samples - self.write_pos)
        };
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.buffer[(read_start + i) % buffer_len];
        }
    }

    /// Append a block of input.
    pub fn write_block(&mut self, input: &[f32]) {
        let buffer_len = self.buffer.len();
        for &sample in input {
            self.buffer[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % buffer_len;
        }
    }
}
