/// Circular delay buffer.
///
/// The buffer is sized once at construction. Construct on the control thread;
/// `next_sample` never allocates.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// A line able to hold at least `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(1) + 1],
            write_pos: 0,
        }
    }

    /// A line long enough for `seconds` at `sample_rate`.
    pub fn with_seconds(seconds: f32, sample_rate: f32) -> Self {
        Self::new((seconds.max(0.0) * sample_rate).ceil() as usize)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Read the sample written `delay_samples` ago without writing.
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay_samples = delay_samples.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay_samples) % len]
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Write `sample`, return the one from `delay_samples` ago.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new(8);
        let mut out = Vec::new();
        out.push(line.next_sample(1.0, 5));
        for _ in 0..7 {
            out.push(line.next_sample(0.0, 5));
        }
        assert_eq!(out, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn delay_is_clamped_to_capacity() {
        let mut line = DelayLine::new(4);
        assert_eq!(line.capacity(), 4);
        line.next_sample(1.0, 100);
        let mut hits = 0;
        for _ in 0..8 {
            if line.next_sample(0.0, 100) == 1.0 {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }

    #[test]
    fn sized_from_seconds() {
        let line = DelayLine::with_seconds(0.4, 48_000.0);
        assert!(line.capacity() >= 19_200);
    }
}
