use std::collections::VecDeque;

/// One lateral-position reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub lateral_x: f32,
    pub timestamp_ms: i64,
}

/// Append-only lateral-position series, strictly increasing in time.
#[derive(Debug, Clone, Default)]
pub struct KinematicSampler {
    samples: VecDeque<Sample>,
    capacity: Option<usize>,
}

impl KinematicSampler {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    /// Appends a sample. Returns `false` and keeps the series unchanged when
    /// the timestamp does not advance past the last one.
    pub fn sample(&mut self, lateral_x: f32, timestamp_ms: i64) -> bool {
        if self
            .samples
            .back()
            .is_some_and(|last| timestamp_ms <= last.timestamp_ms)
        {
            return false;
        }
        if let Some(capacity) = self.capacity {
            while self.samples.len() >= capacity {
                self.samples.pop_front();
            }
        }
        self.samples.push_back(Sample {
            lateral_x,
            timestamp_ms,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Contiguous view of the series, oldest first.
    pub fn series(&mut self) -> &[Sample] {
        self.samples.make_contiguous()
    }
}
