//! Master bus: sums everything connected to the destination, applies the
//! master gain and soft clips.

#[derive(Debug, Clone)]
pub struct MasterBus {
    pub master_gain: f32,
    buffer: Vec<f32>,
}

impl MasterBus {
    pub fn new(master_gain: f32) -> Self {
        MasterBus {
            master_gain,
            buffer: Vec::new(),
        }
    }

    /// Prepare a buffer of `num_samples` filled with zeros.
    pub fn clear(&mut self, num_samples: usize) {
        self.buffer.clear();
        self.buffer.resize(num_samples, 0.0);
    }

    /// Accumulate a block into the bus.
    pub fn add_block(&mut self, block: &[f32]) {
        for (acc, &s) in self.buffer.iter_mut().zip(block) {
            *acc += s;
        }
    }

    /// Write the mixed block with master gain and soft clipping into `out`.
    pub fn output_into(&self, out: &mut [f32]) {
        for (o, &s) in out.iter_mut().zip(&self.buffer) {
            *o = soft_clip(s * self.master_gain);
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for MasterBus {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f32) -> f32 {
    x.tanh()
}
