#[allow(unused_imports)]
use crate::Llrb;

// 64 levels is enough for any balanced tree this arena can hold.
const MAX_DEPTH: usize = 64;

/// Depth distribution of leaf positions in the [`Llrb`] tree, gathered
/// by [`Llrb::validate`]. Reports minimum, maximum, mean and the
/// 90th-99th percentiles.
#[derive(Clone)]
pub struct Depth {
    samples: usize,
    min: usize,
    max: usize,
    total: usize,
    counts: [u64; MAX_DEPTH],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        self.samples += 1;
        self.total += depth;
        if self.min == 0 || depth < self.min {
            self.min = depth;
        }
        if depth > self.max {
            self.max = depth;
        }
        self.counts[depth] += 1;
    }

    /// Return number of leaf positions sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of a leaf position.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Return maximum depth of a leaf position.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average depth of leaf positions.
    pub fn mean(&self) -> usize {
        if self.samples == 0 {
            0
        } else {
            self.total / self.samples
        }
    }

    /// Return depths as a list of (percentile, depth) pairs, covering
    /// the 90th through 99th percentiles.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut out: Vec<(u8, usize)> = vec![];
        let mut acc = 0_u64;
        let mut prev = 89_u8;
        for (depth, n) in self.counts.iter().enumerate() {
            if *n == 0 {
                continue;
            }
            acc += n;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc > prev {
                out.push((perc, depth));
                prev = perc;
            }
        }
        out
    }
}

impl std::fmt::Debug for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Depth")
            .field("samples", &self.samples)
            .field("min", &self.min)
            .field("mean", &self.mean())
            .field("max", &self.max)
            .finish()
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: 0,
            max: 0,
            total: 0,
            counts: [0; MAX_DEPTH],
        }
    }
}
