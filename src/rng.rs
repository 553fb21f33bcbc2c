/// Source of the pursuit policy's uniform fallback choices.
pub trait RandomSource {
    /// Returns an index in `[0, len)`, or 0 when `len <= 1`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Seedable 32-bit generator. The same seed always yields the same sequence.
#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    pub fn bool(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl RandomSource for Rng {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

/// Replays a fixed list of indices, wrapping around. Each value is reduced
/// modulo the requested length.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    values: Vec<usize>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, cursor: 0 }
    }

    pub fn calls(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRng {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.values.is_empty() || len <= 1 {
            self.cursor += 1;
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value % len
    }
}

/// Lets any `rand` generator drive the pursuit fallback.
#[derive(Clone, Debug)]
pub struct RandAdapter<R>(pub R);

impl<R: rand::RngCore> RandomSource for RandAdapter<R> {
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.0.next_u64() % len as u64) as usize
    }
}
