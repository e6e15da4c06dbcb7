//! Mulberry32, a tiny 32-bit seeded generator.
//!
//! Daily task selection must be reproducible: the same day index has to
//! yield the same tasks on every reload without persisting state, so we
//! seed by position instead of wall-clock time. The constants are the
//! canonical mulberry32 ones; do not change them, stored plans rendered
//! client-side depend on the exact sequence.

pub struct Mulberry32 {
  state: u32,
}

impl Mulberry32 {
  pub fn new(seed: u32) -> Self {
    Self { state: seed }
  }

  /// Next value in [0, 1).
  pub fn next_f64(&mut self) -> f64 {
    self.state = self.state.wrapping_add(0x6D2B_79F5);
    let mut t = self.state;
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    f64::from(t ^ (t >> 14)) / 4_294_967_296.0
  }

  /// Uniform index into a slice of length `len` (`len` must be > 0).
  pub fn pick_index(&mut self, len: usize) -> usize {
    (self.next_f64() * len as f64) as usize
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_seed_same_sequence() {
    let mut a = Mulberry32::new(42);
    let mut b = Mulberry32::new(42);
    for _ in 0..64 {
      assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
    }
  }

  #[test]
  fn output_stays_in_unit_interval() {
    let mut rng = Mulberry32::new(0xDEAD_BEEF);
    for _ in 0..1000 {
      let v = rng.next_f64();
      assert!((0.0..1.0).contains(&v), "out of range: {v}");
    }
  }

  #[test]
  fn pick_index_stays_in_bounds() {
    let mut rng = Mulberry32::new(7);
    for _ in 0..1000 {
      assert!(rng.pick_index(6) < 6);
    }
  }
}
