//! The foundation RNG boundary.
//!
//! The engine treats its randomness supplier as an opaque generator of
//! uniform 64-bit values with no structure beyond "next value". Everything
//! the live generator needs on top of that (bounded draws without modulo
//! bias) lives here.

use rand::RngCore;

/// A source of uniformly distributed `u64` values.
pub trait RngSource {
    fn next_u64(&mut self) -> u64;
}

impl<R: RngSource + ?Sized> RngSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

/// Adapter exposing any [`rand::RngCore`] as an [`RngSource`].
pub struct RandSource<R>(pub R);

impl<R: RngCore> RngSource for RandSource<R> {
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
}

/// Draw a uniform value in `[0, bound)` by rejection sampling.
///
/// Values in the partial top interval of the `u64` range are rejected and
/// redrawn so every residue is equally likely. `bound <= 1` takes no draw.
pub fn draw_below<R: RngSource + ?Sized>(source: &mut R, bound: u64) -> u64 {
    if bound <= 1 {
        return 0;
    }
    // 2^64 mod bound: the count of values that would skew the low residues.
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let value = source.next_u64();
        if value >= threshold {
            return value % bound;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn draw_below_zero_and_one_take_no_draw() {
        // A source that panics if consulted.
        struct Unreachable;
        impl RngSource for Unreachable {
            fn next_u64(&mut self) -> u64 {
                panic!("draw_below must not consult the source for bound <= 1");
            }
        }
        assert_eq!(draw_below(&mut Unreachable, 0), 0);
        assert_eq!(draw_below(&mut Unreachable, 1), 0);
    }

    #[test]
    fn draw_below_stays_in_range() {
        let mut source = RandSource(StdRng::seed_from_u64(7));
        for bound in [2u64, 3, 10, 52, 1_000_000] {
            for _ in 0..200 {
                assert!(draw_below(&mut source, bound) < bound);
            }
        }
    }

    #[test]
    fn draw_below_rejects_skewing_values() {
        // For bound = (1 << 63) + 1, threshold = 2^64 mod bound = (1 << 63) - 1,
        // so any scripted value below that must be rejected and redrawn.
        struct Scripted(Vec<u64>);
        impl RngSource for Scripted {
            fn next_u64(&mut self) -> u64 {
                self.0.remove(0)
            }
        }
        let bound = (1u64 << 63) + 1;
        let mut source = Scripted(vec![0, (1 << 63) - 1]);
        assert_eq!(draw_below(&mut source, bound), ((1u64 << 63) - 1) % bound);
        assert!(source.0.is_empty(), "first value should have been rejected");
    }

    #[test]
    fn mut_ref_is_a_source() {
        let mut source = RandSource(StdRng::seed_from_u64(1));
        let by_ref = &mut source;
        let _ = draw_below(by_ref, 10);
    }
}
