//! Affine hash family for randomised contraction.
//!
//! `h(x) = (A·x + B) mod 2^32` with `A ∈ [1, 2^31 − 1]` and
//! `B ∈ [0, 2^32 − 1]`. Arithmetic wraps in `u64` and is masked down to 32
//! bits, which equals reduction mod 2^32 because 2^32 divides 2^64. The
//! family is closed under composition, which is what makes the contraction
//! lift a flat walk instead of a recursion.

use rand::{Rng, rngs::SmallRng};

const MODULUS_MASK: u64 = 0xFFFF_FFFF;
const MAX_MULTIPLIER: u64 = 0x7FFF_FFFF;

/// One member of the affine hash family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct AffineHash {
    a: u64,
    b: u64,
}

impl AffineHash {
    /// The identity map `x ↦ x`.
    pub(crate) const IDENTITY: Self = Self { a: 1, b: 0 };

    /// Draws a fresh member with `A` non-zero.
    pub(crate) fn draw(rng: &mut SmallRng) -> Self {
        Self {
            a: rng.gen_range(1..=MAX_MULTIPLIER),
            b: rng.gen_range(0..=MODULUS_MASK),
        }
    }

    /// Applies the hash to a 64-bit key, reducing mod 2^32.
    pub(crate) const fn apply(self, x: u64) -> u64 {
        self.a.wrapping_mul(x).wrapping_add(self.b) & MODULUS_MASK
    }

    /// Composes two maps: `self.compose(inner)` applies `inner` first.
    pub(crate) const fn compose(self, inner: Self) -> Self {
        Self {
            a: self.a.wrapping_mul(inner.a) & MODULUS_MASK,
            b: self.a.wrapping_mul(inner.b).wrapping_add(self.b) & MODULUS_MASK,
        }
    }
}
