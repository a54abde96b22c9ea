use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

// Dekker splitting constant for 53-bit significands: 2^27 + 1.
const SPLIT: f64 = 134_217_729.0;

/// A real value carried as two `f64` limbs (hi, lo) with value ≈ hi + lo.
///
/// The pair stays normalized: |lo| never exceeds half an ulp of hi. Every
/// operation re-establishes that invariant before returning, so results can
/// be fed straight back into further arithmetic. This roughly doubles the
/// effective precision over a plain `f64`, which is what keeps pixel-to-plane
/// mapping stable once the viewport height drops below ~1e-13.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ExtendedReal {
    hi: f64,
    lo: f64,
}

impl ExtendedReal {
    pub const ZERO: Self = Self { hi: 0.0, lo: 0.0 };
    pub const ONE: Self = Self { hi: 1.0, lo: 0.0 };

    /// Builds a value from raw limbs, renormalizing so that hi absorbs as
    /// much of the sum as a single `f64` can represent.
    #[must_use]
    pub fn new(hi: f64, lo: f64) -> Self {
        let s = hi + lo;
        let err = lo - (s - hi);
        Self { hi: s, lo: err }
    }

    #[must_use]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    #[must_use]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Collapses back to native precision. For values constructed from a
    /// single `f64` this is exact.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.hi + self.lo
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        if self.hi < 0.0 { -*self } else { *self }
    }

    /// Orders against a native double by inspecting the high limb only.
    ///
    /// The low limb is below half an ulp of the high limb, so it cannot flip
    /// an order comparison except when the high limbs tie exactly — a case
    /// the escape test never needs to resolve.
    #[must_use]
    pub fn compare_to(&self, rhs: f64) -> Ordering {
        self.hi.total_cmp(&rhs)
    }
}

impl From<f64> for ExtendedReal {
    fn from(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }
}

impl Add for ExtendedReal {
    type Output = Self;

    /// Error-free two-sum of the high limbs, then both low limbs folded into
    /// the recovered rounding error.
    fn add(self, rhs: Self) -> Self {
        let t1 = self.hi + rhs.hi;
        let e = t1 - self.hi;
        let t2 = ((rhs.hi - e) + (self.hi - (t1 - e))) + self.lo + rhs.lo;
        Self::new(t1, t2)
    }
}

impl Sub for ExtendedReal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for ExtendedReal {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Mul for ExtendedReal {
    type Output = Self;

    /// Dekker product: each high limb is split into two 26-bit halves so the
    /// partial products are exact, then the low-limb cross terms are folded in.
    fn mul(self, rhs: Self) -> Self {
        let cona = self.hi * SPLIT;
        let a1 = cona - (cona - self.hi);
        let a2 = self.hi - a1;

        let conb = rhs.hi * SPLIT;
        let b1 = conb - (conb - rhs.hi);
        let b2 = rhs.hi - b1;

        let c11 = self.hi * rhs.hi;
        let mut c21 = a1 * b1 - c11;
        c21 += a1 * b2;
        c21 += a2 * b1;
        c21 += a2 * b2;

        let c2 = self.hi * rhs.lo + self.lo * rhs.hi;

        let t1 = c11 + c2;
        let e = t1 - c11;
        let t2 = self.lo * rhs.lo + ((c2 - e) + (c11 - (t1 - e))) + c21;

        Self::new(t1, t2)
    }
}
