//! Distance functions and the metric space contract.
//!
//! Every index in this crate only ever sees objects through a [`Distance`]:
//! there is no notion of coordinates, dimensions or centroids in the trees
//! themselves. Exactness of every search relies on the distance being a
//! proper metric:
//!
//! - non-negative: `d(x, y) >= 0`
//! - identity of indiscernibles: `d(x, y) = 0` iff `x = y`
//! - triangle inequality: `d(x, z) <= d(x, y) + d(y, z)`
//!
//! Symmetry is assumed but never exploited in a way that can produce unsafe
//! results: trees always measure vantage point to candidate.
//!
//! ## Important nuance
//!
//! Squared Euclidean distance and cosine distance are **not** metrics. They
//! are provided for completeness and report `is_metric() == false`, which
//! makes every index refuse to hand out searchers for them (callers are
//! expected to fall back to a linear scan).

/// Distance function over objects of type `O`.
pub trait Distance<O: ?Sized> {
    /// Distance between two objects.
    fn distance(&self, a: &O, b: &O) -> f64;

    /// Whether the distance satisfies the triangle inequality.
    ///
    /// Search results are only guaranteed exact when this is `true`.
    fn is_metric(&self) -> bool {
        true
    }

    /// Short name used in statistics and log output.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<O: ?Sized, D: Distance<O> + ?Sized> Distance<O> for &D {
    #[inline]
    fn distance(&self, a: &O, b: &O) -> f64 {
        (**self).distance(a, b)
    }

    fn is_metric(&self) -> bool {
        (**self).is_metric()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Dense real-valued coordinates.
///
/// Implemented for slices, vectors and arrays of `f32`/`f64` so the stock
/// metrics work on whatever representation the caller already has.
pub trait Coordinates {
    /// Number of coordinates.
    fn dims(&self) -> usize;

    /// Coordinates widened to `f64`.
    fn coords(&self) -> impl Iterator<Item = f64> + '_;
}

macro_rules! impl_coordinates {
    ($($t:ty),*) => {$(
        impl Coordinates for [$t] {
            #[inline]
            fn dims(&self) -> usize {
                self.len()
            }

            #[inline]
            fn coords(&self) -> impl Iterator<Item = f64> + '_ {
                self.iter().map(|&x| f64::from(x))
            }
        }

        impl Coordinates for Vec<$t> {
            #[inline]
            fn dims(&self) -> usize {
                self.len()
            }

            #[inline]
            fn coords(&self) -> impl Iterator<Item = f64> + '_ {
                self.iter().map(|&x| f64::from(x))
            }
        }

        impl<const N: usize> Coordinates for [$t; N] {
            #[inline]
            fn dims(&self) -> usize {
                N
            }

            #[inline]
            fn coords(&self) -> impl Iterator<Item = f64> + '_ {
                self.iter().map(|&x| f64::from(x))
            }
        }
    )*};
}

impl_coordinates!(f32, f64);

impl<C: Coordinates + ?Sized> Coordinates for &C {
    fn dims(&self) -> usize {
        (**self).dims()
    }

    fn coords(&self) -> impl Iterator<Item = f64> + '_ {
        (**self).coords()
    }
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Euclidean;

/// Manhattan (L1) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Manhattan;

/// Chebyshev (L∞) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Chebyshev;

/// Minkowski (Lp) distance. A metric for `p >= 1` only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minkowski {
    pub p: f64,
}

impl Minkowski {
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

/// Squared Euclidean distance. Not a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SquaredEuclidean;

/// Cosine distance $1 - \cos(a,b)$. Not a metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cosine;

/// Bitwise Hamming distance over byte strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hamming;

/// Sum of squared coordinate differences.
///
/// If dimensions mismatch, this returns `f64::INFINITY` (so the pair is never
/// selected as a nearest neighbor).
#[inline]
fn squared_l2<C: Coordinates + ?Sized>(a: &C, b: &C) -> f64 {
    if a.dims() != b.dims() {
        return f64::INFINITY;
    }
    a.coords()
        .zip(b.coords())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

impl<C: Coordinates + ?Sized> Distance<C> for Euclidean {
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        squared_l2(a, b).sqrt()
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

impl<C: Coordinates + ?Sized> Distance<C> for SquaredEuclidean {
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        squared_l2(a, b)
    }

    fn is_metric(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "squared_euclidean"
    }
}

impl<C: Coordinates + ?Sized> Distance<C> for Manhattan {
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        if a.dims() != b.dims() {
            return f64::INFINITY;
        }
        a.coords().zip(b.coords()).map(|(x, y)| (x - y).abs()).sum()
    }

    fn name(&self) -> &'static str {
        "manhattan"
    }
}

impl<C: Coordinates + ?Sized> Distance<C> for Chebyshev {
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        if a.dims() != b.dims() {
            return f64::INFINITY;
        }
        a.coords()
            .zip(b.coords())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    fn name(&self) -> &'static str {
        "chebyshev"
    }
}

impl<C: Coordinates + ?Sized> Distance<C> for Minkowski {
    #[inline]
    fn distance(&self, a: &C, b: &C) -> f64 {
        if a.dims() != b.dims() {
            return f64::INFINITY;
        }
        if self.p.is_infinite() {
            return Chebyshev.distance(a, b);
        }
        a.coords()
            .zip(b.coords())
            .map(|(x, y)| (x - y).abs().powf(self.p))
            .sum::<f64>()
            .powf(self.p.recip())
    }

    fn is_metric(&self) -> bool {
        self.p >= 1.0
    }

    fn name(&self) -> &'static str {
        "minkowski"
    }
}

impl<C: Coordinates + ?Sized> Distance<C> for Cosine {
    /// Computes norms, so inputs need not be normalized. A zero vector is at
    /// distance 1 from everything.
    fn distance(&self, a: &C, b: &C) -> f64 {
        if a.dims() != b.dims() {
            return f64::INFINITY;
        }
        let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
        for (x, y) in a.coords().zip(b.coords()) {
            dot += x * y;
            na += x * x;
            nb += y * y;
        }
        if na == 0.0 || nb == 0.0 {
            return 1.0;
        }
        1.0 - (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
    }

    fn is_metric(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}

impl<B: AsRef<[u8]> + ?Sized> Distance<B> for Hamming {
    /// Byte strings of different length count every missing byte as 8 differing bits.
    #[inline]
    fn distance(&self, a: &B, b: &B) -> f64 {
        let (a, b) = (a.as_ref(), b.as_ref());
        let common: u32 = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        let tail = a.len().abs_diff(b.len()) as u64 * 8;
        (u64::from(common) + tail) as f64
    }

    fn name(&self) -> &'static str {
        "hamming"
    }
}
