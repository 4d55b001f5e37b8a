//! Context keys over causal raster neighbourhoods
//!
//! A key is built identically during training (reading the source image) and
//! synthesis (reading pixels already written), which is what makes the learned
//! counts usable at all. Offsets are visited in one canonical order and the
//! optional positional bucket is stored alongside the neighbour atoms.

use crate::analysis::quantizer::{Atom, ColorQuantizer};
use crate::io::configuration::{MAX_CAUSAL_ORDER, MAX_POSITION_BUCKETS, SynthesisConfig};
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::buffer::{Color, Point, Rect};
use std::fmt;

/// Ordered set of causal `(dx, dy)` offsets, all non-positive and never `(0, 0)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CausalNeighborhood {
    offsets: Vec<(i32, i32)>,
}

impl CausalNeighborhood {
    /// Every offset `(-i, -j)` with `0 <= i, j <= order`, except the origin
    ///
    /// This is the square window, not the `i + j <= order` triangle. The
    /// triangle drops up-left at order 1 and only keeps a subset of the square
    /// for larger orders, giving `(k + 1)^2 - 1` neighbours here against
    /// `k (k + 3) / 2` there.
    ///
    /// Offsets are ordered row-major starting from the farthest row, so order 1
    /// yields up-left, up, left.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `order` is zero or above the supported maximum
    pub fn of_order(order: usize) -> Result<Self> {
        if order == 0 || order > MAX_CAUSAL_ORDER {
            return Err(invalid_parameter(
                "order",
                &order,
                &format!("causal order must be between 1 and {MAX_CAUSAL_ORDER}"),
            ));
        }
        let reach = order as i32;
        let offsets = (-reach..=0)
            .flat_map(|dy| (-reach..=0).map(move |dx| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .collect();
        Ok(Self { offsets })
    }

    /// Use an explicit offset list, kept in the order given
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the list is empty, repeats an offset, or
    /// contains a non-causal offset
    pub fn custom(offsets: Vec<(i32, i32)>) -> Result<Self> {
        if offsets.is_empty() {
            return Err(invalid_parameter(
                "offsets",
                &"[]",
                &"at least one neighbour offset is required",
            ));
        }
        for (index, &(dx, dy)) in offsets.iter().enumerate() {
            if dx > 0 || dy > 0 || (dx, dy) == (0, 0) {
                return Err(invalid_parameter(
                    "offsets",
                    &format!("({dx}, {dy})"),
                    &"offsets must be non-positive on both axes and not (0, 0)",
                ));
            }
            if offsets.get(..index).is_some_and(|seen| seen.contains(&(dx, dy))) {
                return Err(invalid_parameter(
                    "offsets",
                    &format!("({dx}, {dy})"),
                    &"offsets must be unique",
                ));
            }
        }
        Ok(Self { offsets })
    }

    /// Offsets in canonical order
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Number of neighbours consulted per key
    pub const fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Always false for a validated neighbourhood
    pub const fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Discrete summary of a pixel's known neighbourhood
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextKey {
    bucket: Option<(u8, u8)>,
    atoms: Box<[Atom]>,
}

impl ContextKey {
    /// Assemble a key from its parts
    pub fn new(bucket: Option<(u8, u8)>, atoms: Vec<Atom>) -> Self {
        Self {
            bucket,
            atoms: atoms.into_boxed_slice(),
        }
    }

    /// Positional bucket `(column zone, row zone)`, if bucketing is enabled
    pub const fn bucket(&self) -> Option<(u8, u8)> {
        self.bucket
    }

    /// Neighbour atoms in offset order
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((column, row)) = self.bucket {
            write!(f, "[{column},{row}]")?;
        }
        for atom in &self.atoms {
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

/// Builds context keys from a neighbourhood, quantizer and positional buckets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextEncoder {
    quantizer: ColorQuantizer,
    neighborhood: CausalNeighborhood,
    position_buckets: u8,
}

impl ContextEncoder {
    /// Create an encoder; `position_buckets == 0` disables positional bucketing
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the bucket count does not fit in an atom
    pub fn new(
        quantizer: ColorQuantizer,
        neighborhood: CausalNeighborhood,
        position_buckets: usize,
    ) -> Result<Self> {
        let position_buckets = u8::try_from(position_buckets)
            .ok()
            .filter(|&buckets| usize::from(buckets) <= MAX_POSITION_BUCKETS)
            .ok_or_else(|| {
                invalid_parameter(
                    "position_buckets",
                    &position_buckets,
                    &format!("at most {MAX_POSITION_BUCKETS} buckets per axis"),
                )
            })?;
        Ok(Self {
            quantizer,
            neighborhood,
            position_buckets,
        })
    }

    /// Build the encoder described by a configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for any invalid quantization, neighbourhood or
    /// bucketing option
    pub fn from_config(config: &SynthesisConfig) -> Result<Self> {
        let quantizer = ColorQuantizer::new(config.thresholds.clone(), config.greyscale)?;
        let neighborhood = match &config.offsets {
            Some(offsets) => CausalNeighborhood::custom(offsets.clone())?,
            None => CausalNeighborhood::of_order(config.order)?,
        };
        Self::new(quantizer, neighborhood, config.position_buckets)
    }

    /// Quantizer used for neighbour atoms
    pub const fn quantizer(&self) -> &ColorQuantizer {
        &self.quantizer
    }

    /// Neighbour offsets in key order
    pub const fn neighborhood(&self) -> &CausalNeighborhood {
        &self.neighborhood
    }

    /// Buckets per axis, zero when disabled
    pub const fn position_buckets(&self) -> u8 {
        self.position_buckets
    }

    /// Key for `point` inside `region`
    ///
    /// Neighbours outside `region`, or for which `color_at` has nothing, become
    /// [`Atom::Outside`]. `color_at` is only called for coordinates inside the
    /// region.
    pub fn context<F>(&self, region: Rect, point: Point, color_at: F) -> ContextKey
    where
        F: Fn(Point) -> Option<Color>,
    {
        let bucket = (self.position_buckets > 0).then(|| {
            (
                bucket_index(point.x - region.x, region.width, self.position_buckets),
                bucket_index(point.y - region.y, region.height, self.position_buckets),
            )
        });

        let atoms = self
            .neighborhood
            .offsets()
            .iter()
            .map(|&(dx, dy)| {
                let neighbor = point.offset(dx, dy);
                if region.contains(neighbor) {
                    color_at(neighbor).map_or(Atom::Outside, |color| self.quantizer.atom(color))
                } else {
                    Atom::Outside
                }
            })
            .collect();

        ContextKey::new(bucket, atoms)
    }
}

/// Zone of `offset` along an axis of length `extent` split into `buckets` zones
pub fn bucket_index(offset: i32, extent: i32, buckets: u8) -> u8 {
    if extent <= 0 || buckets == 0 {
        return 0;
    }
    let zone = i64::from(offset.max(0)) * i64::from(buckets) / i64::from(extent);
    zone.min(i64::from(buckets) - 1) as u8
}
