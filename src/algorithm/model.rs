//! Context-conditioned color counts and their smoothed probabilities
//!
//! Counts grow monotonically while training. `finalize` derives one
//! probability distribution per context; any later training discards those
//! distributions until `finalize` runs again.

use crate::algorithm::synthesizer::UnitSource;
use crate::analysis::context::ContextKey;
use crate::io::configuration::NORMALIZATION_TOLERANCE;
use crate::io::error::{Result, SpriteError, invalid_parameter};
use crate::math::probability::{additive_smoothing, inverse_cdf, normalization_error};
use crate::spatial::buffer::Color;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Smoothed color distribution of a single context
///
/// Outcomes are held in ascending color order, which is also the order used
/// for inverse-CDF sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    outcomes: Vec<(Color, f64)>,
}

impl Distribution {
    /// `(color, probability)` pairs in sampling order
    pub fn outcomes(&self) -> &[(Color, f64)] {
        &self.outcomes
    }

    /// Probability assigned to `color`, if it was observed in this context
    pub fn probability(&self, color: Color) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == color)
            .map(|&(_, probability)| probability)
    }

    /// Sum of all probabilities
    pub fn total(&self) -> f64 {
        self.outcomes.iter().map(|&(_, probability)| probability).sum()
    }

    /// Draw a color for a uniform value in `[0, 1)`
    pub fn sample(&self, draw: f64) -> Option<Color> {
        inverse_cdf(&self.outcomes, draw)
    }
}

/// Markov chain over quantized contexts
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarkovModel {
    counts: HashMap<ContextKey, BTreeMap<Color, u64>>,
    probabilities: Option<HashMap<ContextKey, Distribution>>,
    observations: u64,
}

impl MarkovModel {
    /// Create an untrained model
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `color` under `context`
    pub fn train(&mut self, context: ContextKey, color: Color) {
        *self
            .counts
            .entry(context)
            .or_default()
            .entry(color)
            .or_insert(0) += 1;
        self.observations += 1;
        self.probabilities = None;
    }

    /// Add every count of another model into this one
    ///
    /// Counts are summed, so the order in which models are absorbed does not
    /// affect the result.
    pub fn absorb(&mut self, other: Self) {
        if other.counts.is_empty() {
            return;
        }
        for (context, colors) in other.counts {
            let target = self.counts.entry(context).or_default();
            for (color, count) in colors {
                *target.entry(color).or_insert(0) += count;
            }
        }
        self.observations += other.observations;
        self.probabilities = None;
    }

    /// Derive smoothed probabilities for every trained context
    ///
    /// Recomputes from the counts each time, so repeated calls with the same
    /// bias give the same distributions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a negative or non-finite bias, and
    /// `DegenerateDistribution` if any context fails to normalize. The latter
    /// indicates a defect rather than bad input.
    pub fn finalize(&mut self, bias: f64) -> Result<()> {
        if !bias.is_finite() || bias < 0.0 {
            return Err(invalid_parameter(
                "smoothing_bias",
                &bias,
                &"bias must be finite and non-negative",
            ));
        }

        let mut probabilities = HashMap::with_capacity(self.counts.len());
        for (context, colors) in &self.counts {
            let counts: Vec<u64> = colors.values().copied().collect();
            let outcomes: Vec<(Color, f64)> = colors
                .keys()
                .copied()
                .zip(additive_smoothing(&counts, bias))
                .collect();

            let error = normalization_error(outcomes.iter().map(|&(_, p)| p));
            if error > NORMALIZATION_TOLERANCE {
                return Err(SpriteError::DegenerateDistribution {
                    context: context.to_string(),
                    total: outcomes.iter().map(|&(_, p)| p).sum(),
                });
            }
            probabilities.insert(context.clone(), Distribution { outcomes });
        }

        debug!(
            "finalized {} context(s) from {} observation(s) with bias {bias}",
            probabilities.len(),
            self.observations
        );
        self.probabilities = Some(probabilities);
        Ok(())
    }

    /// Whether probabilities are current with respect to the counts
    pub const fn is_finalized(&self) -> bool {
        self.probabilities.is_some()
    }

    /// Number of distinct contexts observed
    pub fn context_count(&self) -> usize {
        self.counts.len()
    }

    /// Every observed context, in no particular order
    pub fn contexts(&self) -> impl Iterator<Item = &ContextKey> {
        self.counts.keys()
    }

    /// Total number of training observations
    pub const fn observation_count(&self) -> u64 {
        self.observations
    }

    /// True until at least one observation has been recorded
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Read-only view of the raw counts
    pub const fn counts(&self) -> &HashMap<ContextKey, BTreeMap<Color, u64>> {
        &self.counts
    }

    /// Occurrences of `color` under `context`
    pub fn count(&self, context: &ContextKey, color: Color) -> u64 {
        self.counts
            .get(context)
            .and_then(|colors| colors.get(&color))
            .copied()
            .unwrap_or(0)
    }

    /// Finalized distribution of a context
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFinalized` before `finalize`, and `UnknownContext` if
    /// the context was never observed
    pub fn distribution(&self, context: &ContextKey) -> Result<&Distribution> {
        self.probabilities
            .as_ref()
            .ok_or(SpriteError::ModelNotFinalized)?
            .get(context)
            .ok_or_else(|| SpriteError::UnknownContext {
                context: context.to_string(),
            })
    }

    /// Finalized probability of `color` under `context`
    pub fn probability(&self, context: &ContextKey, color: Color) -> Option<f64> {
        self.distribution(context)
            .ok()
            .and_then(|distribution| distribution.probability(color))
    }

    /// Draw a color for `context` given a uniform value in `[0, 1)`
    ///
    /// # Errors
    ///
    /// Returns `ModelNotFinalized` before `finalize`, and `UnknownContext` if
    /// the context was never observed
    pub fn sample(&self, context: &ContextKey, draw: f64) -> Result<Color> {
        self.distribution(context)?
            .sample(draw)
            .ok_or_else(|| SpriteError::UnknownContext {
                context: context.to_string(),
            })
    }

    /// Draw a color for `context`, consuming one value from `source`
    ///
    /// # Errors
    ///
    /// Same conditions as [`MarkovModel::sample`]
    pub fn sample_from<S: UnitSource + ?Sized>(
        &self,
        context: &ContextKey,
        source: &mut S,
    ) -> Result<Color> {
        self.sample(context, source.next_unit())
    }

    /// Color observed most often across all contexts
    ///
    /// Ties resolve to the smallest color so the answer is stable.
    pub fn most_frequent_color(&self) -> Option<Color> {
        let mut totals: BTreeMap<Color, u64> = BTreeMap::new();
        for colors in self.counts.values() {
            for (&color, &count) in colors {
                *totals.entry(color).or_insert(0) += count;
            }
        }

        let mut best: Option<(Color, u64)> = None;
        for (color, count) in totals {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((color, count));
            }
        }
        best.map(|(color, _)| color)
    }
}
