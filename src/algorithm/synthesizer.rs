//! Raster-order ancestral sampling with optional multi-pass refinement
//!
//! The first pass fills a fresh buffer top-to-bottom, left-to-right, so every
//! causal neighbour of a pixel has already been written when its context is
//! built. Each further pass resamples a candidate against the previous pass,
//! averages it into the existing pixel and snaps the result back onto the
//! trained palette. One pass disables refinement.

use crate::algorithm::model::MarkovModel;
use crate::analysis::context::{ContextEncoder, ContextKey};
use crate::io::error::{Result, SpriteError, invalid_parameter};
use crate::spatial::buffer::{Color, PixelBuffer, Point};
use log::{debug, info};
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;

/// Stream of uniform values in `[0, 1)` consumed by sampling
///
/// Injected explicitly so that generation is reproducible under a fixed stream.
pub trait UnitSource {
    /// Next uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f64;
}

/// Seeded random source for reproducible stochastic choices
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random source
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl UnitSource for RandomSelector {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// What to write when a context was never observed during training
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FallbackPolicy {
    /// Write a fully transparent background pixel
    #[default]
    Transparent,
    /// Write the color observed most often across all contexts
    MostFrequent,
}

/// Generated image together with its per-pixel sampling trace
#[derive(Clone, Debug)]
pub struct Synthesis {
    /// Final buffer after all passes
    pub image: PixelBuffer,
    /// Probability of the color drawn for each pixel in the last pass,
    /// indexed `(row, col)`; zero where the fallback policy applied
    pub probabilities: Array2<f64>,
    /// Pixels across all passes whose context was unknown
    pub fallback_count: usize,
    /// Number of passes run
    pub passes: usize,
}

/// Fills buffers by sampling a finalized model
pub struct Synthesizer<'a> {
    model: &'a MarkovModel,
    encoder: &'a ContextEncoder,
    fallback: FallbackPolicy,
    fallback_color: Color,
    palette: BTreeSet<Color>,
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer over a model and the encoder it was trained with
    pub fn new(
        model: &'a MarkovModel,
        encoder: &'a ContextEncoder,
        fallback: FallbackPolicy,
    ) -> Self {
        let fallback_color = match fallback {
            FallbackPolicy::Transparent => Color::TRANSPARENT,
            FallbackPolicy::MostFrequent => {
                model.most_frequent_color().unwrap_or(Color::TRANSPARENT)
            }
        };
        let palette = model
            .counts()
            .values()
            .flat_map(|colors| colors.keys().copied())
            .collect();

        Self {
            model,
            encoder,
            fallback,
            fallback_color,
            palette,
        }
    }

    /// Active fallback policy
    pub const fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Generate a `width`×`height` buffer
    ///
    /// # Errors
    ///
    /// Same conditions as [`Synthesizer::generate_traced`]
    pub fn generate<S: UnitSource + ?Sized>(
        &self,
        width: usize,
        height: usize,
        passes: usize,
        source: &mut S,
    ) -> Result<PixelBuffer> {
        self.generate_traced(width, height, passes, source)
            .map(|synthesis| synthesis.image)
    }

    /// Generate a buffer and keep the probability of every drawn color
    ///
    /// # Errors
    ///
    /// Returns, before allocating any output:
    /// - `NoTrainingData` if the model has no trained contexts
    /// - `ModelNotFinalized` if probabilities are missing or stale
    /// - `InvalidParameter` if `passes` is zero
    /// - `InvalidBuffer` if either dimension is invalid
    pub fn generate_traced<S: UnitSource + ?Sized>(
        &self,
        width: usize,
        height: usize,
        passes: usize,
        source: &mut S,
    ) -> Result<Synthesis> {
        if self.model.is_empty() {
            return Err(SpriteError::NoTrainingData);
        }
        if !self.model.is_finalized() {
            return Err(SpriteError::ModelNotFinalized);
        }
        if passes == 0 {
            return Err(invalid_parameter(
                "passes",
                &passes,
                &"at least one pass is required",
            ));
        }

        let mut image = PixelBuffer::new(width, height)?;
        let bounds = image.bounds();
        let mut probabilities = Array2::zeros((height, width));
        let mut fallback_count = 0usize;

        for point in bounds.points() {
            let context = self
                .encoder
                .context(bounds, point, |n| image.get(n.x, n.y));
            let (color, probability) = self.draw(&context, source, &mut fallback_count)?;
            image.set(point.x, point.y, color);
            record(&mut probabilities, point, probability);
        }
        debug!("pass 1/{passes} complete ({fallback_count} fallback pixel(s))");

        for pass in 2..=passes {
            let mut refined = PixelBuffer::new(width, height)?;
            for point in bounds.points() {
                let context = self
                    .encoder
                    .context(bounds, point, |n| image.get(n.x, n.y));
                let (candidate, probability) =
                    self.draw(&context, source, &mut fallback_count)?;
                let current = image.get(point.x, point.y).unwrap_or(Color::TRANSPARENT);
                refined.set(point.x, point.y, self.refilter(current.mean(candidate)));
                record(&mut probabilities, point, probability);
            }
            image = refined;
            debug!("pass {pass}/{passes} complete ({fallback_count} fallback pixel(s))");
        }

        info!(
            "generated {width}x{height} buffer in {passes} pass(es), {fallback_count} fallback pixel(s)"
        );
        Ok(Synthesis {
            image,
            probabilities,
            fallback_count,
            passes,
        })
    }

    /// Snap a blended color back onto the trained palette
    ///
    /// A color already in the palette is kept. Otherwise the nearest palette
    /// color sharing its quantized atom is used, and when no palette color
    /// shares the atom the quantizer's representative color is returned.
    pub fn refilter(&self, color: Color) -> Color {
        if self.palette.contains(&color) {
            return color;
        }

        let quantizer = self.encoder.quantizer();
        let atom = quantizer.atom(color);
        let mut nearest: Option<(u32, Color)> = None;
        for &candidate in &self.palette {
            if quantizer.atom(candidate) != atom {
                continue;
            }
            let distance = squared_distance(color, candidate);
            if nearest.is_none_or(|(best, _)| distance < best) {
                nearest = Some((distance, candidate));
            }
        }

        nearest.map_or_else(|| quantizer.filter(color), |(_, candidate)| candidate)
    }

    fn draw<S: UnitSource + ?Sized>(
        &self,
        context: &ContextKey,
        source: &mut S,
        fallback_count: &mut usize,
    ) -> Result<(Color, f64)> {
        let draw = source.next_unit();
        match self.model.distribution(context) {
            Ok(distribution) => {
                let color = distribution.sample(draw).unwrap_or(self.fallback_color);
                Ok((color, distribution.probability(color).unwrap_or(0.0)))
            }
            Err(SpriteError::UnknownContext { .. }) => {
                *fallback_count += 1;
                Ok((self.fallback_color, 0.0))
            }
            Err(error) => Err(error),
        }
    }
}

fn record(probabilities: &mut Array2<f64>, point: Point, probability: f64) {
    if let Some(cell) = probabilities.get_mut((point.y as usize, point.x as usize)) {
        *cell = probability;
    }
}

fn squared_distance(a: Color, b: Color) -> u32 {
    a.0.iter()
        .zip(&b.0)
        .map(|(&x, &y)| {
            let delta = u32::from(x.abs_diff(y));
            delta * delta
        })
        .sum()
}
