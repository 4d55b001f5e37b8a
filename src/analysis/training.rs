//! Feeds extracted sprite regions into a Markov model

use crate::algorithm::model::MarkovModel;
use crate::analysis::context::ContextEncoder;
use crate::spatial::buffer::{PixelBuffer, Rect};
use crate::spatial::regions::RegionExtractor;
use log::debug;

/// What a single training image contributed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    /// Regions extracted from the image
    pub regions: usize,
    /// Observations recorded (every pixel of every region rectangle)
    pub observations: usize,
}

impl TrainingSummary {
    /// True when the image contained no opaque pixels
    pub const fn is_empty(&self) -> bool {
        self.regions == 0
    }
}

/// Extract the regions of `buffer` and train on each of them
pub fn train_on_buffer(
    model: &mut MarkovModel,
    encoder: &ContextEncoder,
    extractor: &RegionExtractor,
    buffer: &PixelBuffer,
) -> TrainingSummary {
    let regions = extractor.extract(buffer);
    train_on_regions(model, encoder, buffer, &regions)
}

/// Train on already extracted regions of `buffer`
pub fn train_on_regions(
    model: &mut MarkovModel,
    encoder: &ContextEncoder,
    buffer: &PixelBuffer,
    regions: &[Rect],
) -> TrainingSummary {
    let observations = regions
        .iter()
        .map(|&region| train_on_region(model, encoder, buffer, region))
        .sum();

    let summary = TrainingSummary {
        regions: regions.len(),
        observations,
    };
    debug!(
        "trained {} observation(s) from {} region(s); model holds {} context(s)",
        summary.observations,
        summary.regions,
        model.context_count()
    );
    summary
}

/// Train on every pixel of `region`, transparent holes included
///
/// Neighbours are read from `buffer` itself and only within the region, so
/// adjacent sprites never leak into each other's contexts.
pub fn train_on_region(
    model: &mut MarkovModel,
    encoder: &ContextEncoder,
    buffer: &PixelBuffer,
    region: Rect,
) -> usize {
    let mut observations = 0;
    for point in region.points() {
        let Some(color) = buffer.get(point.x, point.y) else {
            continue;
        };
        let context = encoder.context(region, point, |n| buffer.get(n.x, n.y));
        model.train(context, color);
        observations += 1;
    }
    observations
}
