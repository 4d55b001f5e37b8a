//! Tests for raster-order synthesis, fallback policies and refinement

#[cfg(test)]
mod tests {
    use procsprites::SpriteError;
    use procsprites::algorithm::model::MarkovModel;
    use procsprites::algorithm::synthesizer::{
        FallbackPolicy, RandomSelector, Synthesizer, UnitSource,
    };
    use procsprites::analysis::context::{CausalNeighborhood, ContextEncoder};
    use procsprites::analysis::quantizer::ColorQuantizer;
    use procsprites::analysis::training::train_on_buffer;
    use procsprites::spatial::buffer::{Color, PixelBuffer};
    use procsprites::spatial::regions::RegionExtractor;

    const RED: Color = Color::opaque(0xFF, 0, 0);
    const DARK: Color = Color::opaque(0x10, 0x10, 0x10);

    /// Cycles through a fixed list of draws and counts how many were taken
    struct Scripted {
        draws: Vec<f64>,
        taken: usize,
    }

    impl Scripted {
        fn new(draws: Vec<f64>) -> Self {
            Self { draws, taken: 0 }
        }
    }

    impl UnitSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            let len = self.draws.len().max(1);
            let value = self.draws.get(self.taken % len).copied().unwrap_or(0.0);
            self.taken += 1;
            value
        }
    }

    fn encoder(buckets: usize) -> ContextEncoder {
        let Ok(neighborhood) = CausalNeighborhood::of_order(1) else {
            unreachable!("order 1 is supported");
        };
        let Ok(encoder) = ContextEncoder::new(ColorQuantizer::default(), neighborhood, buckets)
        else {
            unreachable!("bucket count is supported");
        };
        encoder
    }

    fn model_from(buffer: &PixelBuffer, encoder: &ContextEncoder) -> MarkovModel {
        let mut model = MarkovModel::new();
        train_on_buffer(&mut model, encoder, &RegionExtractor::new(), buffer);
        assert!(model.finalize(3.0).is_ok());
        model
    }

    fn solid(width: usize, height: usize, color: Color) -> PixelBuffer {
        let Ok(buffer) = PixelBuffer::filled(width, height, color) else {
            unreachable!("test buffers are non-empty");
        };
        buffer
    }

    // A solid training square reproduces itself at any size
    #[test]
    fn test_solid_model_generates_solid_output() {
        let encoder = encoder(0);
        let model = model_from(&solid(2, 2, RED), &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);

        let Ok(image) = synthesizer.generate(5, 3, 1, &mut RandomSelector::new(7)) else {
            unreachable!("generation from a finalized model succeeds");
        };
        assert_eq!((image.width(), image.height()), (5, 3));
        assert!(image.enumerate().all(|(_, color)| color == RED));
    }

    // Every pixel consumes exactly one draw per pass
    #[test]
    fn test_one_draw_per_pixel_per_pass() {
        let encoder = encoder(0);
        let model = model_from(&solid(2, 2, RED), &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);

        let mut source = Scripted::new(vec![0.5]);
        assert!(synthesizer.generate(4, 3, 2, &mut source).is_ok());
        assert_eq!(source.taken, 24);
    }

    // Errors are reported before any output is produced
    #[test]
    fn test_generation_preconditions() {
        let encoder = encoder(0);
        let empty = MarkovModel::new();
        let synthesizer = Synthesizer::new(&empty, &encoder, FallbackPolicy::Transparent);
        assert!(matches!(
            synthesizer.generate(2, 2, 1, &mut RandomSelector::new(0)),
            Err(SpriteError::NoTrainingData)
        ));

        let mut unfinalized = MarkovModel::new();
        train_on_buffer(
            &mut unfinalized,
            &encoder,
            &RegionExtractor::new(),
            &solid(2, 2, RED),
        );
        let synthesizer = Synthesizer::new(&unfinalized, &encoder, FallbackPolicy::Transparent);
        assert!(matches!(
            synthesizer.generate(2, 2, 1, &mut RandomSelector::new(0)),
            Err(SpriteError::ModelNotFinalized)
        ));

        let model = model_from(&solid(2, 2, RED), &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);
        let mut source = Scripted::new(vec![0.5]);
        assert!(matches!(
            synthesizer.generate(2, 2, 0, &mut source),
            Err(SpriteError::InvalidParameter { parameter: "passes", .. })
        ));
        assert!(matches!(
            synthesizer.generate(0, 2, 1, &mut source),
            Err(SpriteError::InvalidBuffer { .. })
        ));
        assert_eq!(source.taken, 0);
    }

    // Contexts missing from a bucketed model fall back per policy
    #[test]
    fn test_fallback_policies() {
        // A 1x1 sprite only ever sees the all-outside context in bucket (0, 0)
        let encoder = encoder(2);
        let model = model_from(&solid(1, 1, DARK), &encoder);

        let transparent = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);
        let Ok(synthesis) = transparent.generate_traced(3, 3, 1, &mut RandomSelector::new(1))
        else {
            unreachable!("generation from a finalized model succeeds");
        };
        assert_eq!(synthesis.image.get(0, 0), Some(DARK));
        assert_eq!(synthesis.image.get(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(synthesis.fallback_count, 8);
        assert_eq!(synthesis.probabilities.get((2, 2)), Some(&0.0));
        assert_eq!(synthesis.probabilities.get((0, 0)), Some(&1.0));

        let frequent = Synthesizer::new(&model, &encoder, FallbackPolicy::MostFrequent);
        assert_eq!(frequent.fallback(), FallbackPolicy::MostFrequent);
        let Ok(image) = frequent.generate(3, 3, 1, &mut RandomSelector::new(1)) else {
            unreachable!("generation from a finalized model succeeds");
        };
        assert!(image.enumerate().all(|(_, color)| color == DARK));
    }

    // Refinement of a solid model stays solid
    #[test]
    fn test_refinement_keeps_solid_output() {
        let encoder = encoder(0);
        let model = model_from(&solid(2, 2, RED), &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);

        let Ok(synthesis) = synthesizer.generate_traced(4, 4, 3, &mut RandomSelector::new(3))
        else {
            unreachable!("generation from a finalized model succeeds");
        };
        assert_eq!(synthesis.passes, 3);
        assert!(synthesis.image.enumerate().all(|(_, color)| color == RED));
    }

    // Blended colors snap back onto trained colors
    #[test]
    fn test_refilter() {
        let Ok(mut sheet) = PixelBuffer::new(5, 1) else {
            unreachable!("5x1 buffer should allocate");
        };
        sheet.set(0, 0, Color::grey(0xF0));
        sheet.set(2, 0, Color::grey(0x20));
        let encoder = encoder(0);
        let model = model_from(&sheet, &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::Transparent);

        // Palette colors pass through
        assert_eq!(synthesizer.refilter(Color::grey(0xF0)), Color::grey(0xF0));
        // Same atom as a palette color: nearest palette color wins
        assert_eq!(synthesizer.refilter(Color::grey(0xE0)), Color::grey(0xF0));
        // No palette color shares the atom: quantizer representative
        assert_eq!(synthesizer.refilter(Color::grey(0x70)), Color::grey(0x80));
    }

    // The same seed gives the same image
    #[test]
    fn test_seeded_generation_is_deterministic() {
        let Ok(mut sheet) = PixelBuffer::new(4, 4) else {
            unreachable!("4x4 buffer should allocate");
        };
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (2, 1), (1, 2)] {
            sheet.set(x, y, if (x + y) % 2 == 0 { RED } else { DARK });
        }
        let encoder = encoder(0);
        let model = model_from(&sheet, &encoder);
        let synthesizer = Synthesizer::new(&model, &encoder, FallbackPolicy::MostFrequent);

        let first = synthesizer.generate(8, 8, 2, &mut RandomSelector::new(42));
        let second = synthesizer.generate(8, 8, 2, &mut RandomSelector::new(42));
        let (Ok(first), Ok(second)) = (first, second) else {
            unreachable!("generation from a finalized model succeeds");
        };
        assert_eq!(first, second);
    }
}
