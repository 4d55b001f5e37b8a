//! Tests for configuration defaults and validation

#[cfg(test)]
mod tests {
    use procsprites::SpriteError;
    use procsprites::io::configuration::{
        DEFAULT_OUTPUT_HEIGHT, DEFAULT_OUTPUT_WIDTH, DEFAULT_THRESHOLDS, MAX_PASSES,
        SynthesisConfig,
    };

    fn rejected_parameter(config: &SynthesisConfig) -> Option<&'static str> {
        match config.validate() {
            Err(SpriteError::InvalidParameter { parameter, .. }) => Some(parameter),
            _ => None,
        }
    }

    // The default configuration is valid
    #[test]
    fn test_default_is_valid() {
        let config = SynthesisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds, DEFAULT_THRESHOLDS.to_vec());
        assert_eq!(
            (config.width, config.height),
            (DEFAULT_OUTPUT_WIDTH, DEFAULT_OUTPUT_HEIGHT)
        );
        assert_eq!(config.order, 1);
        assert_eq!(config.passes, 1);
    }

    // Each option is checked and named when out of range
    #[test]
    fn test_rejects_out_of_range_options() {
        let base = SynthesisConfig::default();

        let cases = [
            (
                SynthesisConfig {
                    thresholds: vec![0x80, 0x10],
                    ..base.clone()
                },
                "thresholds",
            ),
            (
                SynthesisConfig {
                    order: 0,
                    ..base.clone()
                },
                "order",
            ),
            (
                SynthesisConfig {
                    offsets: Some(vec![(1, 0)]),
                    ..base.clone()
                },
                "offsets",
            ),
            (
                SynthesisConfig {
                    position_buckets: 200,
                    ..base.clone()
                },
                "position_buckets",
            ),
            (
                SynthesisConfig {
                    smoothing_bias: -0.5,
                    ..base.clone()
                },
                "smoothing_bias",
            ),
            (
                SynthesisConfig {
                    passes: 0,
                    ..base.clone()
                },
                "passes",
            ),
            (
                SynthesisConfig {
                    passes: MAX_PASSES + 1,
                    ..base.clone()
                },
                "passes",
            ),
            (
                SynthesisConfig {
                    width: 0,
                    ..base.clone()
                },
                "dimensions",
            ),
        ];

        for (config, parameter) in &cases {
            assert_eq!(rejected_parameter(config), Some(*parameter));
        }
    }

    // Zero bias and disabled bucketing are allowed
    #[test]
    fn test_accepts_edge_values() {
        let config = SynthesisConfig {
            smoothing_bias: 0.0,
            position_buckets: 0,
            passes: MAX_PASSES,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
