//! Tests for channel quantization and atoms

#[cfg(test)]
mod tests {
    use procsprites::SpriteError;
    use procsprites::analysis::quantizer::{Atom, ColorQuantizer};
    use procsprites::spatial::buffer::Color;

    // Default thresholds give five levels with a greyscale alphabet
    #[test]
    fn test_default_quantizer() {
        let quantizer = ColorQuantizer::default();
        assert_eq!(quantizer.thresholds(), &[0x40, 0x80, 0xB0, 0xFF]);
        assert_eq!(quantizer.levels(), 5);
        assert!(quantizer.is_greyscale());
    }

    // A value maps to the first threshold at or above it
    #[test]
    fn test_quantize_boundaries() {
        let quantizer = ColorQuantizer::default();
        assert_eq!(quantizer.quantize(0), 0);
        assert_eq!(quantizer.quantize(0x40), 0);
        assert_eq!(quantizer.quantize(0x41), 1);
        assert_eq!(quantizer.quantize(0xB0), 2);
        assert_eq!(quantizer.quantize(0xFF), 3);
    }

    // Values above the last threshold land on the extra level
    #[test]
    fn test_quantize_past_last_threshold() {
        let Ok(quantizer) = ColorQuantizer::new(vec![10, 20], true) else {
            unreachable!("ascending thresholds are valid");
        };
        assert_eq!(quantizer.quantize(21), 2);
        assert_eq!(quantizer.dequantize(2), 255);
    }

    // Level 0 dequantizes to 0, not to the first threshold
    #[test]
    fn test_dequantize() {
        let quantizer = ColorQuantizer::default();
        assert_eq!(quantizer.dequantize(0), 0);
        assert_eq!(quantizer.dequantize(1), 0x80);
        assert_eq!(quantizer.dequantize(3), 0xFF);
        assert_eq!(quantizer.dequantize(4), 255);
    }

    // Invalid threshold lists are rejected
    #[test]
    fn test_invalid_thresholds() {
        assert!(matches!(
            ColorQuantizer::new(Vec::new(), true),
            Err(SpriteError::InvalidParameter {
                parameter: "thresholds",
                ..
            })
        ));
        assert!(ColorQuantizer::new(vec![0x80, 0x40], true).is_err());
        assert!(ColorQuantizer::new(vec![0x40, 0x40], true).is_err());
        assert!(ColorQuantizer::new((0..=250).collect(), true).is_err());
    }

    // Transparent pixels are empty atoms in both modes
    #[test]
    fn test_atoms() {
        let grey = ColorQuantizer::default();
        let Ok(color) = ColorQuantizer::new(vec![0x40, 0x80, 0xB0, 0xFF], false) else {
            unreachable!("default thresholds are valid");
        };
        let red = Color::opaque(0xFF, 0, 0);

        assert_eq!(grey.atom(Color::TRANSPARENT), Atom::Empty);
        assert_eq!(color.atom(Color::rgba(255, 255, 255, 0)), Atom::Empty);
        assert_eq!(grey.atom(red), Atom::Grey(1));
        assert_eq!(color.atom(red), Atom::Rgb([3, 0, 0]));
    }

    // Filtering snaps to the level representative and keeps alpha
    #[test]
    fn test_filter() {
        let quantizer = ColorQuantizer::default();
        assert_eq!(
            quantizer.filter(Color::rgba(0x70, 0x70, 0x70, 0x80)),
            Color::rgba(0x80, 0x80, 0x80, 0x80)
        );
        assert_eq!(
            quantizer.filter(Color::rgba(9, 9, 9, 0)),
            Color::TRANSPARENT
        );
        assert_eq!(quantizer.filter(Color::grey(0x10)), Color::grey(0));
    }

    // Atom rendering used in context keys
    #[test]
    fn test_atom_display() {
        assert_eq!(Atom::Outside.to_string(), "_");
        assert_eq!(Atom::Empty.to_string(), ".");
        assert_eq!(Atom::Grey(3).to_string(), "3");
        assert_eq!(Atom::Rgb([1, 0, 2]).to_string(), "(102)");
    }
}
