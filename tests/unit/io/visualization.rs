//! Tests for probability maps and region overlays

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use procsprites::algorithm::synthesizer::Synthesis;
    use procsprites::io::visualization::{probability_map, probability_to_grey, region_overlay};
    use procsprites::spatial::buffer::{Color, PixelBuffer, Rect};

    const MAGENTA: Color = Color::opaque(0xFF, 0, 0xFF);

    // Probabilities map linearly onto grey and are clamped
    #[test]
    fn test_probability_to_grey() {
        assert_eq!(probability_to_grey(0.0), 0);
        assert_eq!(probability_to_grey(1.0), 255);
        assert_eq!(probability_to_grey(0.5), 128);
        assert_eq!(probability_to_grey(-3.0), 0);
        assert_eq!(probability_to_grey(7.0), 255);
    }

    // The map has the trace's shape with (row, col) mapped to (y, x)
    #[test]
    fn test_probability_map() {
        let Ok(image) = PixelBuffer::new(3, 2) else {
            unreachable!("3x2 buffer should allocate");
        };
        let mut probabilities: Array2<f64> = Array2::zeros((2, 3));
        if let Some(cell) = probabilities.get_mut((1, 2)) {
            *cell = 1.0;
        }
        let synthesis = Synthesis {
            image,
            probabilities,
            fallback_count: 5,
            passes: 1,
        };

        let Ok(map) = probability_map(&synthesis) else {
            unreachable!("trace is non-empty");
        };
        assert_eq!((map.width(), map.height()), (3, 2));
        assert_eq!(map.get(2, 1), Some(Color::grey(255)));
        assert_eq!(map.get(0, 0), Some(Color::grey(0)));
    }

    // Outlines follow the rectangle edges and leave interiors untouched
    #[test]
    fn test_region_overlay() {
        let Ok(buffer) = PixelBuffer::filled(6, 6, Color::grey(0x40)) else {
            unreachable!("6x6 buffer should allocate");
        };
        let overlay = region_overlay(&buffer, &[Rect::new(1, 1, 4, 3)], MAGENTA);

        assert_eq!(overlay.get(1, 1), Some(MAGENTA));
        assert_eq!(overlay.get(4, 3), Some(MAGENTA));
        assert_eq!(overlay.get(2, 2), Some(Color::grey(0x40)));
        assert_eq!(overlay.get(5, 1), Some(Color::grey(0x40)));
        assert_eq!(overlay.get(2, 4), Some(Color::grey(0x40)));
        assert_eq!(buffer.get(1, 1), Some(Color::grey(0x40)));
    }
}
