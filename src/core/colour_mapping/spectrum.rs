use crate::core::colour_mapping::ColourSchemeKind;
use crate::core::colour_mapping::map::{ColourMap, ColourMapError};
use crate::core::data::colour::Colour;

// Palette constants: hue sweeps from cyan through blue and magenta as the
// escape ratio grows, compressed near zero by the square-root warp so shallow
// escapes still get visible hue separation.
const HUE_SCALE: f64 = 0.8;
const HUE_OFFSET: f64 = 0.5;
const SATURATION: f64 = 0.8;
const VALUE: f64 = 1.0;

/// HSV spectrum palette: inside points are black, escaped points get a hue
/// from the perceptually warped escape ratio.
#[derive(Debug)]
pub struct HsvSpectrum {
    max_iterations: u32,
}

impl HsvSpectrum {
    #[must_use]
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }
}

impl ColourMap for HsvSpectrum {
    fn colour_for(&self, iterations: u32) -> Result<Colour, ColourMapError> {
        if iterations > self.max_iterations {
            return Err(ColourMapError::IterationsExceedMax {
                iterations,
                max_iterations: self.max_iterations,
            });
        }

        if iterations == self.max_iterations {
            return Ok(Colour::BLACK);
        }

        let t = iterations as f64 / self.max_iterations as f64;
        let hue = t.sqrt() * HUE_SCALE + HUE_OFFSET;

        Ok(hsv_to_rgb(hue, SATURATION, VALUE))
    }

    fn kind(&self) -> ColourSchemeKind {
        ColourSchemeKind::HsvSpectrum
    }
}

/// Standard sextant HSV→RGB conversion. `h` is in turns and wraps.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Colour {
    let h = h.rem_euclid(1.0) * 6.0;
    let sextant = h.floor() as u32 % 6;
    let f = h - h.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sextant {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Colour {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: (b * 255.0).round() as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inside_points_are_black() {
        let map = HsvSpectrum::new(100);
        assert_eq!(map.colour_for(100).unwrap(), Colour::BLACK);
    }

    #[test]
    fn test_zero_iterations_is_cyan() {
        // t = 0 → hue 0.5 → sextant 3 with f = 0 → (p, v, v) scaled:
        // p = 1 - 0.8 = 0.2 → 51.
        let map = HsvSpectrum::new(100);
        let colour = map.colour_for(0).unwrap();

        assert_eq!(colour, Colour { r: 51, g: 255, b: 255 });
    }

    #[test]
    fn test_escaped_points_are_never_black() {
        let map = HsvSpectrum::new(64);

        for iterations in 0..64 {
            let colour = map.colour_for(iterations).unwrap();
            assert_ne!(colour, Colour::BLACK, "iteration {iterations}");
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let map = HsvSpectrum::new(500);

        assert_eq!(map.colour_for(37).unwrap(), map.colour_for(37).unwrap());
    }

    #[test]
    fn test_rejects_counts_above_max() {
        let map = HsvSpectrum::new(50);

        assert_eq!(
            map.colour_for(51),
            Err(ColourMapError::IterationsExceedMax {
                iterations: 51,
                max_iterations: 50
            })
        );
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Colour { r: 255, g: 0, b: 0 });
        assert_eq!(
            hsv_to_rgb(1.0 / 3.0, 1.0, 1.0),
            Colour { r: 0, g: 255, b: 0 }
        );
        assert_eq!(
            hsv_to_rgb(2.0 / 3.0, 1.0, 1.0),
            Colour { r: 0, g: 0, b: 255 }
        );
        // hue wraps past a full turn
        assert_eq!(hsv_to_rgb(1.5, 1.0, 1.0), hsv_to_rgb(0.5, 1.0, 1.0));
    }
}
