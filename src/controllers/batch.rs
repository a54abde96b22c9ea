use std::path::Path;
use std::time::Instant;

use crate::core::actions::render_frame::render_frame;
use crate::core::colour_mapping::{ColourSchemeKind, colour_map_for};
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::render_request::RenderRequest;
use crate::core::data::viewport::Viewport;
use crate::core::fractals::params::{FractalParams, FractalVariant};
use crate::storage::write_ppm::write_ppm;

/// Renders one frame of the chosen variant to a PPM file using the batch CPU
/// path. CLI entry point; progress goes to stdout.
pub fn render_to_ppm(
    variant: FractalVariant,
    width: u32,
    height: u32,
    filepath: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut viewport = Viewport::initial(width, height)?;
    let home = variant.home_center();
    viewport.reset(home.0, home.1);

    let params = FractalParams::with_defaults(variant);
    let request = RenderRequest::new(1, viewport, params);

    println!("Rendering {} set...", variant);
    println!("Image size: {}x{}", width, height);
    println!("Max iterations: {}", params.max_iterations);

    let start = Instant::now();
    let counts = render_frame(&request);
    println!("Duration:   {:?}", start.elapsed());

    let colour_map = colour_map_for(ColourSchemeKind::HsvSpectrum, params.max_iterations);
    let mut buffer = PixelBuffer::new(width, height);
    for (index, &iterations) in counts.iter().enumerate() {
        let x = (index % width as usize) as u32;
        let y = (index / width as usize) as u32;
        buffer.set_pixel(x, y, colour_map.colour_for(iterations)?)?;
    }

    write_ppm(&buffer, &filepath)?;
    println!("Saved to {}", filepath.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_to_ppm_writes_file() {
        let dir = std::env::temp_dir().join("fractal_engine_batch_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mandelbrot.ppm");

        let result = render_to_ppm(FractalVariant::Mandelbrot, 32, 24, &path);

        assert!(result.is_ok());
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(b"P6\n32 24\n255\n"));
        assert_eq!(written.len(), b"P6\n32 24\n255\n".len() + 32 * 24 * 3);

        std::fs::remove_file(&path).unwrap();
    }
}
