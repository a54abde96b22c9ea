use fractal_engine::FractalVariant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let variant = match std::env::args().nth(1).as_deref() {
        None | Some("mandelbrot") => FractalVariant::Mandelbrot,
        Some("julia") => FractalVariant::Julia,
        Some("ship") | Some("burning-ship") => FractalVariant::BurningShip,
        Some(other) => {
            return Err(format!(
                "unknown fractal variant '{other}' (expected mandelbrot, julia or burning-ship)"
            )
            .into());
        }
    };

    let filename = match variant {
        FractalVariant::Mandelbrot => "output/mandelbrot.ppm",
        FractalVariant::Julia => "output/julia.ppm",
        FractalVariant::BurningShip => "output/burning_ship.ppm",
    };

    std::fs::create_dir_all("output")?;
    fractal_engine::render_to_ppm(variant, 800, 600, filename)?;

    Ok(())
}
