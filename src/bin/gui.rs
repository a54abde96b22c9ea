use fractal_engine::FractalVariant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut variant = FractalVariant::Mandelbrot;
    let mut prefer_gpu = true;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "mandelbrot" => variant = FractalVariant::Mandelbrot,
            "julia" => variant = FractalVariant::Julia,
            "ship" | "burning-ship" => variant = FractalVariant::BurningShip,
            "--cpu" => prefer_gpu = false,
            other => {
                return Err(format!(
                    "unknown argument '{other}' (expected mandelbrot, julia, burning-ship or --cpu)"
                )
                .into());
            }
        }
    }

    fractal_engine::run_gui(variant, prefer_gpu)
}
