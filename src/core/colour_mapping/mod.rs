pub mod fire_gradient;
pub mod map;
pub mod spectrum;

use crate::core::colour_mapping::fire_gradient::FireGradient;
use crate::core::colour_mapping::map::ColourMap;
use crate::core::colour_mapping::spectrum::HsvSpectrum;

/// Selects which palette maps iteration counts to colours.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColourSchemeKind {
    HsvSpectrum,
    FireGradient,
}

impl ColourSchemeKind {
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::HsvSpectrum => "HSV spectrum",
            Self::FireGradient => "Fire gradient",
        }
    }
}

#[must_use]
pub fn colour_map_for(kind: ColourSchemeKind, max_iterations: u32) -> Box<dyn ColourMap> {
    match kind {
        ColourSchemeKind::HsvSpectrum => Box::new(HsvSpectrum::new(max_iterations)),
        ColourSchemeKind::FireGradient => Box::new(FireGradient::new(max_iterations)),
    }
}
