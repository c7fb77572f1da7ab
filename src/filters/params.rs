// ============================================================================
// FILTER PARAMS — the nine grading knobs consumed by both backends
// ============================================================================

use serde::{Deserialize, Serialize};

/// One complete set of grading knobs. Immutable by convention: the pipeline
/// receives a value (never a shared mutable reference), so repeated renders
/// from the same source are reproducible.
///
/// Multiplicative knobs (`strength`, `contrast`, `saturation`) are neutral
/// at 1.0; additive/offset knobs are neutral at 0.0. The pipeline does not
/// enforce UI slider ranges — every stage clamps its own output, so any
/// finite value degrades gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Global blend between the original and fully graded pixel (0..=1 typical).
    pub strength: f32,
    /// Additive exposure offset (-0.5..=0.5 typical).
    pub exposure: f32,
    /// Contrast multiplier around mid-gray (0..=2, 1 = neutral).
    pub contrast: f32,
    /// Saturation multiplier in HSL space (0..=2, 1 = neutral).
    pub saturation: f32,
    /// Temperature shift: positive warms, negative cools (-0.3..=0.3).
    #[serde(alias = "temperature")]
    pub temp: f32,
    /// Tint shift: positive toward magenta, negative toward green (-0.3..=0.3).
    pub tint: f32,
    /// Matte fade amount (0..=0.5).
    pub fade: f32,
    /// Radial edge darkening strength (0..=1).
    pub vignette: f32,
    /// Midtone-weighted noise amount (0..=1).
    pub grain: f32,
}

impl Default for FilterParams {
    /// The identity transform ("Normal" preset).
    fn default() -> Self {
        Self {
            strength: 1.0,
            exposure: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            temp: 0.0,
            tint: 0.0,
            fade: 0.0,
            vignette: 0.0,
            grain: 0.0,
        }
    }
}

impl FilterParams {
    /// True when every knob holds a finite value. The pipeline itself never
    /// rejects inputs; callers that accept external data (the CLI params
    /// file) use this to refuse NaN/∞ before dispatch.
    pub fn is_finite(&self) -> bool {
        [
            self.strength,
            self.exposure,
            self.contrast,
            self.saturation,
            self.temp,
            self.tint,
            self.fade,
            self.vignette,
            self.grain,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let p = FilterParams::default();
        assert_eq!(p.strength, 1.0);
        assert_eq!(p.contrast, 1.0);
        assert_eq!(p.saturation, 1.0);
        assert_eq!(p.exposure, 0.0);
        assert_eq!(p.temp, 0.0);
        assert_eq!(p.tint, 0.0);
        assert_eq!(p.fade, 0.0);
        assert_eq!(p.vignette, 0.0);
        assert_eq!(p.grain, 0.0);
    }

    #[test]
    fn json_round_trip_and_partial_files() {
        let p = FilterParams {
            exposure: 0.05,
            vignette: 0.3,
            ..Default::default()
        };
        let json = serde_json::to_string(&p).unwrap();
        let back: FilterParams = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);

        // Missing fields fall back to neutral, `temperature` aliases `temp`
        let sparse: FilterParams =
            serde_json::from_str(r#"{ "temperature": 0.1, "grain": 0.08 }"#).unwrap();
        assert_eq!(sparse.temp, 0.1);
        assert_eq!(sparse.grain, 0.08);
        assert_eq!(sparse.contrast, 1.0);
    }

    #[test]
    fn finiteness_check() {
        assert!(FilterParams::default().is_finite());
        let bad = FilterParams {
            fade: f32::NAN,
            ..Default::default()
        };
        assert!(!bad.is_finite());
    }
}
