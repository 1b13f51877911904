use serde::{Deserialize, Serialize};

/// Quotas for every generator. Defaults reproduce the classroom protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrialConfig {
    /// Bouba-Kiki 2AFC trials; the word list is cycled to reach this count
    pub bouba_main_trials: usize,

    /// Bouba-Kiki control shapes per category (rounded and spiky)
    pub bouba_control_per_type: usize,

    /// DRM studied probes drawn from each serial-position band
    pub drm_probes_per_band: usize,

    /// DRM distractors per list
    pub drm_unrelated_per_list: usize,
    pub drm_related_per_list: usize,

    /// Scanning pairs drawn from each distance tercile
    pub scanning_per_tercile: usize,

    /// Rotation trials per (rotation difference x same/different) cell
    pub rotation_per_cell: usize,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            bouba_main_trials: 12,
            bouba_control_per_type: 2,
            drm_probes_per_band: 2,
            drm_unrelated_per_list: 7,
            drm_related_per_list: 0,
            scanning_per_tercile: 7,
            rotation_per_cell: 5,
        }
    }
}
