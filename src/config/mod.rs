//! Site configuration with YAML schema and validation.
//!
//! Caller-side data: machine geometry (or a named preset), the quality
//! and degradation constraints, search termination settings, and the
//! economics site parameters. The numerical core itself only ever sees
//! plain scalars resolved from this layer.
//!
//! Validation happens in two passes: schema constraints via the
//! `validator` derive at parse time, and the bound checks of
//! [`validate_parameters`], which collects human-readable messages
//! instead of failing on the first violation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{PowderError, PowderResult};
use crate::optimizer::OptimizerConfig;

/// Built-in SLS machine preset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MachinePreset {
    /// Stable lookup key.
    pub key: &'static str,
    /// Human-readable machine name.
    pub name: &'static str,
    /// Powder chamber volume in liters.
    pub chamber_volume_l: f64,
    /// Typical packing density for the machine.
    pub packing_density: f64,
    /// Build envelope, for display only.
    pub build_volume: &'static str,
    /// Machine class, for display only.
    pub class: &'static str,
}

/// Catalog of known SLS machines. In-memory only; nothing is persisted.
pub const MACHINE_PRESETS: [MachinePreset; 5] = [
    MachinePreset {
        key: "formlabs-fuse1-30w",
        name: "Formlabs Fuse 1+ 30W",
        chamber_volume_l: 8.17,
        packing_density: 0.29,
        build_volume: "165 x 165 x 300 mm",
        class: "Desktop",
    },
    MachinePreset {
        key: "eos-p770",
        name: "EOS P770",
        chamber_volume_l: 154.0,
        packing_density: 0.10,
        build_volume: "700 x 380 x 580 mm",
        class: "Industrial",
    },
    MachinePreset {
        key: "eos-p396",
        name: "EOS P396",
        chamber_volume_l: 89.0,
        packing_density: 0.11,
        build_volume: "340 x 340 x 600 mm",
        class: "Industrial",
    },
    MachinePreset {
        key: "3dsystems-spro60",
        name: "3D Systems sPro 60",
        chamber_volume_l: 68.0,
        packing_density: 0.12,
        build_volume: "381 x 330 x 457 mm",
        class: "Industrial",
    },
    MachinePreset {
        key: "hp-mjf5200",
        name: "HP Multi Jet Fusion 5200",
        chamber_volume_l: 116.0,
        packing_density: 0.13,
        build_volume: "380 x 284 x 380 mm",
        class: "Industrial",
    },
];

/// Look up a machine preset by key.
#[must_use]
pub fn find_preset(key: &str) -> Option<&'static MachinePreset> {
    MACHINE_PRESETS.iter().find(|p| p.key == key)
}

/// Top-level site configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Schema version for forward compatibility.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Machine geometry or preset selection.
    #[validate(nested)]
    #[serde(default)]
    pub machine: MachineParams,

    /// Quality and degradation constraints.
    #[validate(nested)]
    #[serde(default)]
    pub process: ProcessParams,

    /// Bisection termination settings.
    #[validate(nested)]
    #[serde(default)]
    pub search: SearchParams,

    /// Economics site parameters.
    #[validate(nested)]
    #[serde(default)]
    pub economics: EconomicsParams,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            machine: MachineParams::default(),
            process: ProcessParams::default(),
            search: SearchParams::default(),
            economics: EconomicsParams::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, YAML parsing
    /// fails, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> PowderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PowderResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }

    /// Create a builder for programmatic construction.
    #[must_use]
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::default()
    }

    /// Validate constraints beyond the per-field schema.
    fn validate_semantic(&self) -> PowderResult<()> {
        if let Some(key) = &self.machine.preset {
            if find_preset(key).is_none() {
                return Err(PowderError::config(format!(
                    "unknown machine preset '{key}'; known presets: {}",
                    MACHINE_PRESETS
                        .iter()
                        .map(|p| p.key)
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }
        if self.search.tolerance >= 1.0 {
            return Err(PowderError::config(
                "search tolerance must be smaller than the unit interval",
            ));
        }
        Ok(())
    }

    /// Machine geometry with any preset applied.
    ///
    /// A preset key overrides the explicit chamber volume and packing
    /// density fields, mirroring how an operator picking a machine
    /// from the catalog overwrites the form fields.
    ///
    /// # Errors
    ///
    /// Returns [`PowderError::Config`] for an unknown preset key.
    pub fn resolved_machine(&self) -> PowderResult<ResolvedMachine> {
        match &self.machine.preset {
            Some(key) => {
                let preset = find_preset(key).ok_or_else(|| {
                    PowderError::config(format!("unknown machine preset '{key}'"))
                })?;
                Ok(ResolvedMachine {
                    label: preset.name.to_string(),
                    chamber_volume_l: preset.chamber_volume_l,
                    packing_density: preset.packing_density,
                })
            }
            None => Ok(ResolvedMachine {
                label: "custom machine".to_string(),
                chamber_volume_l: self.machine.chamber_volume_l,
                packing_density: self.machine.packing_density,
            }),
        }
    }

    /// Optimizer settings derived from the process and search sections.
    #[must_use]
    pub const fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig {
            quality_threshold: self.process.quality_threshold,
            degraded_limit: self.process.degraded_limit,
            tolerance: self.search.tolerance,
            max_iterations: self.search.max_iterations,
        }
    }
}

/// Machine geometry after preset resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMachine {
    /// Display name of the machine.
    pub label: String,
    /// Powder chamber volume in liters.
    pub chamber_volume_l: f64,
    /// Packing density of the machine.
    pub packing_density: f64,
}

/// Machine section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MachineParams {
    /// Optional preset key; overrides the explicit fields below.
    #[serde(default)]
    pub preset: Option<String>,
    /// Powder chamber volume in liters.
    #[validate(range(min = 0.001))]
    #[serde(default = "default_chamber_volume")]
    pub chamber_volume_l: f64,
    /// Packing density of the machine.
    #[validate(range(min = 0.001, max = 0.5))]
    #[serde(default = "default_packing_density")]
    pub packing_density: f64,
}

const fn default_chamber_volume() -> f64 {
    8.17
}

const fn default_packing_density() -> f64 {
    0.29
}

impl Default for MachineParams {
    fn default() -> Self {
        Self {
            preset: None,
            chamber_volume_l: default_chamber_volume(),
            packing_density: default_packing_density(),
        }
    }
}

/// Process constraint section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProcessParams {
    /// Minimum acceptable quality index.
    #[validate(range(min = 0.4, max = 0.9))]
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    /// Maximum acceptable degraded stock fraction.
    #[validate(range(min = 0.0, max = 0.3))]
    #[serde(default = "default_degraded_limit")]
    pub degraded_limit: f64,
}

const fn default_quality_threshold() -> f64 {
    0.60
}

const fn default_degraded_limit() -> f64 {
    0.12
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            degraded_limit: default_degraded_limit(),
        }
    }
}

/// Search termination section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    /// Bisection interval width at which the search stops.
    #[validate(range(min = 0.000_000_001))]
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Iteration cap for the search.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

const fn default_tolerance() -> f64 {
    0.001
}

const fn default_max_iterations() -> usize {
    50
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Economics section of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EconomicsParams {
    /// Builds per year at this site.
    #[validate(range(min = 1))]
    #[serde(default = "default_builds_per_year")]
    pub builds_per_year: u32,
    /// Virgin powder cost per kg.
    #[validate(range(min = 0.001))]
    #[serde(default = "default_powder_cost")]
    pub powder_cost_per_kg: f64,
}

const fn default_builds_per_year() -> u32 {
    100
}

const fn default_powder_cost() -> f64 {
    50.0
}

impl Default for EconomicsParams {
    fn default() -> Self {
        Self {
            builds_per_year: default_builds_per_year(),
            powder_cost_per_kg: default_powder_cost(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SiteConfigBuilder {
    preset: Option<String>,
    chamber_volume_l: Option<f64>,
    packing_density: Option<f64>,
    quality_threshold: Option<f64>,
    degraded_limit: Option<f64>,
    builds_per_year: Option<u32>,
    powder_cost_per_kg: Option<f64>,
}

impl SiteConfigBuilder {
    /// Select a machine preset by key.
    #[must_use]
    pub fn preset(mut self, key: impl Into<String>) -> Self {
        self.preset = Some(key.into());
        self
    }

    /// Set the chamber volume in liters.
    #[must_use]
    pub const fn chamber_volume(mut self, liters: f64) -> Self {
        self.chamber_volume_l = Some(liters);
        self
    }

    /// Set the packing density.
    #[must_use]
    pub const fn packing_density(mut self, density: f64) -> Self {
        self.packing_density = Some(density);
        self
    }

    /// Set the quality threshold.
    #[must_use]
    pub const fn quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }

    /// Set the degraded-fraction limit.
    #[must_use]
    pub const fn degraded_limit(mut self, limit: f64) -> Self {
        self.degraded_limit = Some(limit);
        self
    }

    /// Set the annual build count.
    #[must_use]
    pub const fn builds_per_year(mut self, builds: u32) -> Self {
        self.builds_per_year = Some(builds);
        self
    }

    /// Set the powder cost per kg.
    #[must_use]
    pub const fn powder_cost(mut self, cost: f64) -> Self {
        self.powder_cost_per_kg = Some(cost);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.machine.preset = self.preset;
        if let Some(v) = self.chamber_volume_l {
            config.machine.chamber_volume_l = v;
        }
        if let Some(v) = self.packing_density {
            config.machine.packing_density = v;
        }
        if let Some(v) = self.quality_threshold {
            config.process.quality_threshold = v;
        }
        if let Some(v) = self.degraded_limit {
            config.process.degraded_limit = v;
        }
        if let Some(v) = self.builds_per_year {
            config.economics.builds_per_year = v;
        }
        if let Some(v) = self.powder_cost_per_kg {
            config.economics.powder_cost_per_kg = v;
        }
        config
    }
}

/// Check the three bounded operator inputs, collecting a message per
/// violated bound. An empty list means the inputs are acceptable.
#[must_use]
pub fn validate_parameters(
    packing_density: f64,
    quality_threshold: f64,
    degraded_limit: f64,
) -> Vec<String> {
    let mut messages = Vec::new();
    if !(packing_density > 0.0 && packing_density <= 0.5) {
        messages.push("packing density must be between 0 and 50%".to_string());
    }
    if !(0.4..=0.9).contains(&quality_threshold) {
        messages.push("quality threshold should be between 0.4 and 0.9".to_string());
    }
    if !(0.0..=0.3).contains(&degraded_limit) {
        messages.push("degraded limit should be between 0 and 30%".to_string());
    }
    messages
}
