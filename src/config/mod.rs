// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the analyzer.
//!
//! This module provides the data structures loaded from YAML or TOML files:
//! the starting scale and naming style, lattice dimensions, and detector
//! options.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::chord::DetectorConfig;
use crate::lattice::LatticeConfig;
use crate::music::{parse_note_name, Gamme, NamingStyle, ScaleType, Signature};

/// Root configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Scale and spelling settings
    #[serde(default)]
    pub theory: TheoryConfig,
    /// Lattice dimensions
    #[serde(default)]
    pub lattice: LatticeSettings,
    /// Chord detector options
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl AppConfig {
    /// Load a configuration file; `.toml` files are parsed as TOML,
    /// anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Build the starting scale. An explicit signature wins over a preset.
    pub fn build_gamme(&self) -> Result<Gamme> {
        let theory = &self.theory;
        let signature = match (&theory.signature, &theory.scale) {
            (Some(sig), _) => *sig,
            (None, name) => ScaleType::from_str(name)
                .ok_or_else(|| anyhow!("Unknown scale: {}", name))?
                .signature(),
        };
        Gamme::new(signature, &theory.tonic, theory.naming_style)
            .with_context(|| format!("Invalid tonic in configuration: {}", theory.tonic))
    }

    /// Lattice configuration centred on the configured tonic
    pub fn lattice_config(&self) -> Result<LatticeConfig> {
        let start_pc = parse_note_name(&self.theory.tonic)
            .ok_or_else(|| anyhow!("Unknown tonic: {}", self.theory.tonic))?;
        Ok(LatticeConfig {
            h_extent: self.lattice.h_extent,
            v_extent: self.lattice.v_extent,
            start_pc,
        })
    }
}

/// Scale and naming settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TheoryConfig {
    /// Enharmonic spelling for display names
    #[serde(default)]
    pub naming_style: NamingStyle,
    /// Tonic note name (e.g., "C", "F#", "Bb")
    #[serde(default = "default_tonic")]
    pub tonic: String,
    /// Scale preset name (e.g., "major", "dorian")
    #[serde(default = "default_scale")]
    pub scale: String,
    /// Explicit 12-bit signature, overrides `scale`
    #[serde(default)]
    pub signature: Option<Signature>,
}

fn default_tonic() -> String {
    "C".to_string()
}
fn default_scale() -> String {
    "major".to_string()
}

impl Default for TheoryConfig {
    fn default() -> Self {
        Self {
            naming_style: NamingStyle::default(),
            tonic: default_tonic(),
            scale: default_scale(),
            signature: None,
        }
    }
}

/// Lattice half-extents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatticeSettings {
    #[serde(default = "default_h_extent")]
    pub h_extent: u32,
    #[serde(default = "default_v_extent")]
    pub v_extent: u32,
}

fn default_h_extent() -> u32 {
    6
}
fn default_v_extent() -> u32 {
    3
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            h_extent: default_h_extent(),
            v_extent: default_v_extent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{CanonicalScale, PitchClass};

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
theory:
  naming_style: flat
  tonic: "Bb"
  scale: "dorian"
lattice:
  h_extent: 4
  v_extent: 2
detector:
  max_results: 3
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.theory.naming_style, NamingStyle::Flat);
        assert_eq!(config.lattice.h_extent, 4);
        assert_eq!(config.detector.max_results, Some(3));

        let gamme = config.build_gamme().unwrap();
        assert_eq!(gamme.tonic_pc(), PitchClass::new(10));
        assert_eq!(gamme.mode_name().as_deref(), Some("Dorian"));
    }

    #[test]
    fn test_parse_toml_config() {
        let text = r#"
[theory]
tonic = "E"
signature = "101101011001"

[lattice]
h_extent = 3
"#;

        let config = AppConfig::from_toml(text).unwrap();
        assert_eq!(config.lattice.h_extent, 3);
        assert_eq!(config.lattice.v_extent, 3);

        let gamme = config.build_gamme().unwrap();
        assert_eq!(gamme.nom_reconnu(), Some(CanonicalScale::HarmonicMinor));
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.theory.tonic, "C");
        assert_eq!(config.detector.max_results, None);

        let lattice = config.lattice_config().unwrap();
        assert_eq!(lattice.start_pc, PitchClass::C);
        assert_eq!(lattice.h_extent, 6);
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_yaml("theory:\n  signature: \"1010\"\n").is_err());

        let config = AppConfig::from_yaml("theory:\n  scale: bebop\n").unwrap();
        assert!(config.build_gamme().is_err());

        let config = AppConfig::from_yaml("theory:\n  tonic: Q\n").unwrap();
        assert!(config.build_gamme().is_err());
        assert!(config.lattice_config().is_err());
    }

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::default();
        config.theory.naming_style = NamingStyle::DoubleSharp;
        config.theory.signature = Some("111111111111".parse().unwrap());

        let yaml = config.to_yaml().unwrap();
        let parsed = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
