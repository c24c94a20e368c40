use serde::{Deserialize, Serialize};
use std::path::Path;
use vizlab_common::Color;
use vizlab_scene::Geometry;

/// Errors from loading or validating a visualization config.
#[derive(Debug, thiserror::Error)]
pub enum VizConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("term #{index} is empty")]
    EmptyTerm { index: usize },
    #[error("term {term:?}: {field} must be finite and non-negative, got {value}")]
    InvalidNumber {
        term: String,
        field: &'static str,
        value: f32,
    },
    #[error("term {term:?}: count {count} exceeds the limit of {MAX_MARKERS_PER_OCCURRENCE}")]
    CountTooLarge { term: String, count: usize },
}

/// Upper bound on `TermConfig::count`.
pub const MAX_MARKERS_PER_OCCURRENCE: usize = 10_000;

/// Mesh used for each marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    #[default]
    Cube,
    /// A deliberately faceted 7x4 sphere.
    Sphere,
}

impl MarkerShape {
    pub fn geometry(&self, size: f32) -> Geometry {
        match self {
            Self::Cube => Geometry::cube(size),
            Self::Sphere => Geometry::Sphere {
                radius: size,
                width_segments: 7,
                height_segments: 4,
            },
        }
    }
}

/// How a cluster's horizontal spread changes with height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiameterMode {
    #[default]
    Fixed,
    /// Later occurrences spread wider: `diameter + height * 0.4`.
    Widening,
    /// Later occurrences pull in: `diameter - height * 0.4`.
    Narrowing,
}

impl DiameterMode {
    const SLOPE: f32 = 0.4;

    pub fn diameter(&self, base: f32, height: f32) -> f32 {
        match self {
            Self::Fixed => base,
            Self::Widening => base + height * Self::SLOPE,
            Self::Narrowing => base - height * Self::SLOPE,
        }
    }
}

/// Marker orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    #[default]
    None,
    /// Uniform random Euler angles on every axis.
    Random,
    /// Turn each marker toward the cluster's vertical axis.
    FaceCenter,
}

/// Visual parameters for one search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    pub term: String,
    pub color: Color,
    pub shape: MarkerShape,
    /// Edge length of a cube marker or radius of a sphere marker.
    pub size: f32,
    /// Uniform scale applied to every marker.
    pub scale: f32,
    /// Horizontal spread of a cluster.
    pub diameter: f32,
    pub diameter_mode: DiameterMode,
    /// Markers emitted per occurrence.
    pub count: usize,
    pub rotation: RotationMode,
    pub wireframe: bool,
    pub visible: bool,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            term: String::new(),
            color: Color::WHITE,
            shape: MarkerShape::Cube,
            size: 0.3,
            scale: 1.0,
            diameter: 10.0,
            diameter_mode: DiameterMode::Fixed,
            count: 100,
            rotation: RotationMode::Random,
            wireframe: false,
            visible: true,
        }
    }
}

impl TermConfig {
    pub fn new(term: impl Into<String>, color: Color) -> Self {
        Self {
            term: term.into(),
            color,
            ..Self::default()
        }
    }
}

/// A full word-occurrence visualization: text, height mapping, terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordVizConfig {
    pub source_text: String,
    /// Multiplier `k` in `height = (100 / len) * index * k`.
    pub height_factor: f32,
    /// Added to every marker's height when positioning it.
    pub y_offset: f32,
    pub seed: u64,
    pub terms: Vec<TermConfig>,
}

impl Default for WordVizConfig {
    fn default() -> Self {
        Self {
            source_text: "Here is my source text.".into(),
            height_factor: 0.2,
            y_offset: -5.0,
            seed: 42,
            terms: vec![
                TermConfig {
                    term: "shire".into(),
                    color: Color::from_hex(0x599532),
                    shape: MarkerShape::Sphere,
                    diameter: 20.0,
                    diameter_mode: DiameterMode::Narrowing,
                    count: 100,
                    rotation: RotationMode::Random,
                    ..TermConfig::default()
                },
                TermConfig {
                    term: "mordor".into(),
                    color: Color::from_hex(0x2c2625),
                    shape: MarkerShape::Cube,
                    diameter: 12.0,
                    diameter_mode: DiameterMode::Widening,
                    count: 80,
                    rotation: RotationMode::FaceCenter,
                    scale: 1.5,
                    wireframe: true,
                    ..TermConfig::default()
                },
                TermConfig {
                    term: "fellowship".into(),
                    color: Color::from_hex(0xffa31e),
                    shape: MarkerShape::Cube,
                    diameter: 8.0,
                    diameter_mode: DiameterMode::Fixed,
                    count: 50,
                    rotation: RotationMode::Random,
                    ..TermConfig::default()
                },
            ],
        }
    }
}

impl WordVizConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, VizConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, VizConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(
            path = %path.as_ref().display(),
            terms = config.terms.len(),
            "loaded word-viz config"
        );
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, VizConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), VizConfigError> {
        for (index, term) in self.terms.iter().enumerate() {
            if term.term.trim().is_empty() {
                return Err(VizConfigError::EmptyTerm { index });
            }
            if term.count > MAX_MARKERS_PER_OCCURRENCE {
                return Err(VizConfigError::CountTooLarge {
                    term: term.term.clone(),
                    count: term.count,
                });
            }
            for (field, value) in [
                ("size", term.size),
                ("scale", term.scale),
                ("diameter", term.diameter),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(VizConfigError::InvalidNumber {
                        term: term.term.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}
