use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Tunables for locating the subtitle band in a frame.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegionConfig {
    /// Height in pixels of each horizontal band that gets scanned.
    pub band_height: u32,
    /// A band whose mean intensity is below this is not background.
    pub mean_threshold: f64,
    /// A band whose standard deviation is above this has text-like structure.
    pub stddev_threshold: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            band_height: 5,
            mean_threshold: 240.0,
            stddev_threshold: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LineConfig {
    /// Centers closer than this (exclusive) to the previous box's center are
    /// snapped onto it.
    pub snap_tolerance: i32,
    /// Pixels added around a box before it is cropped for recognition.
    pub crop_margin: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 8,
            crop_margin: 2,
        }
    }
}

/// Binarization applied to box crops before recognition.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    pub binarize: bool,
    /// Pixels brighter than this count as background.
    pub binary_threshold: u8,
    /// Gaussian blur between the two Otsu passes; 0 leaves the image as is.
    pub blur_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            binarize: false,
            binary_threshold: 180,
            blur_sigma: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding the detection and recognition models.
    /// Defaults to `$HOME/.cache/ocrs`.
    pub dir: Option<PathBuf>,
    pub detection: String,
    pub recognition: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: None,
            detection: "text-detection.rten".to_string(),
            recognition: "text-recognition.rten".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn model_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.dir {
            return Some(dir.clone());
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()?;
        Some(Path::new(&home).join(".cache/ocrs"))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrectionConfig {
    pub dictionary: Option<PathBuf>,
}

/// Top-level settings, usually read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub region: RegionConfig,
    pub lines: LineConfig,
    pub preprocess: PreprocessConfig,
    pub models: ModelConfig,
    pub correction: CorrectionConfig,
}

/// Values given on the command line; each one that is set wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dictionary: Option<PathBuf>,
    pub models: Option<PathBuf>,
    pub band_height: Option<u32>,
    pub snap_tolerance: Option<i32>,
    pub binarize: Option<bool>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents).map_err(|err| match err {
            ParseFailure::Toml(source) => Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Invalid(err) => err,
        })?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Apply command-line overrides and validate the result.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self> {
        if let Some(dictionary) = &overrides.dictionary {
            self.correction.dictionary = Some(dictionary.clone());
        }
        if let Some(models) = &overrides.models {
            self.models.dir = Some(models.clone());
        }
        if let Some(band_height) = overrides.band_height {
            self.region.band_height = band_height;
        }
        if let Some(tolerance) = overrides.snap_tolerance {
            self.lines.snap_tolerance = tolerance;
        }
        if let Some(binarize) = overrides.binarize {
            self.preprocess.binarize = binarize;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Self::from_toml_str(contents).map_err(|err| match err {
            ParseFailure::Toml(source) => Error::ConfigParse {
                path: PathBuf::from("<inline>"),
                source,
            },
            ParseFailure::Invalid(err) => err,
        })
    }

    fn from_toml_str(contents: &str) -> std::result::Result<Self, ParseFailure> {
        let config: Config = toml::from_str(contents).map_err(ParseFailure::Toml)?;
        config.validate().map_err(ParseFailure::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.band_height == 0 {
            return Err(Error::InvalidConfig {
                field: "region.band_height",
                value: self.region.band_height.to_string(),
            });
        }
        if self.lines.snap_tolerance < 0 {
            return Err(Error::InvalidConfig {
                field: "lines.snap_tolerance",
                value: self.lines.snap_tolerance.to_string(),
            });
        }
        let sigma = self.preprocess.blur_sigma;
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(Error::InvalidConfig {
                field: "preprocess.blur_sigma",
                value: sigma.to_string(),
            });
        }
        Ok(())
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Invalid(Error),
}
