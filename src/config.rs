//! Packing configuration: defaults, `key: value` text loading, JSON loading and validation.

use crate::error::{Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Radius distribution of the seeded spheres.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform on `[min_radius, max_radius]`.
    #[default]
    Uniform,
    /// `Beta(beta_p, beta_q)` rescaled onto `[min_radius, max_radius]`.
    Beta,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Uniform => write!(f, "uniform"),
            Distribution::Beta => write!(f, "beta"),
        }
    }
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Distribution::Uniform),
            "beta" => Ok(Distribution::Beta),
            other => Err(Error::invalid_config(format!("unknown distribution '{other}'"))),
        }
    }
}

/// All parameters of a packing batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    /// Number of packings generated per batch.
    pub count: usize,
    /// Domain extent along X.
    pub width: usize,
    /// Domain extent along Y.
    pub height: usize,
    /// Domain extent along Z.
    pub depth: usize,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Relative gap between seeded spheres, in units of `max_radius`.
    pub eps: f64,
    /// Allowed overlap fraction between touching spheres, in `[0, 1]`. Only
    /// validated; the seeded layer does not use it.
    pub overlap: f64,
    pub distribution: Distribution,
    pub beta_p: f64,
    pub beta_q: f64,
    /// Optional tag appended to every output name.
    pub suffix: String,
    /// Monte-Carlo sample points per sphere.
    pub test_points: usize,
    /// Grow outer radii until `target_porosity` is reached.
    pub reach_porosity: bool,
    pub target_porosity: f64,
    /// Maximum number of growth passes.
    pub max_iterations: usize,
    /// Seed for the random generator; entropy when absent.
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            count: 5,
            width: 900,
            height: 700,
            depth: 200,
            min_radius: 7.0,
            max_radius: 10.0,
            eps: 0.1,
            overlap: 0.1,
            distribution: Distribution::Uniform,
            beta_p: 2.0,
            beta_q: 2.0,
            suffix: String::new(),
            test_points: 500,
            reach_porosity: true,
            target_porosity: 0.25,
            max_iterations: 50,
            seed: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Parses `value`, keeping `current` and logging when it is unparsable or rejected by `valid`.
fn assign<T>(key: &str, value: &str, current: &mut T, valid: impl Fn(&T) -> bool)
where
    T: FromStr + fmt::Debug,
{
    match value.parse::<T>() {
        Ok(v) if valid(&v) => *current = v,
        _ => warn!("invalid value '{}' for '{}', keeping default {:?}", value, key, current),
    }
}

impl PackingConfig {
    /// Loads a `key: value` file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_key_values(&text),
            Err(err) => {
                warn!("could not read {} ({}), using default configuration", path.display(), err);
                Self::default()
            }
        }
    }

    /// Loads a JSON document; absent fields take their defaults.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses `key: value` lines. Blank lines and lines starting with `#` are skipped;
    /// unknown keys and invalid values are logged and leave the defaults in place.
    pub fn from_key_values(text: &str) -> Self {
        let mut cfg = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                warn!("ignoring line without ':' separator: '{}'", line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "count" => assign(key, value, &mut cfg.count, |&v| v > 0),
                "width" => assign(key, value, &mut cfg.width, |&v| v > 0),
                "height" => assign(key, value, &mut cfg.height, |&v| v > 0),
                "depth" => assign(key, value, &mut cfg.depth, |&v| v > 0),
                "min_radius" => assign(key, value, &mut cfg.min_radius, |&v| v > 0.0),
                "max_radius" => assign(key, value, &mut cfg.max_radius, |&v| v > 0.0),
                "eps" => assign(key, value, &mut cfg.eps, |&v| v >= 0.0),
                "overlap" => assign(key, value, &mut cfg.overlap, |&v| (0.0..=1.0).contains(&v)),
                "distribution" => assign(key, value, &mut cfg.distribution, |_| true),
                "beta_p" => assign(key, value, &mut cfg.beta_p, |&v| v > 0.0),
                "beta_q" => assign(key, value, &mut cfg.beta_q, |&v| v > 0.0),
                "suffix" => cfg.suffix = value.to_string(),
                "test_points" => assign(key, value, &mut cfg.test_points, |&v| v > 1),
                "reach_porosity" => assign(key, value, &mut cfg.reach_porosity, |_| true),
                "target_porosity" => {
                    assign(key, value, &mut cfg.target_porosity, |&v| v > 0.0 && v <= 1.0)
                }
                "max_iterations" => assign(key, value, &mut cfg.max_iterations, |&v| v > 0),
                "seed" => match value.parse::<u64>() {
                    Ok(seed) => cfg.seed = Some(seed),
                    Err(_) => warn!("invalid value '{}' for 'seed', drawing from entropy", value),
                },
                "output_dir" => cfg.output_dir = PathBuf::from(value),
                _ => warn!("ignoring unknown configuration key '{}'", key),
            }
        }
        cfg
    }

    /// Checks the numeric preconditions the packing code relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(Error::invalid_config("domain dimensions must be positive"));
        }
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius) {
            return Err(Error::invalid_config(format!(
                "radii must satisfy 0 < min_radius <= max_radius, got {} and {}",
                self.min_radius, self.max_radius
            )));
        }
        if self.eps < 0.0 {
            return Err(Error::invalid_config("eps must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.overlap) {
            return Err(Error::invalid_config("overlap must lie in [0, 1]"));
        }
        if self.test_points < 2 {
            return Err(Error::invalid_config("test_points must be at least 2"));
        }
        if !(self.target_porosity > 0.0 && self.target_porosity <= 1.0) {
            return Err(Error::invalid_config("target_porosity must lie in (0, 1]"));
        }
        if self.max_iterations == 0 {
            return Err(Error::invalid_config("max_iterations must be positive"));
        }
        if self.distribution == Distribution::Beta && !(self.beta_p > 0.0 && self.beta_q > 0.0) {
            return Err(Error::invalid_config("beta shape parameters must be positive"));
        }
        Ok(())
    }

    /// Mean of the radius distribution.
    pub fn expected_radius(&self) -> f64 {
        match self.distribution {
            Distribution::Uniform => (self.max_radius + self.min_radius) / 2.0,
            Distribution::Beta => {
                let mean = self.beta_p / (self.beta_p + self.beta_q);
                (self.max_radius - self.min_radius) * mean + self.min_radius
            }
        }
    }

    /// Suffix identifying test case `case` (1-based), e.g. `_TC03` or `_TC03_run`.
    pub fn case_suffix(&self, case: usize) -> String {
        if self.suffix.is_empty() {
            format!("_TC{case:02}")
        } else {
            format!("_TC{case:02}_{}", self.suffix)
        }
    }
}
