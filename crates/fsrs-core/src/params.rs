// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::DECAY;
use crate::fsrs::FACTOR;
use crate::fsrs::round8;

pub type Weights = [f64; 19];

pub const DEFAULT_WEIGHTS: Weights = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

pub const DEFAULT_REQUEST_RETENTION: f64 = 0.9;
pub const DEFAULT_MAXIMUM_INTERVAL: i64 = 36500;
/// Largest accepted `maximum_interval`, in days. Keeps every due date
/// representable.
pub const MAXIMUM_INTERVAL_LIMIT: i64 = 3_650_000;

/// Lower bound for any computed stability.
pub const S_MIN: f64 = 0.01;
/// Upper bound for any computed stability.
pub const S_MAX: f64 = 36500.0;

/// Closed admissible range of each weight.
const WEIGHT_RANGES: [(f64, f64); 19] = [
    (0.01, 100.0),
    (0.01, 100.0),
    (0.01, 100.0),
    (0.01, 100.0),
    (1.0, 10.0),
    (0.001, 4.0),
    (0.001, 4.0),
    (0.001, 0.75),
    (0.0, 4.5),
    (0.0, 0.8),
    (0.001, 3.5),
    (0.001, 5.0),
    (0.001, 0.25),
    (0.001, 0.9),
    (0.0, 4.0),
    (0.0, 1.0),
    (1.0, 6.0),
    (0.0, 2.0),
    (0.0, 2.0),
];

/// Length of weight vectors produced by the previous model version.
const LEGACY_WEIGHT_COUNT: usize = 17;

/// Raw, optional parameter settings, e.g. as read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterConfig {
    pub weights: Option<Vec<f64>>,
    pub request_retention: Option<f64>,
    pub maximum_interval: Option<i64>,
    pub enable_fuzz: Option<bool>,
    pub enable_short_term: Option<bool>,
}

impl ParameterConfig {
    pub fn from_toml_str(source: &str) -> Fallible<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// A validated, immutable parameter set.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    request_retention: f64,
    maximum_interval: i64,
    w: Weights,
    enable_fuzz: bool,
    enable_short_term: bool,
    interval_modifier: f64,
}

impl Parameters {
    pub fn from_config(config: ParameterConfig) -> Fallible<Self> {
        let w = resolve_weights(config.weights.as_deref())?;
        let request_retention = config
            .request_retention
            .unwrap_or(DEFAULT_REQUEST_RETENTION);
        let interval_modifier = interval_modifier(request_retention)?;
        let maximum_interval = config.maximum_interval.unwrap_or(DEFAULT_MAXIMUM_INTERVAL);
        if !(1..=MAXIMUM_INTERVAL_LIMIT).contains(&maximum_interval) {
            let msg = format!(
                "maximum interval {maximum_interval} is outside 1..={MAXIMUM_INTERVAL_LIMIT}"
            );
            return fail(ErrorKind::InvalidParameter, msg);
        }
        Ok(Parameters {
            request_retention,
            maximum_interval,
            w,
            enable_fuzz: config.enable_fuzz.unwrap_or(false),
            enable_short_term: config.enable_short_term.unwrap_or(true),
            interval_modifier,
        })
    }

    /// Default settings with the given weights.
    pub fn from_weights(weights: &[f64]) -> Fallible<Self> {
        Self::from_config(ParameterConfig {
            weights: Some(weights.to_vec()),
            ..ParameterConfig::default()
        })
    }

    pub fn w(&self) -> &Weights {
        &self.w
    }

    pub fn request_retention(&self) -> f64 {
        self.request_retention
    }

    pub fn maximum_interval(&self) -> i64 {
        self.maximum_interval
    }

    pub fn enable_fuzz(&self) -> bool {
        self.enable_fuzz
    }

    pub fn enable_short_term(&self) -> bool {
        self.enable_short_term
    }

    /// Scales a stability into an interval at the requested retention.
    pub fn interval_modifier(&self) -> f64 {
        self.interval_modifier
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            request_retention: DEFAULT_REQUEST_RETENTION,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            w: DEFAULT_WEIGHTS,
            enable_fuzz: false,
            enable_short_term: true,
            // (0.9^(1/-0.5) - 1) / (19/81), rounded.
            interval_modifier: 1.0,
        }
    }
}

fn interval_modifier(request_retention: f64) -> Fallible<f64> {
    if !(request_retention > 0.0 && request_retention <= 1.0) {
        return fail(
            ErrorKind::InvalidRetention,
            format!("requested retention must be in (0, 1], got {request_retention}"),
        );
    }
    Ok(round8(
        (request_retention.powf(1.0 / DECAY) - 1.0) / FACTOR,
    ))
}

fn resolve_weights(raw: Option<&[f64]>) -> Fallible<Weights> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_WEIGHTS);
    };
    if let Some(bad) = raw.iter().find(|w| !w.is_finite()) {
        return fail(
            ErrorKind::InvalidParameter,
            format!("weights must be finite, got {bad}"),
        );
    }
    let mut w = match raw.len() {
        19 => {
            let mut w = [0.0; 19];
            w.copy_from_slice(raw);
            w
        }
        LEGACY_WEIGHT_COUNT => {
            log::info!("Upgrading {LEGACY_WEIGHT_COUNT} weights to the current model.");
            migrate_legacy(raw)
        }
        n => {
            log::warn!("Expected 19 weights, got {n}. Using the default weights.");
            DEFAULT_WEIGHTS
        }
    };
    clamp_weights(&mut w);
    Ok(w)
}

/// Converts weights from the previous model version. The difficulty terms
/// changed shape, and the short-term weights did not exist.
fn migrate_legacy(raw: &[f64]) -> Weights {
    let mut w = [0.0; 19];
    w[..LEGACY_WEIGHT_COUNT].copy_from_slice(&raw[..LEGACY_WEIGHT_COUNT]);
    w[4] = round8(raw[5] * 2.0 + raw[4]);
    w[5] = round8((raw[5] * 3.0 + 1.0).ln() / 3.0);
    w[6] = round8(raw[6] + 0.5);
    w
}

fn clamp_weights(w: &mut Weights) {
    for (value, (lo, hi)) in w.iter_mut().zip(WEIGHT_RANGES) {
        *value = value.clamp(lo, hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Fallible<()> {
        let p = Parameters::from_config(ParameterConfig::default())?;
        assert_eq!(p, Parameters::default());
        assert_eq!(p.interval_modifier(), 1.0);
        assert_eq!(p.w(), &DEFAULT_WEIGHTS);
        assert!(p.enable_short_term());
        assert!(!p.enable_fuzz());
        Ok(())
    }

    #[test]
    fn test_interval_modifier() -> Fallible<()> {
        let p = Parameters::from_config(ParameterConfig {
            request_retention: Some(0.8),
            ..ParameterConfig::default()
        })?;
        // (0.8^-2 - 1) * 81/19
        assert_eq!(p.interval_modifier(), round8((1.0 / 0.64 - 1.0) * 81.0 / 19.0));
        let p = Parameters::from_config(ParameterConfig {
            request_retention: Some(1.0),
            ..ParameterConfig::default()
        })?;
        assert_eq!(p.interval_modifier(), 0.0);
        Ok(())
    }

    #[test]
    fn test_invalid_retention() {
        for r in [0.0, -0.1, 1.01, f64::NAN] {
            let err = Parameters::from_config(ParameterConfig {
                request_retention: Some(r),
                ..ParameterConfig::default()
            })
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRetention);
        }
    }

    #[test]
    fn test_invalid_maximum_interval() {
        let err = Parameters::from_config(ParameterConfig {
            maximum_interval: Some(0),
            ..ParameterConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = Parameters::from_config(ParameterConfig {
            maximum_interval: Some(i64::MAX),
            ..ParameterConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let p = Parameters::from_config(ParameterConfig {
            maximum_interval: Some(MAXIMUM_INTERVAL_LIMIT),
            ..ParameterConfig::default()
        });
        assert!(p.is_ok());
    }

    #[test]
    fn test_clamp() -> Fallible<()> {
        let p = Parameters::from_weights(&[-1.0; 19])?;
        for (w, (lo, _)) in p.w().iter().zip(WEIGHT_RANGES) {
            assert_eq!(*w, lo);
        }
        let p = Parameters::from_weights(&[1000.0; 19])?;
        for (w, (_, hi)) in p.w().iter().zip(WEIGHT_RANGES) {
            assert_eq!(*w, hi);
        }
        Ok(())
    }

    #[test]
    fn test_non_finite_weights() {
        let mut w = DEFAULT_WEIGHTS.to_vec();
        w[3] = f64::INFINITY;
        let err = Parameters::from_weights(&w).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_wrong_length_falls_back_to_defaults() -> Fallible<()> {
        let p = Parameters::from_weights(&[1.0, 2.0, 3.0])?;
        assert_eq!(p.w(), &DEFAULT_WEIGHTS);
        Ok(())
    }

    #[test]
    fn test_legacy_migration() -> Fallible<()> {
        let legacy = [
            0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26,
            0.29, 2.61,
        ];
        let p = Parameters::from_weights(&legacy)?;
        let w = p.w();
        assert_eq!(w[..4], legacy[..4]);
        assert_eq!(w[4], round8(0.94 * 2.0 + 4.93));
        assert_eq!(w[5], round8((0.94f64 * 3.0 + 1.0).ln() / 3.0));
        assert_eq!(w[6], round8(0.86 + 0.5));
        assert_eq!(w[7..17], legacy[7..17]);
        assert_eq!(w[17], 0.0);
        assert_eq!(w[18], 0.0);
        Ok(())
    }

    #[test]
    fn test_config_from_toml() -> Fallible<()> {
        let config = ParameterConfig::from_toml_str(
            r#"
            request_retention = 0.85
            maximum_interval = 365
            enable_fuzz = true
            "#,
        )?;
        assert_eq!(config.request_retention, Some(0.85));
        assert_eq!(config.maximum_interval, Some(365));
        assert_eq!(config.enable_fuzz, Some(true));
        assert_eq!(config.weights, None);
        let p = Parameters::from_config(config)?;
        assert_eq!(p.maximum_interval(), 365);
        assert!(p.enable_fuzz());
        Ok(())
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let err = ParameterConfig::from_toml_str("retention = 0.9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
