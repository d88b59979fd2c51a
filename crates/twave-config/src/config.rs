//! The delineator configuration and its TOML form.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use twave_core::filter::MAX_ORDER;
use twave_delineator::{DelineationParams, FinderMode, SegmentParams};

use crate::error::{ConfigError, Result};
use crate::property::{FEATURE_THRESHOLDS_KEY, PropertySpec, PropertyValue, properties, property};
use crate::thresholds::{format_thresholds, parse_thresholds};

/// Flat key/value configuration of the delineator.
///
/// Starts from the defaults of the property table. Keys missing from a file keep
/// their defaults; unknown keys and mistyped values are rejected.
///
/// # TOML Format
///
/// ```toml
/// candidateFinder = 1
/// featursThreshold = "20,0,0_10,10,1.5_0,0,1.7"
/// filterOrder = 5
/// minPoints = 10
/// percentMainePeak = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DelineatorConfig {
    values: BTreeMap<&'static str, PropertyValue>,
}

impl Default for DelineatorConfig {
    fn default() -> Self {
        Self {
            values: properties()
                .iter()
                .map(|p| (p.name, p.default.clone()))
                .collect(),
        }
    }
}

impl DelineatorConfig {
    /// Configuration holding every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load the file at the default location, or defaults if there is none.
    pub fn load_default() -> Result<Self> {
        let path = crate::paths::default_config_path();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(toml_str)?;
        let mut config = Self::default();
        for (key, value) in table {
            let found = toml_kind(&value);
            let value = PropertyValue::from_toml(value).ok_or_else(|| {
                let expected = property(&key).map(|p| p.ty);
                match expected {
                    Some(expected) => ConfigError::WrongType {
                        key: key.clone(),
                        expected,
                        found,
                    },
                    None => ConfigError::UnknownKey(key.clone()),
                }
            })?;
            config.set(&key, value)?;
        }
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Sets `key`, coercing integers for float keys.
    pub fn set(&mut self, key: &str, value: PropertyValue) -> Result<()> {
        let spec = property(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let found = value.property_type().name();
        let value = value.coerce(spec.ty).ok_or(ConfigError::WrongType {
            key: key.to_string(),
            expected: spec.ty,
            found,
        })?;
        self.values.insert(spec.name, value);
        Ok(())
    }

    /// Iterates keys with their current values and table entries.
    pub fn iter(&self) -> impl Iterator<Item = (&'static PropertySpec, &PropertyValue)> + '_ {
        properties()
            .iter()
            .filter_map(|spec| self.values.get(spec.name).map(|v| (spec, v)))
    }

    /// Builds a configuration mirroring `params`.
    pub fn from_params(params: &DelineationParams) -> Self {
        let mut config = Self::default();
        let mut put = |key: &'static str, value: PropertyValue| {
            config.values.insert(key, value);
        };
        put("filterHighCutoff", PropertyValue::Double(params.segment.filter_high_cutoff));
        put("filterOrder", PropertyValue::Int(params.segment.filter_order as i64));
        put("candidateFinder", PropertyValue::Int(params.finder.code()));
        put(
            FEATURE_THRESHOLDS_KEY,
            PropertyValue::String(Cow::Owned(format_thresholds(&params.feature_thresholds))),
        );
        put("deltaStepSlope", PropertyValue::Double(params.delta_step_slope));
        put("looseWindow", PropertyValue::Int(params.loose_window as i64));
        put("minPoints", PropertyValue::Int(params.min_points as i64));
        put("deltaAmplitude", PropertyValue::Double(params.delta_amplitude));
        put("minVoltageMainPeak", PropertyValue::Double(params.min_voltage_main_peak));
        put("percentMainePeak", PropertyValue::Double(params.percent_main_peak));
        put("minVoltage", PropertyValue::Double(params.min_voltage));
        put("percentPeak", PropertyValue::Double(params.percent_peak));
        put(
            "maxDelatAplitudeNotches",
            PropertyValue::Double(params.max_delta_amplitude_notches),
        );
        put("minAmplitudeFlatness", PropertyValue::Double(params.min_amplitude_flatness));
        put("minValidAmplitudePeak", PropertyValue::Double(params.min_valid_amplitude_peak));
        put(
            "approximateRangeOfTsegment",
            PropertyValue::Double(params.segment.approximate_range_of_t_segment),
        );
        put(
            "approximateBoundaryOfToff",
            PropertyValue::Double(params.segment.approximate_boundary_of_toff),
        );
        put("measurable", PropertyValue::Double(params.measurable_voltage));
        config
    }

    /// Checks every value without building parameters.
    pub fn validate(&self) -> Result<()> {
        self.to_params().map(|_| ())
    }

    /// Validates the configuration and converts it into pipeline parameters.
    pub fn to_params(&self) -> Result<DelineationParams> {
        let finder_code = self.int("candidateFinder")?;
        let finder = FinderMode::from_code(finder_code).ok_or_else(|| {
            ConfigError::invalid("candidateFinder", format!("must be 1 or 2, found {finder_code}"))
        })?;

        let filter_order = self.count("filterOrder")?;
        if filter_order > MAX_ORDER {
            return Err(ConfigError::invalid(
                "filterOrder",
                format!("must be at most {MAX_ORDER}, found {filter_order}"),
            ));
        }

        let thresholds = match self.get(FEATURE_THRESHOLDS_KEY).and_then(PropertyValue::as_str) {
            Some(text) => parse_thresholds(text)?,
            None => return Err(ConfigError::UnknownKey(FEATURE_THRESHOLDS_KEY.to_string())),
        };

        Ok(DelineationParams {
            finder,
            delta_step_slope: self.positive("deltaStepSlope")?,
            loose_window: self.count("looseWindow")?,
            min_points: self.count("minPoints")?,
            delta_amplitude: self.non_negative("deltaAmplitude")?,
            min_voltage_main_peak: self.non_negative("minVoltageMainPeak")?,
            percent_main_peak: self.fraction("percentMainePeak")?,
            min_voltage: self.non_negative("minVoltage")?,
            percent_peak: self.fraction("percentPeak")?,
            max_delta_amplitude_notches: self.non_negative("maxDelatAplitudeNotches")?,
            min_amplitude_flatness: self.non_negative("minAmplitudeFlatness")?,
            min_valid_amplitude_peak: self.non_negative("minValidAmplitudePeak")?,
            measurable_voltage: self.non_negative("measurable")?,
            feature_thresholds: thresholds,
            segment: SegmentParams {
                approximate_range_of_t_segment: self.positive("approximateRangeOfTsegment")?,
                approximate_boundary_of_toff: self.positive("approximateBoundaryOfToff")?,
                filter_order,
                filter_high_cutoff: self.positive("filterHighCutoff")?,
            },
        })
    }

    fn double(&self, key: &str) -> Result<f64> {
        let value = self
            .get(key)
            .and_then(PropertyValue::as_f64)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::invalid(key, "must be finite"))
        }
    }

    fn int(&self, key: &str) -> Result<i64> {
        self.get(key)
            .and_then(PropertyValue::as_i64)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    fn count(&self, key: &str) -> Result<usize> {
        let value = self.int(key)?;
        usize::try_from(value)
            .map_err(|_| ConfigError::invalid(key, format!("must be non-negative, found {value}")))
    }

    fn non_negative(&self, key: &str) -> Result<f64> {
        let value = self.double(key)?;
        if value < 0.0 {
            return Err(ConfigError::invalid(key, format!("must be non-negative, found {value}")));
        }
        Ok(value)
    }

    fn positive(&self, key: &str) -> Result<f64> {
        let value = self.double(key)?;
        if value <= 0.0 {
            return Err(ConfigError::invalid(key, format!("must be positive, found {value}")));
        }
        Ok(value)
    }

    fn fraction(&self, key: &str) -> Result<f64> {
        let value = self.double(key)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::invalid(key, format!("must lie in [0, 1], found {value}")));
        }
        Ok(value)
    }
}

/// Name of a TOML value's kind, for type errors.
fn toml_kind(value: &toml::Value) -> &'static str {
    match value {
        toml::Value::String(_) => "string",
        toml::Value::Integer(_) => "int",
        toml::Value::Float(_) => "double",
        toml::Value::Boolean(_) => "boolean",
        toml::Value::Datetime(_) => "datetime",
        toml::Value::Array(_) => "array",
        toml::Value::Table(_) => "table",
    }
}
