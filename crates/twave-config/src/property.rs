//! Typed property table of the delineator.
//!
//! Every configurable key has a declared [`PropertyType`], a default and a short
//! description. The table is static; a [`DelineatorConfig`](crate::DelineatorConfig)
//! only stores overrides of it.

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// 64-bit float. Integer literals are accepted.
    Double,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// Free text.
    String,
}

impl PropertyType {
    /// Lower-case name used in messages and listings.
    pub fn name(self) -> &'static str {
        match self {
            PropertyType::Double => "double",
            PropertyType::Int => "int",
            PropertyType::Uint => "uint",
            PropertyType::String => "string",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value tagged with its type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Float value.
    Double(f64),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    Uint(u64),
    /// Text value.
    String(Cow<'static, str>),
}

impl PropertyValue {
    /// Type of the stored value.
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Uint(_) => PropertyType::Uint,
            PropertyValue::String(_) => PropertyType::String,
        }
    }

    /// Numeric value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            PropertyValue::Double(v) => Some(v),
            PropertyValue::Int(v) => Some(v as f64),
            PropertyValue::Uint(v) => Some(v as f64),
            PropertyValue::String(_) => None,
        }
    }

    /// Integer value, if integral.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PropertyValue::Int(v) => Some(v),
            PropertyValue::Uint(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Text value, if text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts `self` to `ty`, widening integers to floats.
    ///
    /// Returns `None` when the value cannot represent `ty`.
    pub fn coerce(self, ty: PropertyType) -> Option<PropertyValue> {
        match (ty, self) {
            (PropertyType::Double, v) => v.as_f64().map(PropertyValue::Double),
            (PropertyType::Int, PropertyValue::Int(v)) => Some(PropertyValue::Int(v)),
            (PropertyType::Int, PropertyValue::Uint(v)) => {
                i64::try_from(v).ok().map(PropertyValue::Int)
            }
            (PropertyType::Uint, PropertyValue::Uint(v)) => Some(PropertyValue::Uint(v)),
            (PropertyType::Uint, PropertyValue::Int(v)) => {
                u64::try_from(v).ok().map(PropertyValue::Uint)
            }
            (PropertyType::String, v @ PropertyValue::String(_)) => Some(v),
            _ => None,
        }
    }

    /// Converts a TOML value, or `None` for tables, arrays, booleans and dates.
    pub fn from_toml(value: toml::Value) -> Option<PropertyValue> {
        match value {
            toml::Value::Float(v) => Some(PropertyValue::Double(v)),
            toml::Value::Integer(v) => Some(PropertyValue::Int(v)),
            toml::Value::String(s) => Some(PropertyValue::String(Cow::Owned(s))),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Double(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Uint(v) => write!(f, "{v}"),
            PropertyValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropertyValue::Double(v) => serializer.serialize_f64(*v),
            PropertyValue::Int(v) => serializer.serialize_i64(*v),
            PropertyValue::Uint(v) => serializer.serialize_u64(*v),
            PropertyValue::String(s) => serializer.serialize_str(s),
        }
    }
}

/// One entry of the property table.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    /// Key as written in configuration files.
    pub name: &'static str,
    /// Declared type.
    pub ty: PropertyType,
    /// Default value.
    pub default: PropertyValue,
    /// One-line description.
    pub description: &'static str,
}

const fn double(name: &'static str, default: f64, description: &'static str) -> PropertySpec {
    PropertySpec {
        name,
        ty: PropertyType::Double,
        default: PropertyValue::Double(default),
        description,
    }
}

const fn int(name: &'static str, default: i64, description: &'static str) -> PropertySpec {
    PropertySpec {
        name,
        ty: PropertyType::Int,
        default: PropertyValue::Int(default),
        description,
    }
}

/// Key of the slur-classifier threshold table.
pub const FEATURE_THRESHOLDS_KEY: &str = "featursThreshold";

static PROPERTIES: [PropertySpec; 18] = [
    double(
        "filterHighCutoff",
        25.0,
        "high cutoff in Hz of the Butterworth low-pass applied to the lead",
    ),
    int(
        "filterOrder",
        5,
        "order of the Butterworth low-pass; 0 disables filtering",
    ),
    int(
        "candidateFinder",
        1,
        "candidate discovery by moving zero-crossing lines (1) or first/second derivative (2)",
    ),
    PropertySpec {
        name: FEATURE_THRESHOLDS_KEY,
        ty: PropertyType::String,
        default: PropertyValue::String(Cow::Borrowed("20,0,0_10,10,1.5_0,0,1.7")),
        description: "decision-tree thresholds of the slur classifier",
    },
    double(
        "deltaStepSlope",
        10.0,
        "derivative interval per moving zero-crossing line",
    ),
    int(
        "looseWindow",
        10,
        "points examined when deciding whether a gap splits two candidates",
    ),
    int("minPoints", 10, "minimum points of a candidate rising range"),
    double(
        "deltaAmplitude",
        5.0,
        "amplitude band below the maximum that forms a candidate peak",
    ),
    double(
        "minVoltageMainPeak",
        150.0,
        "minimum acceptable amplitude of the main peak",
    ),
    double(
        "percentMainePeak",
        0.8,
        "fraction of the main peak other candidates must reach when it is weak",
    ),
    double("minVoltage", 100.0, "minimum acceptable amplitude of a secondary peak"),
    double(
        "percentPeak",
        0.3,
        "fraction of the main peak used to evaluate secondary peaks",
    ),
    double(
        "maxDelatAplitudeNotches",
        50.0,
        "largest accepted amplitude drop between two peaks",
    ),
    double(
        "minAmplitudeFlatness",
        7.0,
        "valley depth below which adjacent candidates merge",
    ),
    double(
        "minValidAmplitudePeak",
        7.0,
        "valley depth below which a secondary peak becomes a slur",
    ),
    double(
        "approximateRangeOfTsegment",
        0.4,
        "length of the T segment as a fraction of RR",
    ),
    double(
        "approximateBoundaryOfToff",
        0.75,
        "latest T offset as a fraction of RR after the segment start",
    ),
    double(
        "measurable",
        100.0,
        "minimum T peak amplitude of a measurable signal",
    ),
];

/// The full property table in declaration order.
pub fn properties() -> &'static [PropertySpec] {
    &PROPERTIES
}

/// Looks up a property by key.
pub fn property(name: &str) -> Option<&'static PropertySpec> {
    PROPERTIES.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_keys_are_unique() {
        let mut names: Vec<_> = properties().iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), properties().len());
    }

    #[test]
    fn defaults_match_declared_types() {
        for spec in properties() {
            assert_eq!(spec.default.property_type(), spec.ty, "{}", spec.name);
            assert!(!spec.description.is_empty());
        }
    }

    #[test]
    fn lookup() {
        let spec = property("minPoints").unwrap();
        assert_eq!(spec.ty, PropertyType::Int);
        assert_eq!(spec.default, PropertyValue::Int(10));
        assert!(property("minpoints").is_none());
    }

    // --- coercion ---

    #[test]
    fn integers_widen_to_double() {
        assert_eq!(
            PropertyValue::Int(3).coerce(PropertyType::Double),
            Some(PropertyValue::Double(3.0))
        );
    }

    #[test]
    fn floats_do_not_narrow() {
        assert_eq!(PropertyValue::Double(3.0).coerce(PropertyType::Int), None);
        assert_eq!(
            PropertyValue::String(Cow::Borrowed("3")).coerce(PropertyType::Double),
            None
        );
    }

    #[test]
    fn negative_int_is_not_uint() {
        assert_eq!(PropertyValue::Int(-1).coerce(PropertyType::Uint), None);
        assert_eq!(
            PropertyValue::Int(7).coerce(PropertyType::Uint),
            Some(PropertyValue::Uint(7))
        );
    }

    #[test]
    fn toml_conversion() {
        assert_eq!(
            PropertyValue::from_toml(toml::Value::Integer(4)),
            Some(PropertyValue::Int(4))
        );
        assert_eq!(PropertyValue::from_toml(toml::Value::Boolean(true)), None);
    }
}
