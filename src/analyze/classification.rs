// src/analyze/classification.rs
//! Typed parse-with-defaults for model classifications.
//!
//! Each parser returns the fully populated struct together with the names of
//! the fields that had to fall back to a default, so callers can log them.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::signal::{GeoPoint, RiskLevel, CITY_CENTROID};

pub const UNKNOWN_NEIGHBORHOOD: &str = "Unknown";
pub const GLOBAL_LOCATION: &str = "Global";
pub const GENERIC_DISEASE: &str = "Geral";

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub defaulted: Vec<&'static str>,
}

/// Implemented by every classification shape the model can return.
pub trait ParseClassification: Sized {
    fn from_json(obj: &Map<String, Value>) -> Result<Parsed<Self>, ParseError>;
}

/// Classification of a participatory report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportClassification {
    pub risk: RiskLevel,
    pub neighborhood: String,
    pub point: GeoPoint,
}

/// Classification of a news entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsClassification {
    pub relevant: bool,
    pub disease: String,
    pub location: String,
    pub risk: RiskLevel,
}

impl ParseClassification for ReportClassification {
    fn from_json(obj: &Map<String, Value>) -> Result<Parsed<Self>, ParseError> {
        let mut defaulted = Vec::new();
        let risk = risk_or_default(obj, &mut defaulted);
        let neighborhood = text_or(obj, "bairro_estimado", UNKNOWN_NEIGHBORHOOD, &mut defaulted);
        let lat = coord_or(obj, "latitude", 90.0, CITY_CENTROID.lat, &mut defaulted);
        let lon = coord_or(obj, "longitude", 180.0, CITY_CENTROID.lon, &mut defaulted);
        Ok(Parsed {
            value: ReportClassification {
                risk,
                neighborhood,
                point: GeoPoint { lon, lat },
            },
            defaulted,
        })
    }
}

impl ParseClassification for NewsClassification {
    fn from_json(obj: &Map<String, Value>) -> Result<Parsed<Self>, ParseError> {
        // Relevance gates retention, so it never defaults.
        let relevant = match obj.get("relevante") {
            None | Some(Value::Null) => return Err(ParseError::MissingField("relevante")),
            Some(v) => parse_flag(v).ok_or_else(|| ParseError::InvalidField {
                field: "relevante",
                value: v.to_string(),
            })?,
        };

        let mut defaulted = Vec::new();
        let disease = text_or(obj, "doenca", GENERIC_DISEASE, &mut defaulted);
        let location = text_or(obj, "local", GLOBAL_LOCATION, &mut defaulted);
        let risk = risk_or_default(obj, &mut defaulted);
        Ok(Parsed {
            value: NewsClassification {
                relevant,
                disease,
                location,
                risk,
            },
            defaulted,
        })
    }
}

/// Parse sanitized model text into a classification.
pub fn parse_classification<C: ParseClassification>(json: &str) -> Result<Parsed<C>, ParseError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(obj) => C::from_json(&obj),
        _ => Err(ParseError::NotAnObject),
    }
}

fn risk_or_default(obj: &Map<String, Value>, defaulted: &mut Vec<&'static str>) -> RiskLevel {
    match obj
        .get("nivel_risco")
        .and_then(Value::as_str)
        .and_then(RiskLevel::from_label)
    {
        Some(r) => r,
        None => {
            defaulted.push("nivel_risco");
            RiskLevel::Low
        }
    }
}

fn text_or(
    obj: &Map<String, Value>,
    key: &'static str,
    fallback: &str,
    defaulted: &mut Vec<&'static str>,
) -> String {
    match obj.get(key).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => {
            defaulted.push(key);
            fallback.to_string()
        }
    }
}

fn coord_or(
    obj: &Map<String, Value>,
    key: &'static str,
    limit: f64,
    fallback: f64,
    defaulted: &mut Vec<&'static str>,
) -> f64 {
    let parsed = match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v.abs() <= limit => v,
        _ => {
            defaulted.push(key);
            fallback
        }
    }
}

fn parse_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "sim" | "yes" => Some(true),
            "false" | "não" | "nao" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
