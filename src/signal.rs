// src/signal.rs
//! Persisted signal entity and the small value types around it.

use serde::{Deserialize, Serialize};

/// Spatial reference of every stored point (WGS84).
pub const SRID: i32 = 4326;

/// Known centroid of Manaus, used whenever a record has no usable coordinates.
pub const CITY_CENTROID: GeoPoint = GeoPoint {
    lon: -60.0217,
    lat: -3.1190,
};

/// Default cap for the stored neighborhood/location text (column is `varchar(500)`).
pub const LOCATION_MAX_CHARS: usize = 499;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Label stored in `nivel_risco`; the dashboard groups by these.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "Alto",
            RiskLevel::Medium => "Médio",
            RiskLevel::Low => "Baixo",
        }
    }

    /// Accepts Portuguese or English labels, ignoring case and the accent in "Médio".
    pub fn from_label(label: &str) -> Option<Self> {
        let norm = label.trim().to_lowercase().replace('é', "e");
        match norm.as_str() {
            "alto" | "high" => Some(RiskLevel::High),
            "medio" | "medium" => Some(RiskLevel::Medium),
            "baixo" | "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStatus {
    Pending,
    Discarded,
}

impl SignalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalStatus::Pending => "Pendente",
            SignalStatus::Discarded => "Descartado",
        }
    }
}

/// Which adapter produced a signal (`fonte_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceId {
    NewsFeed,
    LocalReports,
}

impl SourceId {
    pub fn as_i32(self) -> i32 {
        match self {
            SourceId::NewsFeed => 1,
            SourceId::LocalReports => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub title: String,
    pub description: String,
    pub status: SignalStatus,
    pub risk: RiskLevel,
    pub location: String,
    pub point: GeoPoint,
    pub source: SourceId,
}

impl Signal {
    /// Caps `location` at `max_chars` characters.
    pub fn truncate_location(mut self, max_chars: usize) -> Self {
        if let Some((idx, _)) = self.location.char_indices().nth(max_chars) {
            self.location.truncate(idx);
        }
        self
    }
}
