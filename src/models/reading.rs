//! Glucose sample models: the upstream wire shape and the normalized reading.

use serde::{Deserialize, Serialize};

/// One upstream-reported glucose sample, as returned by `ReadPublisherLatestGlucoseValues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSample {
    /// Device wall time, encoded as `Date(<epoch ms>)`
    #[serde(rename = "WT")]
    pub wall_time_raw: String,
    /// mg/dL, 0 when unavailable
    #[serde(rename = "Value")]
    pub value: i32,
    /// Trend code (e.g. "Flat", "SingleUp")
    #[serde(rename = "Trend", default)]
    pub trend: String,
}

/// Direction and rate of change reported with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    /// Any code not listed above (including "NotComputable", "RateOutOfRange")
    Unknown,
}

impl Trend {
    /// Placeholder rendered for unknown trends.
    pub const PLACEHOLDER: &'static str = "   ";

    pub fn from_code(code: &str) -> Self {
        match code {
            "DoubleUp" => Trend::DoubleUp,
            "SingleUp" => Trend::SingleUp,
            "FortyFiveUp" => Trend::FortyFiveUp,
            "Flat" => Trend::Flat,
            "FortyFiveDown" => Trend::FortyFiveDown,
            "SingleDown" => Trend::SingleDown,
            "DoubleDown" => Trend::DoubleDown,
            _ => Trend::Unknown,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Trend::DoubleUp => "⇈",
            Trend::SingleUp => "↑",
            Trend::FortyFiveUp => "↗",
            Trend::Flat => "→",
            Trend::FortyFiveDown => "↘",
            Trend::SingleDown => "↓",
            Trend::DoubleDown => "⇊",
            Trend::Unknown => Self::PLACEHOLDER,
        }
    }
}

/// Canonical reading for one poll, exposed to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedReading {
    pub timestamp_ms: i64,
    /// mg/dL, 0 when the sensor reported no value
    pub value: i32,
    pub trend: Trend,
    /// `None` when no prior sample qualifies or either value is unavailable
    pub delta_from_prior: Option<i32>,
}

impl NormalizedReading {
    pub fn trend_symbol(&self) -> &'static str {
        self.trend.symbol()
    }

    pub fn has_value(&self) -> bool {
        self.value > 0
    }
}
