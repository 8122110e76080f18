//! India AQI derivation from PM2.5 concentration
//!
//! Implements the piecewise-linear breakpoint scale used by the Indian
//! national AQI for PM2.5, plus the categorical band mapping.

use serde::{Deserialize, Serialize};

/// Breakpoint segments as (c_lo, c_hi, i_lo, i_hi).
///
/// Note the table has gaps between segments (e.g. 30 < c < 31): a
/// concentration falling in a gap, below 0, or above 500 maps to the
/// fallback index of 500.
const BREAKPOINTS: [(f64, f64, u32, u32); 6] = [
    (0.0, 30.0, 0, 50),
    (31.0, 60.0, 51, 100),
    (61.0, 90.0, 101, 200),
    (91.0, 120.0, 201, 300),
    (121.0, 250.0, 301, 400),
    (251.0, 500.0, 401, 500),
];

/// Index returned when the concentration falls in no breakpoint segment.
const FALLBACK_INDEX: u32 = 500;

/// Compute the AQI index for a PM2.5 concentration in µg/m³.
///
/// Linear interpolation within the matching breakpoint segment, rounded to
/// the nearest integer. Out-of-table concentrations yield 500 rather than
/// an error.
pub fn compute_index(pm25: f64) -> u32 {
    for (c_lo, c_hi, i_lo, i_hi) in BREAKPOINTS {
        if pm25 >= c_lo && pm25 <= c_hi {
            let span = (i_hi - i_lo) as f64 / (c_hi - c_lo);
            return (span * (pm25 - c_lo) + i_lo as f64).round() as u32;
        }
    }
    FALLBACK_INDEX
}

/// Categorical AQI band, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Severe,
}

impl AqiCategory {
    /// Map an index to its band: `min(index / 50, 5)` into the ordered list.
    pub fn from_index(index: u32) -> Self {
        match (index / 50).min(5) {
            0 => Self::Good,
            1 => Self::Satisfactory,
            2 => Self::Moderate,
            3 => Self::Poor,
            4 => Self::VeryPoor,
            _ => Self::Severe,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
            Self::Severe => "Severe",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
