use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality-of-service hint handed to the platform location service.
///
/// The discriminants are the platform's request priority codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderPriority {
    /// Finest location available, most likely satellite based.
    #[default]
    HighAccuracy = 100,
    /// "Block" level accuracy, roughly 100 meters.
    BalancedPower = 102,
    /// "City" level accuracy, roughly 10 kilometers.
    LowPower = 104,
    /// Passive: only fixes requested by other clients are delivered.
    NoPower = 105,
}

impl ProviderPriority {
    /// Platform code for this priority.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a priority from its platform code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::HighAccuracy),
            102 => Some(Self::BalancedPower),
            104 => Some(Self::LowPower),
            105 => Some(Self::NoPower),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HighAccuracy => "HIGH_ACCURACY",
            Self::BalancedPower => "BALANCED_POWER",
            Self::LowPower => "LOW_POWER",
            Self::NoPower => "NO_POWER",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "HIGH_ACCURACY" | "HIGH" => Ok(Self::HighAccuracy),
            "BALANCED_POWER" | "BALANCED" => Ok(Self::BalancedPower),
            "LOW_POWER" | "LOW" => Ok(Self::LowPower),
            "NO_POWER" | "PASSIVE" => Ok(Self::NoPower),
            other => other
                .parse::<i32>()
                .ok()
                .and_then(Self::from_code)
                .ok_or_else(|| format!("unknown provider priority: {s}")),
        }
    }
}
