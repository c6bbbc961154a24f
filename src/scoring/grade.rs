use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter-style label for a nullable score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl Grade {
    /// Lower bounds are inclusive: 90 is Excellent, 89.999 is Good.
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => Self::NotAvailable,
            Some(s) if s >= 90.0 => Self::Excellent,
            Some(s) if s >= 80.0 => Self::Good,
            Some(s) if s >= 70.0 => Self::Fair,
            Some(_) => Self::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::NotAvailable => "N/A",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
