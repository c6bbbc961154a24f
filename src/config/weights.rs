//! Composition weights for the overall quality score
//!
//! Two tiers are configured in one flat table:
//! - inner weights blend maintainability, security and structure into the
//!   core composite
//! - outer weights blend the core composite with the analyzer dimensions
//!
//! Each tier is normalized on its own. Only present members take part in a
//! composition, so the stored weights are relative, not absolute.

use serde::{Deserialize, Serialize};

/// Weight table for score composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    /// Weight of maintainability inside the core composite
    #[serde(default = "default_maintainability_weight")]
    pub maintainability: f64,

    /// Weight of security inside the core composite
    #[serde(default = "default_security_weight")]
    pub security: f64,

    /// Weight of structure inside the core composite
    #[serde(default = "default_structure_weight")]
    pub structure: f64,

    /// Weight of the core composite in the overall score
    #[serde(default = "default_core_weight")]
    pub core: f64,

    #[serde(default = "default_testing_weight")]
    pub testing: f64,

    #[serde(default = "default_dimension_weight")]
    pub coverage: f64,

    #[serde(default = "default_dimension_weight")]
    pub documentation: f64,

    #[serde(default = "default_dimension_weight")]
    pub ci_cd: f64,

    #[serde(default = "default_dimension_weight")]
    pub compliance: f64,

    #[serde(default = "default_dimension_weight")]
    pub api: f64,

    #[serde(default = "default_dimension_weight")]
    pub monitoring: f64,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            maintainability: default_maintainability_weight(),
            security: default_security_weight(),
            structure: default_structure_weight(),
            core: default_core_weight(),
            testing: default_testing_weight(),
            coverage: default_dimension_weight(),
            documentation: default_dimension_weight(),
            ci_cd: default_dimension_weight(),
            compliance: default_dimension_weight(),
            api: default_dimension_weight(),
            monitoring: default_dimension_weight(),
        }
    }
}

impl WeightTable {
    // Pure function: Check if a weight is in valid range
    pub fn is_valid_weight(weight: f64) -> bool {
        (0.0..=1.0).contains(&weight)
    }

    // Pure function: Validate a single weight with name
    pub fn validate_weight(weight: f64, name: &str) -> Result<(), String> {
        if Self::is_valid_weight(weight) {
            Ok(())
        } else {
            Err(format!("{} weight must be between 0.0 and 1.0", name))
        }
    }

    // Pure function: A tier needs at least one positive weight
    pub fn validate_tier_sum(weights: &[f64], tier: &str) -> Result<(), String> {
        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            Ok(())
        } else {
            Err(format!("{} weights must have a positive sum", tier))
        }
    }

    pub fn named_weights(&self) -> [(&'static str, f64); 11] {
        [
            ("Maintainability", self.maintainability),
            ("Security", self.security),
            ("Structure", self.structure),
            ("Core", self.core),
            ("Testing", self.testing),
            ("Coverage", self.coverage),
            ("Documentation", self.documentation),
            ("CI/CD", self.ci_cd),
            ("Compliance", self.compliance),
            ("API", self.api),
            ("Monitoring", self.monitoring),
        ]
    }

    pub fn inner_tier(&self) -> [f64; 3] {
        [self.maintainability, self.security, self.structure]
    }

    pub fn outer_tier(&self) -> [f64; 8] {
        [
            self.core,
            self.testing,
            self.coverage,
            self.documentation,
            self.ci_cd,
            self.compliance,
            self.api,
            self.monitoring,
        ]
    }

    /// Validate ranges and tier sums
    pub fn validate(&self) -> Result<(), String> {
        for (name, weight) in self.named_weights() {
            Self::validate_weight(weight, name)?;
        }
        Self::validate_tier_sum(&self.inner_tier(), "Core")?;
        Self::validate_tier_sum(&self.outer_tier(), "Overall")?;
        Ok(())
    }

    /// Normalize each tier to sum to 1.0
    pub fn normalize(&mut self) {
        let inner: f64 = self.inner_tier().iter().sum();
        if inner > 0.0 && (inner - 1.0).abs() > 0.001 {
            self.maintainability /= inner;
            self.security /= inner;
            self.structure /= inner;
        }

        let outer: f64 = self.outer_tier().iter().sum();
        if outer > 0.0 && (outer - 1.0).abs() > 0.001 {
            self.core /= outer;
            self.testing /= outer;
            self.coverage /= outer;
            self.documentation /= outer;
            self.ci_cd /= outer;
            self.compliance /= outer;
            self.api /= outer;
            self.monitoring /= outer;
        }
    }
}

fn default_maintainability_weight() -> f64 {
    0.5
}

fn default_security_weight() -> f64 {
    0.3
}

fn default_structure_weight() -> f64 {
    0.2
}

fn default_core_weight() -> f64 {
    0.25
}

fn default_testing_weight() -> f64 {
    0.15
}

fn default_dimension_weight() -> f64 {
    0.10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_sum_to_one() {
        let weights = WeightTable::default();
        let inner: f64 = weights.inner_tier().iter().sum();
        let outer: f64 = weights.outer_tier().iter().sum();
        assert!((inner - 1.0).abs() < 1e-9);
        assert!((outer - 1.0).abs() < 1e-9);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let weights = WeightTable {
            testing: 1.5,
            ..WeightTable::default()
        };
        let err = weights.validate().unwrap_err();
        assert!(err.contains("Testing"));
    }

    #[test]
    fn test_zero_tier_rejected() {
        let weights = WeightTable {
            maintainability: 0.0,
            security: 0.0,
            structure: 0.0,
            ..WeightTable::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_normalize_scales_each_tier_independently() {
        let mut weights = WeightTable {
            maintainability: 0.4,
            security: 0.4,
            structure: 0.2,
            core: 0.5,
            ..WeightTable::default()
        };
        weights.normalize();

        assert!((weights.maintainability - 0.4).abs() < 1e-9);
        let outer: f64 = weights.outer_tier().iter().sum();
        assert!((outer - 1.0).abs() < 1e-9);
        assert!((weights.core / weights.testing - 0.5 / 0.15).abs() < 1e-9);
    }
}
