use crate::config::WeightTable;

/// Weighted mean over the members that are present, with weights
/// renormalized across that subset. `None` when nothing is present or the
/// present weights sum to zero.
pub fn present_weighted_average(members: &[(f64, Option<f64>)]) -> Option<f64> {
    let (weighted_sum, total_weight) = members
        .iter()
        .filter_map(|(weight, value)| value.map(|v| (*weight, v)))
        .fold((0.0, 0.0), |(sum, total), (weight, value)| {
            (sum + weight * value, total + weight)
        });

    if total_weight > 0.0 {
        Some(weighted_sum / total_weight)
    } else {
        None
    }
}

/// Maintainability, security and structure blended with the inner weights
pub fn core_composite(
    weights: &WeightTable,
    maintainability: Option<f64>,
    security: Option<f64>,
    structure: Option<f64>,
) -> Option<f64> {
    present_weighted_average(&[
        (weights.maintainability, maintainability),
        (weights.security, security),
        (weights.structure, structure),
    ])
}

/// Dimension inputs to the overall score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverallInputs {
    pub core: Option<f64>,
    pub testing: Option<f64>,
    pub coverage: Option<f64>,
    pub docs: Option<f64>,
    pub ci_cd: Option<f64>,
    pub compliance: Option<f64>,
    pub api: Option<f64>,
    pub monitoring: Option<f64>,
}

pub fn overall_score(weights: &WeightTable, inputs: &OverallInputs) -> Option<f64> {
    present_weighted_average(&[
        (weights.core, inputs.core),
        (weights.testing, inputs.testing),
        (weights.coverage, inputs.coverage),
        (weights.documentation, inputs.docs),
        (weights.ci_cd, inputs.ci_cd),
        (weights.compliance, inputs.compliance),
        (weights.api, inputs.api),
        (weights.monitoring, inputs.monitoring),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_absent_is_none() {
        assert_eq!(present_weighted_average(&[(0.5, None), (0.5, None)]), None);
        assert_eq!(present_weighted_average(&[]), None);
    }

    #[test]
    fn test_renormalizes_over_present_members() {
        let weights = WeightTable::default();
        let core = core_composite(&weights, Some(80.0), Some(60.0), None).unwrap();
        assert!((core - (0.5 * 80.0 + 0.3 * 60.0) / 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_single_member_passes_through() {
        let weights = WeightTable::default();
        assert_eq!(core_composite(&weights, Some(71.0), None, None), Some(71.0));
    }

    #[test]
    fn test_zero_weight_members_ignored() {
        assert_eq!(present_weighted_average(&[(0.0, Some(10.0))]), None);
        assert_eq!(present_weighted_average(&[(0.0, Some(10.0)), (1.0, Some(50.0))]), Some(50.0));
    }

    #[test]
    fn test_overall_with_testing_and_core() {
        let weights = WeightTable::default();
        let inputs = OverallInputs {
            core: Some(80.0),
            testing: Some(40.0),
            ..OverallInputs::default()
        };
        let overall = overall_score(&weights, &inputs).unwrap();
        assert!((overall - (0.25 * 80.0 + 0.15 * 40.0) / 0.4).abs() < 1e-9);
    }
}
