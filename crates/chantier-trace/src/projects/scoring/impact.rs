use super::super::domain::DecisionType;
use super::round_half_up;

pub const FINANCIAL_IMPACT_MULTIPLIER: f64 = 1.5;

const WRITTEN_VALIDATION_FACTOR: f64 = 1.0;
const PROOF_FACTOR: f64 = 0.5;

/// Relative weight of a decision type; alerts weigh the most.
pub const fn decision_weight(decision_type: DecisionType) -> f64 {
    match decision_type {
        DecisionType::Counsel => 4.0,
        DecisionType::Financial | DecisionType::Reception => 3.0,
        DecisionType::Modification | DecisionType::Validation => 2.0,
    }
}

/// Signed score delta for one decision given how well it is documented.
pub fn calculate_decision_impact(
    decision_type: DecisionType,
    has_written_validation: bool,
    has_proof_attached: bool,
    has_financial_impact: bool,
) -> i32 {
    let validation = if has_written_validation {
        WRITTEN_VALIDATION_FACTOR
    } else {
        -WRITTEN_VALIDATION_FACTOR
    };
    let proof = if has_proof_attached {
        PROOF_FACTOR
    } else {
        -PROOF_FACTOR
    };
    let multiplier = if has_financial_impact {
        FINANCIAL_IMPACT_MULTIPLIER
    } else {
        1.0
    };

    round_half_up((validation + proof) * decision_weight(decision_type) * multiplier) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_documented_decisions_gain_points() {
        assert_eq!(
            calculate_decision_impact(DecisionType::Modification, true, true, false),
            3
        );
        assert_eq!(
            calculate_decision_impact(DecisionType::Counsel, true, true, false),
            6
        );
        assert_eq!(
            calculate_decision_impact(DecisionType::Financial, true, true, true),
            7
        );
    }

    #[test]
    fn undocumented_decisions_lose_points() {
        assert_eq!(
            calculate_decision_impact(DecisionType::Validation, false, false, false),
            -3
        );
        assert_eq!(
            calculate_decision_impact(DecisionType::Counsel, false, false, false),
            -6
        );
        assert_eq!(
            calculate_decision_impact(DecisionType::Reception, false, false, true),
            -7
        );
    }

    #[test]
    fn partial_documentation_rounds_halves_upward() {
        // (1 - 0.5) * 3 = 1.5
        assert_eq!(
            calculate_decision_impact(DecisionType::Reception, true, false, false),
            2
        );
        // (-1 + 0.5) * 3 = -1.5
        assert_eq!(
            calculate_decision_impact(DecisionType::Reception, false, true, false),
            -1
        );
        // (-1 + 0.5) * 3 * 1.5 = -2.25
        assert_eq!(
            calculate_decision_impact(DecisionType::Financial, false, true, true),
            -2
        );
    }

    #[test]
    fn documentation_always_beats_no_documentation() {
        for decision_type in DecisionType::ordered() {
            for financial in [false, true] {
                let documented = calculate_decision_impact(decision_type, true, true, financial);
                let bare = calculate_decision_impact(decision_type, false, false, financial);
                assert!(documented > bare, "{decision_type:?} financial={financial}");
            }
        }
    }

    #[test]
    fn counsel_outweighs_modification() {
        let counsel = calculate_decision_impact(DecisionType::Counsel, false, false, false);
        let modification =
            calculate_decision_impact(DecisionType::Modification, false, false, false);
        assert!(counsel.abs() > modification.abs());
    }
}
