// CoursePulse - core/models.rs
//
// Best-model selection over pre-computed evaluation results.
// Lower RMSE wins; equal RMSE falls back to higher R²; a remaining tie
// keeps the earliest entry in input order.

use crate::core::model::ModelResult;
use crate::util::error::ModelSelectionError;
use std::cmp::Ordering;

fn compare(a: &ModelResult, b: &ModelResult) -> Ordering {
    a.rmse.total_cmp(&b.rmse).then_with(|| b.r2.total_cmp(&a.r2))
}

/// All results ordered best-first (ascending RMSE, then descending R²).
///
/// The sort is stable, so full ties keep their input order.
pub fn rank_models(results: &[ModelResult]) -> Vec<&ModelResult> {
    let mut ranked: Vec<&ModelResult> = results.iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

/// The best-performing model.
///
/// Fails with `EmptyModelSet` when `results` is empty; there is no sensible
/// default model to fall back to.
pub fn select_best_model(results: &[ModelResult]) -> Result<&ModelResult, ModelSelectionError> {
    let mut iter = results.iter();
    let mut best = iter.next().ok_or(ModelSelectionError::EmptyModelSet)?;
    for candidate in iter {
        // Strictly better only: the first of equal entries wins.
        if compare(candidate, best) == Ordering::Less {
            best = candidate;
        }
    }
    tracing::debug!(model = %best.name, rmse = best.rmse, r2 = best.r2, "Best model selected");
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_set_selects_xgboost() {
        let results = ModelResult::reference_set();
        let best = select_best_model(&results).unwrap();
        assert_eq!(best.name, "XGBoost");
        assert_eq!(best.rmse, 152.99);
    }

    #[test]
    fn test_empty_set_fails() {
        assert_eq!(
            select_best_model(&[]),
            Err(ModelSelectionError::EmptyModelSet)
        );
    }

    #[test]
    fn test_rmse_tie_breaks_on_higher_r2() {
        let results = vec![
            ModelResult::new("Ridge", 100.0, 0.60),
            ModelResult::new("Lasso", 100.0, 0.70),
            ModelResult::new("Linear", 120.0, 0.90),
        ];
        assert_eq!(select_best_model(&results).unwrap().name, "Lasso");
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let results = vec![
            ModelResult::new("First", 50.0, 0.5),
            ModelResult::new("Second", 50.0, 0.5),
        ];
        assert_eq!(select_best_model(&results).unwrap().name, "First");
        let ranked = rank_models(&results);
        assert_eq!(ranked[0].name, "First");
        assert_eq!(ranked[1].name, "Second");
    }

    #[test]
    fn test_ranking_ascending_rmse() {
        let results = ModelResult::reference_set();
        let names: Vec<_> = rank_models(&results).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "XGBoost",
                "Linear Regression",
                "Gradient Boosting",
                "Ridge Regression",
                "Lasso Regression",
                "Random Forest",
            ]
        );
    }
}
