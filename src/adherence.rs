use serde::{Deserialize, Serialize};

use crate::models::{calories_from_macros, MacroTotals};

/// Targets from a diet plan. Any of them may be left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroTargets {
    pub proteins: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    /// Explicit kcal target. Takes precedence over the derived one.
    pub calories: Option<f64>,
}

impl MacroTargets {
    /// Calorie target: the explicit one, otherwise derived from the macro
    /// targets when all three are set. `None` in every other case.
    pub fn calorie_target(&self) -> Option<f64> {
        if self.calories.is_some() {
            return self.calories;
        }
        match (self.proteins, self.carbs, self.fats) {
            (Some(proteins), Some(carbs), Some(fats)) => Some(calories_from_macros(proteins, carbs, fats)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroDeviation {
    pub target: f64,
    pub actual: f64,
    pub delta: f64,
    /// `None` when the target is zero.
    pub percent_of_target: Option<f64>,
}

impl MacroDeviation {
    fn new(target: f64, actual: f64) -> Self {
        Self {
            target,
            actual,
            delta: actual - target,
            percent_of_target: (target > 0.0).then(|| actual / target * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceReport {
    pub proteins: Option<MacroDeviation>,
    pub carbs: Option<MacroDeviation>,
    pub fats: Option<MacroDeviation>,
    pub calories: Option<MacroDeviation>,
    /// Mean squared error over the targeted values. The calorie term is
    /// divided by 100 to keep it on the same scale as the gram terms.
    pub mse: f64,
}

/// Compares what was eaten against the plan's targets.
///
/// Only the values that have a target are compared. The calorie term of the
/// MSE is divided by 100, since kcal deviations are an order of magnitude
/// larger than gram deviations.
///
/// # Arguments
/// * `consumed`: Totals of what was eaten, usually from [`crate::macro_aggregator::aggregate`].
/// * `targets`: The plan's targets. See [`MacroTargets::calorie_target`] for kcal.
///
/// # Returns
/// One deviation per targeted value and the MSE over them. The MSE is 0.0
/// when nothing is targeted.
pub fn compare(consumed: &MacroTotals, targets: &MacroTargets) -> AdherenceReport {
    let proteins = targets.proteins.map(|t| MacroDeviation::new(t, consumed.proteins));
    let carbs = targets.carbs.map(|t| MacroDeviation::new(t, consumed.carbs));
    let fats = targets.fats.map(|t| MacroDeviation::new(t, consumed.fats));
    let calories = targets.calorie_target().map(|t| MacroDeviation::new(t, consumed.calories));

    let mut squared_error_sum = 0.0;
    let mut count = 0;
    for deviation in [proteins, carbs, fats].iter().flatten() {
        squared_error_sum += deviation.delta.powi(2);
        count += 1;
    }
    if let Some(deviation) = calories {
        squared_error_sum += deviation.delta.powi(2) / 100.0;
        count += 1;
    }

    AdherenceReport {
        proteins,
        carbs,
        fats,
        calories,
        mse: if count == 0 { 0.0 } else { squared_error_sum / count as f64 },
    }
}
