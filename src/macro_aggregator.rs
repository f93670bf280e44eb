use log::debug;
use serde::{Deserialize, Serialize};

use crate::food_index::FoodIndex;
use crate::models::{calories_from_macros, FoodNutrientRecord, IngredientReference, MacroTotals, UnitKind};
use crate::quantity::non_negative;

/// Macro contribution of a single ingredient line, for per-line display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientMacros {
    pub food_id: String,
    pub food_name: Option<String>,
    pub quantity: f64,
    pub unit_kind: Option<UnitKind>,
    pub resolved: bool,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct MacroGrams {
    proteins: f64,
    carbs: f64,
    fats: f64,
}

fn contribution(food: &FoodNutrientRecord, quantity: f64) -> MacroGrams {
    let scale = food.unit_kind.scale(quantity);
    MacroGrams {
        proteins: non_negative(Some(food.proteins_per_100)) * scale,
        carbs: non_negative(Some(food.carbs_per_100)) * scale,
        fats: non_negative(Some(food.fats_per_100)) * scale,
    }
}

// Sorted before summing so the total does not depend on ingredient order.
fn ordered_sum(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().fold(0.0, |total, value| total + value)
}

fn sum_lines<'a>(lines: impl Iterator<Item = &'a IngredientReference>, index: &FoodIndex<'_>) -> MacroTotals {
    let mut proteins = Vec::new();
    let mut carbs = Vec::new();
    let mut fats = Vec::new();

    for line in lines {
        let Some(food) = index.get(&line.food_id) else {
            debug!("Skipping ingredient with unknown food id '{}'", line.food_id);
            continue;
        };
        let grams = contribution(food, line.quantity.value());
        proteins.push(grams.proteins);
        carbs.push(grams.carbs);
        fats.push(grams.fats);
    }

    MacroTotals::from_macros(
        ordered_sum(&mut proteins),
        ordered_sum(&mut carbs),
        ordered_sum(&mut fats),
    )
}

/// Totals for a recipe or meal.
///
/// Unknown food ids contribute nothing. Quantities are coerced to a
/// non-negative number first. Macros are summed in full precision and
/// calories are derived once from the sums, so no rounding happens here.
///
/// # Arguments
/// * `ingredients`: Line items, each a food id and a quantity in grams or units.
/// * `catalog`: Food records to resolve the ids against. May be empty.
///
/// # Returns
/// The summed macros in grams and their kcal. All zero for an empty list.
pub fn aggregate(ingredients: &[IngredientReference], catalog: &[FoodNutrientRecord]) -> MacroTotals {
    if ingredients.is_empty() {
        return MacroTotals::zero();
    }
    let index = FoodIndex::new(catalog);
    sum_lines(ingredients.iter(), &index)
}

/// Day totals over several meals, aggregated as one list.
pub fn aggregate_meals(meals: &[&[IngredientReference]], catalog: &[FoodNutrientRecord]) -> MacroTotals {
    let index = FoodIndex::new(catalog);
    sum_lines(meals.iter().flat_map(|meal| meal.iter()), &index)
}

/// Per-line contributions in input order. Unknown foods are listed with
/// `resolved: false` and zero macros.
pub fn ingredient_breakdown(
    ingredients: &[IngredientReference],
    catalog: &[FoodNutrientRecord],
) -> Vec<IngredientMacros> {
    let index = FoodIndex::new(catalog);
    ingredients
        .iter()
        .map(|line| {
            let quantity = line.quantity.value();
            match index.get(&line.food_id) {
                Some(food) => {
                    let grams = contribution(food, quantity);
                    IngredientMacros {
                        food_id: line.food_id.clone(),
                        food_name: Some(food.name.clone()),
                        quantity,
                        unit_kind: Some(food.unit_kind),
                        resolved: true,
                        proteins: grams.proteins,
                        carbs: grams.carbs,
                        fats: grams.fats,
                        calories: calories_from_macros(grams.proteins, grams.carbs, grams.fats),
                    }
                }
                None => IngredientMacros {
                    food_id: line.food_id.clone(),
                    food_name: None,
                    quantity,
                    unit_kind: None,
                    resolved: false,
                    proteins: 0.0,
                    carbs: 0.0,
                    fats: 0.0,
                    calories: 0.0,
                },
            }
        })
        .collect()
}
