use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::food_index::FoodIndex;
use crate::models::{
    ConditionRelation, ConflictKind, ConflictResult, FoodNutrientRecord, IngredientReference,
    UserRestrictionProfile,
};

pub const REASON_PREFERRED: &str = "Preferido";
pub const REASON_NON_PREFERRED: &str = "No preferido";
pub const REASON_INDIVIDUAL_RESTRICTION: &str = "Restricción individual";

/// Classification of one recipe ingredient for a conflict report.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientConflict {
    pub food_id: String,
    pub food_name: String,
    #[serde(flatten)]
    pub conflict: ConflictResult,
}

/// Classification of one catalog food, `None` when it has no relation to the user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoodClassification {
    pub food_id: String,
    pub conflict: Option<ConflictResult>,
}

fn conflict(kind: ConflictKind, reason: impl Into<String>) -> Option<ConflictResult> {
    Some(ConflictResult {
        kind,
        reason: reason.into(),
    })
}

fn matching_condition<'a>(
    food: &'a FoodNutrientRecord,
    profile: &UserRestrictionProfile,
    relation: ConditionRelation,
) -> Option<&'a str> {
    food.medical_condition_relations
        .iter()
        .find(|link| link.relation == relation && profile.medical_condition_ids.contains(&link.condition_id))
        .map(|link| link.condition_id.as_str())
}

/// Relation between a food and a user.
///
/// Rules are checked in a fixed order and the first match wins, see [`classify`].
///
/// # Arguments
/// * `food`: The food to classify, `None` if it could not be resolved.
/// * `profile`: The user's restriction profile, `None` if the user has none.
///
/// # Returns
/// The matching classification with its display reason. `None` when either
/// input is absent or no rule matches.
pub fn evaluate(
    food: Option<&FoodNutrientRecord>,
    profile: Option<&UserRestrictionProfile>,
) -> Option<ConflictResult> {
    classify(food?, profile?)
}

/// First matching rule wins: explicit per-user food lists, then sensitivities,
/// then medical condition links (avoid before recommend).
pub fn classify(food: &FoodNutrientRecord, profile: &UserRestrictionProfile) -> Option<ConflictResult> {
    if profile.preferred_food_ids.contains(&food.id) {
        return conflict(ConflictKind::Preferred, REASON_PREFERRED);
    }
    if profile.non_preferred_food_ids.contains(&food.id) {
        return conflict(ConflictKind::NonPreferred, REASON_NON_PREFERRED);
    }
    if profile.individual_restriction_food_ids.contains(&food.id) {
        return conflict(ConflictKind::IndividualRestriction, REASON_INDIVIDUAL_RESTRICTION);
    }
    if let Some(sensitivity) = food
        .sensitivity_ids
        .iter()
        .find(|id| profile.sensitivity_ids.contains(*id))
    {
        return conflict(ConflictKind::Sensitivity, format!("Sensibilidad: {}", sensitivity));
    }
    if let Some(condition) = matching_condition(food, profile, ConditionRelation::ToAvoid) {
        return conflict(
            ConflictKind::ConditionAvoid,
            format!("Evitar por condición médica: {}", condition),
        );
    }
    if let Some(condition) = matching_condition(food, profile, ConditionRelation::Recommended) {
        return conflict(
            ConflictKind::ConditionRecommend,
            format!("Recomendado por condición médica: {}", condition),
        );
    }
    None
}

/// One entry per resolved ingredient that has a classification, in recipe order.
pub fn conflict_report(
    ingredients: &[IngredientReference],
    catalog: &[FoodNutrientRecord],
    profile: Option<&UserRestrictionProfile>,
) -> Vec<IngredientConflict> {
    let Some(profile) = profile else {
        return Vec::new();
    };
    let index = FoodIndex::new(catalog);
    ingredients
        .iter()
        .filter_map(|line| index.get(&line.food_id))
        .filter_map(|food| {
            classify(food, profile).map(|conflict| IngredientConflict {
                food_id: food.id.clone(),
                food_name: food.name.clone(),
                conflict,
            })
        })
        .collect()
}

/// Classifies every catalog food for one user, in catalog order.
pub fn classify_catalog(catalog: &[FoodNutrientRecord], profile: &UserRestrictionProfile) -> Vec<FoodClassification> {
    catalog
        .par_iter()
        .map(|food| FoodClassification {
            food_id: food.id.clone(),
            conflict: classify(food, profile),
        })
        .collect()
}
