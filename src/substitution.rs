use serde::{Deserialize, Serialize};

use crate::models::{FoodNutrientRecord, UserRestrictionProfile};
use crate::restriction_evaluator::classify;

/// System-configured replacement of one food by another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub from_food_id: String,
    pub to_food_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubstitutionPlan<'a> {
    /// Exactly one candidate, and a rule maps the conflicting food onto it.
    Auto { substitute: &'a FoodNutrientRecord },
    /// Zero or several candidates, or no rule backing the single one.
    NeedsReview { candidates: Vec<&'a FoodNutrientRecord> },
}

/// Conflict-free foods of the same group, in catalog order.
///
/// Foods without a group have no candidates. The conflicting food is never
/// its own candidate.
///
/// # Arguments
/// * `conflicting`: The food to replace.
/// * `profile`: The user's restriction profile. Candidates must classify as `None` under it.
/// * `catalog`: Foods to search.
///
/// # Returns
/// Borrowed candidates, empty when either input is absent or nothing qualifies.
pub fn find_substitutions<'a>(
    conflicting: Option<&FoodNutrientRecord>,
    profile: Option<&UserRestrictionProfile>,
    catalog: &'a [FoodNutrientRecord],
) -> Vec<&'a FoodNutrientRecord> {
    let (Some(conflicting), Some(profile)) = (conflicting, profile) else {
        return Vec::new();
    };
    let Some(group) = conflicting.food_group.as_deref() else {
        return Vec::new();
    };

    catalog
        .iter()
        .filter(|food| food.id != conflicting.id)
        .filter(|food| food.food_group.as_deref() == Some(group))
        .filter(|food| classify(food, profile).is_none())
        .collect()
}

pub fn plan_substitution<'a>(
    conflicting: &FoodNutrientRecord,
    profile: &UserRestrictionProfile,
    catalog: &'a [FoodNutrientRecord],
    rules: &[SubstitutionRule],
) -> SubstitutionPlan<'a> {
    let candidates = find_substitutions(Some(conflicting), Some(profile), catalog);

    if let [only] = candidates.as_slice() {
        let only: &'a FoodNutrientRecord = *only;
        let has_rule = rules
            .iter()
            .any(|rule| rule.from_food_id == conflicting.id && rule.to_food_id == only.id);
        if has_rule {
            return SubstitutionPlan::Auto { substitute: only };
        }
    }
    SubstitutionPlan::NeedsReview { candidates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;

    fn dairy(id: &str) -> FoodNutrientRecord {
        FoodNutrientRecord::new(id, UnitKind::Grams, 3.0, 5.0, 3.0).in_group("dairy")
    }

    fn catalog() -> Vec<FoodNutrientRecord> {
        vec![
            dairy("cow_milk").with_sensitivity("lactose"),
            FoodNutrientRecord::new("oat_drink", UnitKind::Grams, 1.0, 6.0, 1.5).in_group("dairy"),
            dairy("yogurt").with_sensitivity("lactose"),
            FoodNutrientRecord::new("bread", UnitKind::Grams, 8.0, 50.0, 3.0).in_group("cereals"),
            dairy("lactose_free_milk"),
        ]
    }

    fn lactose_intolerant() -> UserRestrictionProfile {
        UserRestrictionProfile::default().with_sensitivities(["lactose"])
    }

    #[test]
    fn test_find_substitutions_same_group_without_conflict() {
        let catalog = catalog();
        let profile = lactose_intolerant();
        let ids: Vec<&str> = find_substitutions(Some(&catalog[0]), Some(&profile), &catalog)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["oat_drink", "lactose_free_milk"]);
    }

    #[test]
    fn test_find_substitutions_skips_candidates_with_other_conflicts() {
        let catalog = catalog();
        let profile = lactose_intolerant().with_non_preferred(["oat_drink"]);
        let ids: Vec<&str> = find_substitutions(Some(&catalog[0]), Some(&profile), &catalog)
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["lactose_free_milk"]);
    }

    #[test]
    fn test_find_substitutions_empty_cases() {
        let catalog = catalog();
        let profile = lactose_intolerant();
        let ungrouped = FoodNutrientRecord::new("mystery", UnitKind::Grams, 0.0, 0.0, 0.0);
        assert!(find_substitutions(Some(&ungrouped), Some(&profile), &catalog).is_empty());
        assert!(find_substitutions(None, Some(&profile), &catalog).is_empty());
        assert!(find_substitutions(Some(&catalog[0]), None, &catalog).is_empty());
        // bread is the only cereal
        assert!(find_substitutions(Some(&catalog[3]), Some(&profile), &catalog).is_empty());
    }

    #[test]
    fn test_plan_auto_with_single_ruled_candidate() {
        let catalog = catalog();
        let profile = lactose_intolerant().with_non_preferred(["oat_drink"]);
        let rules = vec![SubstitutionRule {
            from_food_id: "cow_milk".to_string(),
            to_food_id: "lactose_free_milk".to_string(),
        }];
        match plan_substitution(&catalog[0], &profile, &catalog, &rules) {
            SubstitutionPlan::Auto { substitute } => assert_eq!(substitute.id, "lactose_free_milk"),
            other => panic!("expected auto substitution, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_needs_review_without_rule_or_with_many() {
        let catalog = catalog();
        let rules = vec![SubstitutionRule {
            from_food_id: "cow_milk".to_string(),
            to_food_id: "lactose_free_milk".to_string(),
        }];

        let single_unruled = lactose_intolerant().with_non_preferred(["oat_drink"]);
        let plan = plan_substitution(&catalog[0], &single_unruled, &catalog, &[]);
        assert!(matches!(plan, SubstitutionPlan::NeedsReview { ref candidates } if candidates.len() == 1));

        let many = lactose_intolerant();
        let plan = plan_substitution(&catalog[0], &many, &catalog, &rules);
        assert!(matches!(plan, SubstitutionPlan::NeedsReview { ref candidates } if candidates.len() == 2));
    }

    #[test]
    fn test_plan_serializes_with_status_tag() {
        let catalog = catalog();
        let plan = plan_substitution(&catalog[3], &lactose_intolerant(), &catalog, &[]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["status"], "needs_review");
        assert_eq!(json["candidates"].as_array().unwrap().len(), 0);
    }
}
