use diet_engine::models::{ConditionRelation, ConflictKind, FoodNutrientRecord, IngredientReference, UnitKind, UserRestrictionProfile};
use diet_engine::restriction_evaluator::{classify_catalog, conflict_report, evaluate};
use diet_engine::substitution::{find_substitutions, plan_substitution, SubstitutionPlan, SubstitutionRule};

fn food(id: &str, group: &str) -> FoodNutrientRecord {
    FoodNutrientRecord::new(id, UnitKind::Grams, 5.0, 5.0, 5.0)
        .named(id)
        .in_group(group)
}

/// Every classification the evaluator can produce, one food per rule.
fn catalog() -> Vec<FoodNutrientRecord> {
    vec![
        food("quinoa", "cereals"),
        food("liver", "meat"),
        food("pork", "meat"),
        food("wheat_bread", "cereals").with_sensitivity("gluten"),
        food("sugar", "sweets").with_condition("diabetes", ConditionRelation::ToAvoid),
        food("lentils", "legumes").with_condition("diabetes", ConditionRelation::Recommended),
        food("rice", "cereals"),
        food("chicken", "meat"),
    ]
}

fn profile() -> UserRestrictionProfile {
    UserRestrictionProfile::default()
        .with_preferred(["quinoa"])
        .with_non_preferred(["liver"])
        .with_individual_restrictions(["pork"])
        .with_sensitivities(["gluten"])
        .with_conditions(["diabetes"])
}

#[test]
fn every_rule_classifies_its_food() {
    let catalog = catalog();
    let profile = profile();
    let kinds: Vec<Option<ConflictKind>> = catalog
        .iter()
        .map(|f| evaluate(Some(f), Some(&profile)).map(|c| c.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(ConflictKind::Preferred),
            Some(ConflictKind::NonPreferred),
            Some(ConflictKind::IndividualRestriction),
            Some(ConflictKind::Sensitivity),
            Some(ConflictKind::ConditionAvoid),
            Some(ConflictKind::ConditionRecommend),
            None,
            None,
        ]
    );
}

#[test]
fn preferred_food_with_sensitivity_stays_preferred() {
    let bread = food("wheat_bread", "cereals").with_sensitivity("gluten");
    let profile = UserRestrictionProfile::default()
        .with_preferred(["wheat_bread"])
        .with_sensitivities(["gluten"]);
    assert_eq!(evaluate(Some(&bread), Some(&profile)).unwrap().kind, ConflictKind::Preferred);
}

#[test]
fn non_preferred_example_reason() {
    let liver = food("liver", "meat");
    let profile = UserRestrictionProfile::default().with_non_preferred(["liver"]);
    let result = evaluate(Some(&liver), Some(&profile)).unwrap();
    assert_eq!(result.kind, ConflictKind::NonPreferred);
    assert_eq!(result.reason, "No preferido");
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({"type": "non-preferred", "reason": "No preferido"})
    );
}

#[test]
fn absent_profile_is_not_a_conflict() {
    assert!(evaluate(Some(&food("rice", "cereals")), None).is_none());
}

#[test]
fn conflict_report_for_recipe() {
    let catalog = catalog();
    let ingredients = vec![
        IngredientReference::new("rice", 80.0),
        IngredientReference::new("wheat_bread", 60.0),
        IngredientReference::new("unknown", 10.0),
        IngredientReference::new("lentils", 120.0),
    ];
    let report = conflict_report(&ingredients, &catalog, Some(&profile()));
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].food_id, "wheat_bread");
    assert_eq!(report[0].conflict.reason, "Sensibilidad: gluten");
    assert_eq!(report[1].conflict.kind, ConflictKind::ConditionRecommend);

    let json = serde_json::to_value(&report[0]).unwrap();
    assert_eq!(json["type"], "sensitivity");
    assert_eq!(json["food_name"], "wheat_bread");
}

#[test]
fn catalog_classification_matches_single_evaluations() {
    let catalog = catalog();
    let profile = profile();
    for (entry, food) in classify_catalog(&catalog, &profile).iter().zip(&catalog) {
        assert_eq!(entry.food_id, food.id);
        assert_eq!(entry.conflict, evaluate(Some(food), Some(&profile)));
    }
}

#[test]
fn substitutes_come_from_same_group_and_are_conflict_free() {
    let catalog = catalog();
    let profile = profile();
    let bread = &catalog[3];

    let ids: Vec<&str> = find_substitutions(Some(bread), Some(&profile), &catalog)
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    // quinoa is preferred, which is a classification, so only rice qualifies
    assert_eq!(ids, vec!["rice"]);

    let rules = vec![SubstitutionRule {
        from_food_id: "wheat_bread".into(),
        to_food_id: "rice".into(),
    }];
    assert!(matches!(
        plan_substitution(bread, &profile, &catalog, &rules),
        SubstitutionPlan::Auto { substitute } if substitute.id == "rice"
    ));
    assert!(matches!(
        plan_substitution(bread, &profile, &catalog, &[]),
        SubstitutionPlan::NeedsReview { .. }
    ));
}

#[test]
fn meat_substitutes_skip_blocked_foods() {
    let catalog = catalog();
    let profile = profile();
    let ids: Vec<&str> = find_substitutions(Some(&catalog[2]), Some(&profile), &catalog)
        .iter()
        .map(|f| f.id.as_str())
        .collect();
    assert_eq!(ids, vec!["chicken"]);
}
