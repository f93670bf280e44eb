use std::collections::HashMap;

use crate::models::FoodNutrientRecord;

/// Id lookup over a catalog snapshot. The first record wins on duplicate ids.
pub struct FoodIndex<'a> {
    by_id: HashMap<&'a str, &'a FoodNutrientRecord>,
}

impl<'a> FoodIndex<'a> {
    pub fn new(catalog: &'a [FoodNutrientRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(catalog.len());
        for food in catalog {
            by_id.entry(food.id.as_str()).or_insert(food);
        }
        Self { by_id }
    }

    pub fn get(&self, food_id: &str) -> Option<&'a FoodNutrientRecord> {
        self.by_id.get(food_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let catalog = vec![
            FoodNutrientRecord::new("egg", UnitKind::Units, 6.0, 0.5, 5.0),
            FoodNutrientRecord::new("egg", UnitKind::Grams, 99.0, 0.0, 0.0),
        ];
        let index = FoodIndex::new(&catalog);
        assert_eq!(index.get("egg").unwrap().unit_kind, UnitKind::Units);
        assert!(index.get("bacon").is_none());
    }
}
