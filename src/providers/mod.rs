pub mod csv_catalog;
pub mod json_files;
pub mod raw;

use std::collections::HashMap;
use std::path::Path;

use crate::error::CatalogError;
use crate::models::{FoodNutrientRecord, UserRestrictionProfile};

pub use csv_catalog::{load_food_csv, CsvCatalogFile};
pub use json_files::{foods_from_json, JsonCatalogFile, JsonProfileFile};
pub use raw::{normalize_food, normalize_profile, RawFood, RawProfile};

/// Bulk source of food nutrient records.
pub trait FoodCatalogProvider {
    fn foods(&self) -> Result<Vec<FoodNutrientRecord>, CatalogError>;
}

/// Source of per-user restriction profiles. `Ok(None)` means the user has none.
pub trait RestrictionProfileProvider {
    fn restriction_profile(&self, user_id: &str) -> Result<Option<UserRestrictionProfile>, CatalogError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    foods: Vec<FoodNutrientRecord>,
}

impl InMemoryCatalog {
    pub fn new(foods: Vec<FoodNutrientRecord>) -> Self {
        Self { foods }
    }
}

impl FoodCatalogProvider for InMemoryCatalog {
    fn foods(&self) -> Result<Vec<FoodNutrientRecord>, CatalogError> {
        Ok(self.foods.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfiles {
    profiles: HashMap<String, UserRestrictionProfile>,
}

impl InMemoryProfiles {
    pub fn insert(&mut self, user_id: impl Into<String>, profile: UserRestrictionProfile) {
        self.profiles.insert(user_id.into(), profile);
    }
}

impl RestrictionProfileProvider for InMemoryProfiles {
    fn restriction_profile(&self, user_id: &str) -> Result<Option<UserRestrictionProfile>, CatalogError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}

/// Like [`RestrictionProfileProvider::restriction_profile`], but a missing
/// profile is an error.
pub fn require_profile(
    provider: &dyn RestrictionProfileProvider,
    user_id: &str,
) -> Result<UserRestrictionProfile, CatalogError> {
    provider
        .restriction_profile(user_id)?
        .ok_or_else(|| CatalogError::UnknownUser(user_id.to_string()))
}

/// Picks the catalog reader from the file extension.
pub fn open_catalog(path: &Path) -> Result<Box<dyn FoodCatalogProvider>, CatalogError> {
    match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("csv") => Ok(Box::new(CsvCatalogFile::new(path))),
        Some("json") => Ok(Box::new(JsonCatalogFile::new(path))),
        _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnitKind;

    #[test]
    fn test_open_catalog_by_extension() {
        assert!(open_catalog(Path::new("foods.csv")).is_ok());
        assert!(open_catalog(Path::new("foods.JSON")).is_ok());
        assert!(matches!(
            open_catalog(Path::new("foods.xlsx")),
            Err(CatalogError::UnsupportedFormat(_))
        ));
        assert!(open_catalog(Path::new("foods")).is_err());
    }

    #[test]
    fn test_in_memory_providers() {
        let catalog = InMemoryCatalog::new(vec![FoodNutrientRecord::new("a", UnitKind::Grams, 1.0, 2.0, 3.0)]);
        assert_eq!(catalog.foods().unwrap().len(), 1);

        let mut profiles = InMemoryProfiles::default();
        profiles.insert("coach-client", UserRestrictionProfile::default().with_sensitivities(["soy"]));
        assert!(require_profile(&profiles, "coach-client").unwrap().sensitivity_ids.contains("soy"));
        assert!(matches!(
            require_profile(&profiles, "stranger"),
            Err(CatalogError::UnknownUser(ref u)) if u == "stranger"
        ));
    }
}
