use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::models::{FoodNutrientRecord, UserRestrictionProfile};
use crate::providers::raw::{normalize_food, normalize_profile, RawFood, RawProfile};
use crate::providers::{FoodCatalogProvider, RestrictionProfileProvider};

fn read_json(path: &Path) -> Result<serde_json::Value, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Normalizes an exported array of food rows. Rows that do not fit any
/// known shape are skipped with a warning.
pub fn foods_from_json(value: serde_json::Value) -> Result<Vec<FoodNutrientRecord>, CatalogError> {
    let rows: Vec<serde_json::Value> = serde_json::from_value(value)?;
    let mut foods = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawFood>(row) {
            Ok(raw) => foods.extend(normalize_food(raw)),
            Err(e) => warn!("Skipping food row {}: {}", row_index, e),
        }
    }
    Ok(foods)
}

/// Food catalog backed by a JSON export of the foods table.
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FoodCatalogProvider for JsonCatalogFile {
    fn foods(&self) -> Result<Vec<FoodNutrientRecord>, CatalogError> {
        let foods = foods_from_json(read_json(&self.path)?)?;
        if foods.is_empty() {
            return Err(CatalogError::Empty(self.path.clone()));
        }
        debug!("Loaded {} foods from {:?}", foods.len(), self.path);
        Ok(foods)
    }
}

/// Restriction profiles keyed by user id, read from one JSON object.
pub struct JsonProfileFile {
    path: PathBuf,
}

impl JsonProfileFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RestrictionProfileProvider for JsonProfileFile {
    fn restriction_profile(&self, user_id: &str) -> Result<Option<UserRestrictionProfile>, CatalogError> {
        let mut profiles: HashMap<String, RawProfile> = serde_json::from_value(read_json(&self.path)?)?;
        Ok(profiles.remove(user_id).map(normalize_profile))
    }
}
