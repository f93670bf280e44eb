use csv::ReaderBuilder;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::models::{ConditionRelation, FoodNutrientRecord, MedicalConditionRelation, UnitKind};
use crate::providers::FoodCatalogProvider;
use crate::quantity::{non_negative, parse_float_prefix};

// Required column headers
const ID_COL: &str = "id";
const NAME_COL: &str = "name";
const UNIT_KIND_COL: &str = "unit_kind";
const PROTEIN_COL: &str = "proteins";
const CARB_COL: &str = "carbs";
const FAT_COL: &str = "fats";

// Optional column headers, `;` separated id lists
const GROUP_COL: &str = "food_group";
const SENSITIVITIES_COL: &str = "sensitivities";
const AVOID_COL: &str = "conditions_avoid";
const RECOMMENDED_COL: &str = "conditions_recommended";

const LIST_SEPARATOR: char = ';';

fn split_ids(cell: Option<&str>) -> Vec<String> {
    cell.map(|s| {
        s.split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_macro(cell: Option<&str>) -> f64 {
    non_negative(cell.and_then(parse_float_prefix))
}

pub fn load_food_csv(csv_path: &Path) -> Result<Vec<FoodNutrientRecord>, CatalogError> {
    if !csv_path.exists() {
        return Err(CatalogError::NotFound(csv_path.to_path_buf()));
    }

    let file = std::fs::File::open(csv_path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::Headers).from_reader(file);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| column(name).ok_or_else(|| CatalogError::MissingColumn(name.to_string()));

    let id_idx = required(ID_COL)?;
    let name_idx = required(NAME_COL)?;
    let unit_idx = required(UNIT_KIND_COL)?;
    let protein_idx = required(PROTEIN_COL)?;
    let carb_idx = required(CARB_COL)?;
    let fat_idx = required(FAT_COL)?;
    let group_idx = column(GROUP_COL);
    let sensitivities_idx = column(SENSITIVITIES_COL);
    let avoid_idx = column(AVOID_COL);
    let recommended_idx = column(RECOMMENDED_COL);

    let mut foods = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        let id = cell(Some(id_idx)).unwrap_or_default().trim().to_string();
        if id.is_empty() {
            warn!("Skipping row {} of {:?}: empty id", row_index + 1, csv_path);
            continue;
        }

        let mut medical_condition_relations = Vec::new();
        for (idx, relation) in [(avoid_idx, ConditionRelation::ToAvoid), (recommended_idx, ConditionRelation::Recommended)] {
            for condition_id in split_ids(cell(idx)) {
                medical_condition_relations.push(MedicalConditionRelation { condition_id, relation });
            }
        }

        foods.push(FoodNutrientRecord {
            id,
            name: cell(Some(name_idx)).unwrap_or_default().trim().to_string(),
            unit_kind: UnitKind::from_label(cell(Some(unit_idx))),
            proteins_per_100: parse_macro(cell(Some(protein_idx))),
            carbs_per_100: parse_macro(cell(Some(carb_idx))),
            fats_per_100: parse_macro(cell(Some(fat_idx))),
            sensitivity_ids: split_ids(cell(sensitivities_idx)),
            medical_condition_relations,
            food_group: cell(group_idx).map(str::trim).filter(|g| !g.is_empty()).map(str::to_string),
        });
    }

    if foods.is_empty() {
        return Err(CatalogError::Empty(csv_path.to_path_buf()));
    }
    debug!("Loaded {} foods from {:?}", foods.len(), csv_path);
    Ok(foods)
}

/// Food catalog backed by a CSV export.
pub struct CsvCatalogFile {
    path: PathBuf,
}

impl CsvCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FoodCatalogProvider for CsvCatalogFile {
    fn foods(&self) -> Result<Vec<FoodNutrientRecord>, CatalogError> {
        load_food_csv(&self.path)
    }
}
