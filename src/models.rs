use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::providers::raw::{deserialize_id, deserialize_lenient_list};
use crate::quantity::Quantity;

// Atwater factors, kcal per gram. Calories are never stored, always derived.
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// How an ingredient quantity is read for a given food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Quantity in grams, macro fields are per 100 g. Legacy rows without a
    /// unit kind fall here.
    #[default]
    Grams,
    /// Quantity is a count, macro fields are grams per single unit.
    Units,
}

impl UnitKind {
    /// Maps a stored label to a unit kind. Unknown or absent labels are grams.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
            Some("units" | "unit" | "unidades" | "unidad" | "u") => UnitKind::Units,
            _ => UnitKind::Grams,
        }
    }

    /// Multiplier applied to the stored macro values for `quantity`.
    pub fn scale(self, quantity: f64) -> f64 {
        match self {
            UnitKind::Grams => quantity / 100.0,
            UnitKind::Units => quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionRelation {
    ToAvoid,
    Recommended,
}

impl ConditionRelation {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "to_avoid" | "avoid" | "a_evitar" => Some(ConditionRelation::ToAvoid),
            "recommended" | "recommend" | "recomendado" => Some(ConditionRelation::Recommended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalConditionRelation {
    pub condition_id: String,
    pub relation: ConditionRelation,
}

/// One food's nutritional profile, as a read-only catalog snapshot entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrientRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_kind: UnitKind,
    /// Grams per 100 g, or per unit when `unit_kind` is `Units`.
    #[serde(default)]
    pub proteins_per_100: f64,
    #[serde(default)]
    pub carbs_per_100: f64,
    #[serde(default)]
    pub fats_per_100: f64,
    #[serde(default)]
    pub sensitivity_ids: Vec<String>,
    #[serde(default)]
    pub medical_condition_relations: Vec<MedicalConditionRelation>,
    #[serde(default)]
    pub food_group: Option<String>,
}

impl FoodNutrientRecord {
    pub fn new(id: impl Into<String>, unit_kind: UnitKind, proteins: f64, carbs: f64, fats: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            unit_kind,
            proteins_per_100: proteins,
            carbs_per_100: carbs,
            fats_per_100: fats,
            sensitivity_ids: Vec::new(),
            medical_condition_relations: Vec::new(),
            food_group: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.food_group = Some(group.into());
        self
    }

    pub fn with_sensitivity(mut self, sensitivity_id: impl Into<String>) -> Self {
        self.sensitivity_ids.push(sensitivity_id.into());
        self
    }

    pub fn with_condition(mut self, condition_id: impl Into<String>, relation: ConditionRelation) -> Self {
        self.medical_condition_relations.push(MedicalConditionRelation {
            condition_id: condition_id.into(),
            relation,
        });
        self
    }
}

/// One line item of a recipe, meal or free-meal log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientReference {
    #[serde(default, alias = "foodId", deserialize_with = "deserialize_id")]
    pub food_id: String,
    #[serde(default)]
    pub quantity: Quantity,
}

impl IngredientReference {
    pub fn new(food_id: impl Into<String>, quantity: impl Into<Quantity>) -> Self {
        Self {
            food_id: food_id.into(),
            quantity: quantity.into(),
        }
    }
}

/// A recipe or meal as read by the command line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, alias = "title")]
    pub recipe_title: String,
    #[serde(default, deserialize_with = "deserialize_lenient_list")]
    pub ingredients: Vec<IngredientReference>,
    #[serde(default)]
    pub servings: Quantity,
}

impl Recipe {
    /// Declared number of servings, `None` unless it reads as a positive number.
    pub fn serving_count(&self) -> Option<f64> {
        let servings = self.servings.value();
        (servings > 0.0).then_some(servings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds totals from macro grams; calories are derived, never passed in.
    pub fn from_macros(proteins: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories: calories_from_macros(proteins, carbs, fats),
            proteins,
            carbs,
            fats,
        }
    }

    /// Scales the macros (e.g. to one serving) and re-derives calories.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = crate::quantity::non_negative(Some(factor));
        Self::from_macros(self.proteins * factor, self.carbs * factor, self.fats * factor)
    }

    /// Display rounding. Only ever applied to final values.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            calories: round(self.calories),
            proteins: round(self.proteins),
            carbs: round(self.carbs),
            fats: round(self.fats),
        }
    }

    /// Share of calories coming from each macro, in percent.
    pub fn energy_split(&self) -> EnergySplit {
        if self.calories <= 0.0 {
            return EnergySplit::default();
        }
        EnergySplit {
            protein_percent: self.proteins * KCAL_PER_G_PROTEIN / self.calories * 100.0,
            carbs_percent: self.carbs * KCAL_PER_G_CARB / self.calories * 100.0,
            fat_percent: self.fats * KCAL_PER_G_FAT / self.calories * 100.0,
        }
    }
}

pub fn calories_from_macros(proteins: f64, carbs: f64, fats: f64) -> f64 {
    proteins * KCAL_PER_G_PROTEIN + carbs * KCAL_PER_G_CARB + fats * KCAL_PER_G_FAT
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergySplit {
    pub protein_percent: f64,
    pub carbs_percent: f64,
    pub fat_percent: f64,
}

/// Everything that shapes how foods relate to one user. Membership only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRestrictionProfile {
    pub preferred_food_ids: BTreeSet<String>,
    pub non_preferred_food_ids: BTreeSet<String>,
    /// Hard per-user blocks set by a coach, independent of sensitivities.
    pub individual_restriction_food_ids: BTreeSet<String>,
    pub sensitivity_ids: BTreeSet<String>,
    pub medical_condition_ids: BTreeSet<String>,
}

fn collect_ids<I, S>(ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(Into::into).collect()
}

impl UserRestrictionProfile {
    pub fn with_preferred<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.preferred_food_ids.extend(collect_ids(ids));
        self
    }

    pub fn with_non_preferred<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.non_preferred_food_ids.extend(collect_ids(ids));
        self
    }

    pub fn with_individual_restrictions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.individual_restriction_food_ids.extend(collect_ids(ids));
        self
    }

    pub fn with_sensitivities<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.sensitivity_ids.extend(collect_ids(ids));
        self
    }

    pub fn with_conditions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.medical_condition_ids.extend(collect_ids(ids));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    #[serde(rename = "preferred")]
    Preferred,
    #[serde(rename = "non-preferred")]
    NonPreferred,
    #[serde(rename = "individual_restriction")]
    IndividualRestriction,
    #[serde(rename = "sensitivity")]
    Sensitivity,
    #[serde(rename = "condition_avoid")]
    ConditionAvoid,
    #[serde(rename = "condition_recommend")]
    ConditionRecommend,
}

impl ConflictKind {
    /// Whether the food should be kept off the user's plate.
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            ConflictKind::NonPreferred
                | ConflictKind::IndividualRestriction
                | ConflictKind::Sensitivity
                | ConflictKind::ConditionAvoid
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResult {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub reason: String,
}
