//! Stored row shapes and their normalization into the canonical models.
//!
//! Rows come from several tables and older exports, so the same relation may
//! be named `sensitivity` or `sensitivities`, `condition` or
//! `medical_conditions`, and may hold bare ids or nested join objects. All of
//! that is resolved here; nothing past this module looks at raw shapes.

use log::warn;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;

use crate::models::{ConditionRelation, FoodNutrientRecord, MedicalConditionRelation, UnitKind, UserRestrictionProfile};
use crate::quantity::Quantity;

/// Ids are strings in some tables and integers in others. Anything else
/// (null, booleans, objects) is kept as `Other` and never names a row.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl IdValue {
    pub fn as_id(&self) -> Option<String> {
        let id = match self {
            IdValue::Text(s) => s.trim().to_string(),
            IdValue::Number(n) => n.to_string(),
            IdValue::Other(_) => return None,
        };
        (!id.is_empty()).then_some(id)
    }
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = IdValue::deserialize(deserializer)?;
    Ok(value.as_id().unwrap_or_default())
}

/// A list entry that may not have the expected shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(serde_json::Value),
}

impl<T> Lenient<T> {
    pub fn into_valid(self) -> Option<T> {
        match self {
            Lenient::Valid(item) => Some(item),
            Lenient::Invalid(value) => {
                warn!("Dropping malformed entry {}", value);
                None
            }
        }
    }
}

/// Reads a list and drops the entries that do not deserialize as `T`.
/// A missing, null or non-list value is an empty list.
pub fn deserialize_lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let entries = Option::<OneOrMany<Lenient<T>>>::deserialize(deserializer)?;
    Ok(entries
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Lenient::into_valid)
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn flatten_refs<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    value.map(OneOrMany::into_vec).unwrap_or_default()
}

/// A reference to another row: a bare id or a join object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Object(RawRefObject),
    Id(IdValue),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRefObject {
    pub id: Option<IdValue>,
    pub food_id: Option<IdValue>,
    pub sensitivity_id: Option<IdValue>,
    pub condition_id: Option<IdValue>,
    pub medical_condition_id: Option<IdValue>,
    pub food: Option<Box<RawRef>>,
    pub sensitivity: Option<Box<RawRef>>,
    pub condition: Option<Box<RawRef>>,
    pub medical_condition: Option<Box<RawRef>>,
}

impl RawRef {
    pub fn resolve_id(&self) -> Option<String> {
        match self {
            RawRef::Id(id) => id.as_id(),
            RawRef::Object(object) => object.resolve_id(),
        }
    }
}

impl RawRefObject {
    // Foreign keys first, then nested rows, then the row's own id.
    pub fn resolve_id(&self) -> Option<String> {
        [&self.food_id, &self.sensitivity_id, &self.condition_id, &self.medical_condition_id]
            .into_iter()
            .flatten()
            .find_map(IdValue::as_id)
            .or_else(|| {
                [&self.food, &self.sensitivity, &self.condition, &self.medical_condition]
                    .into_iter()
                    .flatten()
                    .find_map(|nested| nested.resolve_id())
            })
            .or_else(|| self.id.as_ref().and_then(IdValue::as_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConditionLink {
    pub id: Option<IdValue>,
    pub condition_id: Option<IdValue>,
    pub medical_condition_id: Option<IdValue>,
    #[serde(alias = "medical_condition")]
    pub condition: Option<RawRef>,
    #[serde(alias = "relation_type")]
    pub relation: Option<IdValue>,
}

impl RawConditionLink {
    fn condition_id(&self) -> Option<String> {
        [&self.condition_id, &self.medical_condition_id]
            .into_iter()
            .flatten()
            .find_map(IdValue::as_id)
            .or_else(|| self.condition.as_ref().and_then(RawRef::resolve_id))
            .or_else(|| self.id.as_ref().and_then(IdValue::as_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFood {
    #[serde(alias = "food_id")]
    pub id: Option<IdValue>,
    pub name: Option<IdValue>,
    #[serde(alias = "unit_type")]
    pub unit_kind: Option<IdValue>,
    #[serde(alias = "proteins", alias = "protein")]
    pub proteins_per_100: Quantity,
    #[serde(alias = "carbs", alias = "carbohydrates")]
    pub carbs_per_100: Quantity,
    #[serde(alias = "fats", alias = "fat")]
    pub fats_per_100: Quantity,
    #[serde(alias = "sensitivity", alias = "sensitivity_ids")]
    pub sensitivities: Option<OneOrMany<RawRef>>,
    #[serde(
        alias = "condition",
        alias = "conditions",
        alias = "medical_conditions",
        alias = "medical_condition_relations"
    )]
    pub medical_condition_links: Option<OneOrMany<Lenient<RawConditionLink>>>,
    #[serde(alias = "group", alias = "food_group_id")]
    pub food_group: Option<IdValue>,
}

fn unique_ids(refs: Vec<RawRef>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    refs.iter()
        .filter_map(RawRef::resolve_id)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Canonical record for a stored food row, `None` when the row has no id.
pub fn normalize_food(raw: RawFood) -> Option<FoodNutrientRecord> {
    let Some(id) = raw.id.as_ref().and_then(IdValue::as_id) else {
        warn!("Skipping food row without id (name: {:?})", raw.name.as_ref().and_then(IdValue::as_id));
        return None;
    };

    let unit_label = raw.unit_kind.as_ref().and_then(IdValue::as_id);
    let mut medical_condition_relations = Vec::new();
    for link in flatten_refs(raw.medical_condition_links).into_iter().filter_map(Lenient::into_valid) {
        let Some(condition_id) = link.condition_id() else {
            warn!("Food '{}': dropping condition link without condition id", id);
            continue;
        };
        let relation = link.relation.as_ref().and_then(IdValue::as_id);
        match relation.as_deref().and_then(ConditionRelation::from_label) {
            Some(relation) => medical_condition_relations.push(MedicalConditionRelation { condition_id, relation }),
            None => warn!(
                "Food '{}': dropping condition '{}' with unknown relation {:?}",
                id, condition_id, relation
            ),
        }
    }

    Some(FoodNutrientRecord {
        name: raw.name.as_ref().and_then(IdValue::as_id).unwrap_or_default(),
        unit_kind: UnitKind::from_label(unit_label.as_deref()),
        proteins_per_100: raw.proteins_per_100.value(),
        carbs_per_100: raw.carbs_per_100.value(),
        fats_per_100: raw.fats_per_100.value(),
        sensitivity_ids: unique_ids(flatten_refs(raw.sensitivities)),
        medical_condition_relations,
        food_group: raw.food_group.as_ref().and_then(IdValue::as_id),
        id,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProfile {
    #[serde(alias = "preferred_foods")]
    pub preferred_food_ids: Option<OneOrMany<RawRef>>,
    #[serde(alias = "non_preferred_foods")]
    pub non_preferred_food_ids: Option<OneOrMany<RawRef>>,
    #[serde(alias = "individual_restrictions", alias = "restricted_foods")]
    pub individual_restriction_food_ids: Option<OneOrMany<RawRef>>,
    #[serde(alias = "sensitivities", alias = "sensitivity")]
    pub sensitivity_ids: Option<OneOrMany<RawRef>>,
    #[serde(alias = "medical_conditions", alias = "conditions", alias = "condition")]
    pub medical_condition_ids: Option<OneOrMany<RawRef>>,
}

fn id_set(refs: Option<OneOrMany<RawRef>>) -> BTreeSet<String> {
    flatten_refs(refs).iter().filter_map(RawRef::resolve_id).collect()
}

pub fn normalize_profile(raw: RawProfile) -> UserRestrictionProfile {
    UserRestrictionProfile {
        preferred_food_ids: id_set(raw.preferred_food_ids),
        non_preferred_food_ids: id_set(raw.non_preferred_food_ids),
        individual_restriction_food_ids: id_set(raw.individual_restriction_food_ids),
        sensitivity_ids: id_set(raw.sensitivity_ids),
        medical_condition_ids: id_set(raw.medical_condition_ids),
    }
}
