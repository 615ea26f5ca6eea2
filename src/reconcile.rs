// Mapping between the store's capitalised field names and the in-process
// types, plus the flattened list view.
//
// Reads accept either casing per field (capitalised first), writes always
// emit the capitalised shape. Collections may arrive as arrays or as
// index-keyed objects; null holes are skipped.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::models::{
    Child, PalDto, Species, SpeciesGroup, StoredCollection, StoredRecord, Suitability, Trait,
    TraitCombo, TraitDto,
};

const ID: (&str, &str) = ("ID", "id");
const GENDER: (&str, &str) = ("Gender", "gender");
const PASSIVE_SKILLS: (&str, &str) = ("PassiveSkills", "passiveSkills");
const NAME: (&str, &str) = ("Name", "name");
const STORED_PALS: (&str, &str) = ("StoredPals", "storedPals");

// ── Field helpers ────────────────────────────────────────────────────

/// Items of a collection node, in stored order.
pub fn entries(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
        Value::Object(map) => map.values().filter(|v| !v.is_null()).collect(),
        _ => Vec::new(),
    }
}

fn pick<'a>(obj: &'a Map<String, Value>, external: &str, internal: &str) -> Option<&'a Value> {
    obj.get(external)
        .filter(|v| !v.is_null())
        .or_else(|| obj.get(internal).filter(|v| !v.is_null()))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn as_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

fn as_text_list(value: &Value) -> Vec<String> {
    entries(value)
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// A positional id. Integral floats (`1.0`) and numeric strings count;
/// negatives, fractions and values past `u32::MAX` do not.
fn as_id(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(i) => u32::try_from(i).ok(),
            None => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
                .map(|f| f as u32),
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field(obj: &Map<String, Value>, external: &str, internal: &str) -> String {
    pick(obj, external, internal).map(as_text).unwrap_or_default()
}

fn int_field(obj: &Map<String, Value>, external: &str, internal: &str) -> i64 {
    pick(obj, external, internal).map(as_int).unwrap_or_default()
}

fn str_list(obj: &Map<String, Value>, external: &str, internal: &str) -> Vec<String> {
    pick(obj, external, internal)
        .map(as_text_list)
        .unwrap_or_default()
}

fn obj_list<'a>(
    obj: &'a Map<String, Value>,
    external: &str,
    internal: &str,
) -> Vec<&'a Map<String, Value>> {
    pick(obj, external, internal)
        .map(entries)
        .unwrap_or_default()
        .into_iter()
        .filter_map(Value::as_object)
        .collect()
}

/// The stored value of a field if it still reads as `current`, else `fresh`.
fn unchanged_or<T: PartialEq>(
    source: &Map<String, Value>,
    (external, internal): (&str, &str),
    read: impl Fn(&Value) -> T,
    current: &T,
    fresh: Value,
) -> Value {
    match pick(source, external, internal) {
        Some(stored) if read(stored) == *current => stored.clone(),
        _ => fresh,
    }
}

/// Lay `fields` over `source` under their capitalised keys.
///
/// A field takes the position of whichever casing it was read from and
/// fields the source lacks go last, in `fields` order. Every other key is
/// kept where it was, including an internal-casing duplicate of a key
/// that is also present capitalised.
fn overlay(
    source: &Map<String, Value>,
    fields: Vec<((&str, &str), Value)>,
) -> Map<String, Value> {
    let mut pending: Vec<Option<((&str, &str), Value)>> = fields.into_iter().map(Some).collect();
    let mut out = Map::new();

    for (key, value) in source {
        let slot = pending.iter_mut().find(|f| match f {
            Some(((external, internal), _)) => {
                key == external || (key == internal && !source.contains_key(*external))
            }
            None => false,
        });
        match slot.and_then(Option::take) {
            Some(((external, _), fresh)) => {
                out.insert(external.to_string(), fresh);
            }
            None => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    for ((external, _), fresh) in pending.into_iter().flatten() {
        out.insert(external.to_string(), fresh);
    }
    out
}

// ── Stored pals ──────────────────────────────────────────────────────

pub fn record_from_value(value: &Value) -> StoredRecord {
    let Some(obj) = value.as_object() else {
        return StoredRecord::default();
    };
    let id = match pick(obj, ID.0, ID.1) {
        Some(raw) => as_id(raw).unwrap_or_else(|| {
            tracing::warn!(%raw, "Stored pal has an unusable ID, reading it as 0");
            0
        }),
        None => 0,
    };
    StoredRecord {
        id,
        gender: str_field(obj, GENDER.0, GENDER.1),
        traits: str_list(obj, PASSIVE_SKILLS.0, PASSIVE_SKILLS.1),
        source: obj.clone(),
    }
}

pub fn record_to_value(record: &StoredRecord) -> Value {
    let src = &record.source;
    let fields = vec![
        (
            ID,
            unchanged_or(
                src,
                ID,
                |v| as_id(v).unwrap_or_default(),
                &record.id,
                Value::from(record.id),
            ),
        ),
        (
            GENDER,
            unchanged_or(
                src,
                GENDER,
                as_text,
                &record.gender,
                Value::from(record.gender.clone()),
            ),
        ),
        (
            PASSIVE_SKILLS,
            unchanged_or(
                src,
                PASSIVE_SKILLS,
                as_text_list,
                &record.traits,
                Value::from(record.traits.clone()),
            ),
        ),
    ];
    Value::Object(overlay(src, fields))
}

pub fn group_from_value(value: &Value) -> SpeciesGroup {
    let Some(obj) = value.as_object() else {
        return SpeciesGroup::default();
    };
    let records = pick(obj, STORED_PALS.0, STORED_PALS.1)
        .map(entries)
        .unwrap_or_default()
        .into_iter()
        .map(record_from_value)
        .collect();
    SpeciesGroup {
        name: str_field(obj, NAME.0, NAME.1),
        records,
        source: obj.clone(),
    }
}

/// The pal list is always written back as an array.
pub fn group_to_value(group: &SpeciesGroup) -> Value {
    let fields = vec![
        (
            NAME,
            unchanged_or(
                &group.source,
                NAME,
                as_text,
                &group.name,
                Value::from(group.name.clone()),
            ),
        ),
        (
            STORED_PALS,
            Value::Array(group.records.iter().map(record_to_value).collect()),
        ),
    ];
    Value::Object(overlay(&group.source, fields))
}

pub fn read_collection(value: &Value) -> StoredCollection {
    entries(value).into_iter().map(group_from_value).collect()
}

pub fn write_collection(collection: &[SpeciesGroup]) -> Value {
    Value::Array(collection.iter().map(group_to_value).collect())
}

// ── Catalogs ─────────────────────────────────────────────────────────

pub fn read_species(value: &Value) -> Vec<Species> {
    entries(value)
        .into_iter()
        .filter_map(Value::as_object)
        .map(|obj| Species {
            id: str_field(obj, "Id", "id"),
            name: str_field(obj, "Name", "name"),
            image_url: str_field(obj, "ImageUrl", "imageUrl"),
            suitability: obj_list(obj, "Suitability", "suitability")
                .into_iter()
                .map(|s| Suitability {
                    work: str_field(s, "Work", "work"),
                    level: int_field(s, "Level", "level"),
                })
                .collect(),
            children: obj_list(obj, "Children", "children")
                .into_iter()
                .map(|c| Child {
                    parent: str_field(c, "Parent", "parent"),
                    child: str_field(c, "Child", "child"),
                })
                .collect(),
        })
        .collect()
}

pub fn read_traits(value: &Value) -> Vec<Trait> {
    entries(value)
        .into_iter()
        .filter_map(Value::as_object)
        .map(|obj| Trait {
            name: str_field(obj, "Name", "name"),
            effect: str_field(obj, "Effect", "effect"),
            tier: int_field(obj, "Tier", "tier"),
        })
        .collect()
}

pub fn read_trait_combos(value: &Value) -> Vec<TraitCombo> {
    entries(value)
        .into_iter()
        .filter_map(Value::as_object)
        .map(|obj| TraitCombo {
            name: str_field(obj, "Name", "name"),
            skills: str_list(obj, "Skills", "skills"),
        })
        .collect()
}

// ── Presentation ─────────────────────────────────────────────────────

/// Flatten every stored pal into a list row, joined with the species
/// image. A species missing from the paldex gets an empty image URL and
/// a record without a gender shows as `Unknown`.
pub fn to_presentation_dto(collection: &[SpeciesGroup], paldex: &[Species]) -> Vec<PalDto> {
    let images: HashMap<String, &str> = paldex
        .iter()
        .filter(|s| !s.name.is_empty())
        .map(|s| (s.name.to_lowercase(), s.image_url.as_str()))
        .collect();

    collection
        .iter()
        .filter(|g| !g.name.is_empty())
        .flat_map(|group| {
            let image_url = images
                .get(&group.name.to_lowercase())
                .copied()
                .unwrap_or_default();
            group.records.iter().map(move |record| PalDto {
                id: record.id,
                name: group.name.clone(),
                image_url: image_url.to_string(),
                gender: if record.gender.is_empty() {
                    "Unknown".to_string()
                } else {
                    record.gender.clone()
                },
                passive_skills: record
                    .traits
                    .iter()
                    .map(|name| TraitDto { name: name.clone() })
                    .collect(),
            })
        })
        .collect()
}

/// Keep rows whose species name contains `name` and which, for every
/// skill filter, carry a passive skill containing it. Case-insensitive.
pub fn filter_pals(pals: Vec<PalDto>, name: Option<&str>, skills: &[String]) -> Vec<PalDto> {
    let name = name.map(str::to_lowercase).unwrap_or_default();
    let skills: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    pals.into_iter()
        .filter(|pal| pal.name.to_lowercase().contains(&name))
        .filter(|pal| {
            skills.iter().all(|wanted| {
                pal.passive_skills
                    .iter()
                    .any(|s| s.name.to_lowercase().contains(wanted))
            })
        })
        .collect()
}
