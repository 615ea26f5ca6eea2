// Domain types: reference catalogs, stored pals, request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Reference data ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suitability {
    pub work: String,
    pub level: i64,
}

/// A breeding outcome: pairing with `parent` yields `child`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub parent: String,
    pub child: String,
}

/// One paldex entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub suitability: Vec<Suitability>,
    pub children: Vec<Child>,
}

/// A passive skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    pub name: String,
    pub effect: String,
    pub tier: i64,
}

/// A named combination of passive skills.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitCombo {
    pub name: String,
    pub skills: Vec<String>,
}

// ── Stored pals ──────────────────────────────────────────────────────

/// One captured pal. `id` is positional within its species group.
///
/// `source` is the stored object the record was read from. Writes are
/// laid over it so key order and unrecognised keys survive a rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRecord {
    pub id: u32,
    pub gender: String,
    pub traits: Vec<String>,
    pub source: Map<String, Value>,
}

impl StoredRecord {
    pub fn new(id: u32, gender: &str, traits: Vec<String>) -> Self {
        Self {
            id,
            gender: gender.to_string(),
            traits,
            source: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesGroup {
    pub name: String,
    pub records: Vec<StoredRecord>,
    pub source: Map<String, Value>,
}

impl SpeciesGroup {
    pub fn new(name: &str, records: Vec<StoredRecord>) -> Self {
        Self {
            name: name.to_string(),
            records,
            source: Map::new(),
        }
    }
}

/// The unit of read and write against the store.
pub type StoredCollection = Vec<SpeciesGroup>;

// ── Gender ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Canonical stored token.
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }
}

/// The token vocabulary a deployment accepts on requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenderDomain {
    /// `m` / `f`
    #[default]
    Short,
    /// `male` / `female`
    Word,
}

impl GenderDomain {
    pub fn parse(self, token: &str) -> Option<Gender> {
        match (self, token) {
            (GenderDomain::Short, "m") | (GenderDomain::Word, "male") => Some(Gender::Male),
            (GenderDomain::Short, "f") | (GenderDomain::Word, "female") => Some(Gender::Female),
            _ => None,
        }
    }

    /// Render a stored token in this domain. Tokens that are not a
    /// recognised code in either vocabulary pass through unchanged.
    pub fn display(self, stored: &str) -> String {
        let gender = GenderDomain::Short
            .parse(stored)
            .or_else(|| GenderDomain::Word.parse(stored));
        match (self, gender) {
            (GenderDomain::Short, Some(g)) => g.code().to_string(),
            (GenderDomain::Word, Some(Gender::Male)) => "male".to_string(),
            (GenderDomain::Word, Some(Gender::Female)) => "female".to_string(),
            (_, None) => stored.to_string(),
        }
    }

    pub fn expected(self) -> &'static str {
        match self {
            GenderDomain::Short => "'m' or 'f'",
            GenderDomain::Word => "'male' or 'female'",
        }
    }

    pub fn from_setting(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "short" | "code" => Some(GenderDomain::Short),
            "word" | "long" => Some(GenderDomain::Word),
            _ => None,
        }
    }
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body of `POST /api/add-pal`. Fields are optional so that missing
/// ones surface as `InvalidInput` instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddPalRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub passive_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemovePalRequest {
    pub name: Option<String>,
    pub id: Option<u32>,
}

/// A validated add request, gender already converted to its stored code.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPal {
    pub species: String,
    pub gender: Gender,
    pub traits: Vec<String>,
}

/// Full dump of the four collections, as uploaded for import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSnapshot {
    #[serde(default)]
    pub pals: Value,
    #[serde(default)]
    pub passive_skills: Value,
    #[serde(default)]
    pub passive_skill_combos: Value,
    #[serde(default)]
    pub stored_pals: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest {
    #[serde(default = "default_import_source")]
    pub source: String,
    pub data: Option<DataSnapshot>,
}

fn default_import_source() -> String {
    "upload".to_string()
}

// ── Responses ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDto {
    pub name: String,
}

/// One stored pal flattened for the list screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalDto {
    pub id: u32,
    pub name: String,
    pub image_url: String,
    pub gender: String,
    pub passive_skills: Vec<TraitDto>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionCounts {
    pub pals: usize,
    pub passive_skills: usize,
    pub passive_skill_combos: usize,
    pub stored_pals: usize,
}
