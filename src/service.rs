// Request-scoped orchestration: read whole nodes through the gateway, run
// the pure validation/mutation step, write the stored pals back.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{PalError, PalResult};
use crate::gateway::{StoreGateway, StorePath};
use crate::metrics;
use crate::models::{
    AddPalRequest, CollectionCounts, DataSnapshot, GenderDomain, NewPal, PalDto,
    RemovePalRequest, Species, SpeciesGroup, StoredCollection, Trait, TraitCombo,
};
use crate::reconcile::{
    filter_pals, read_collection, read_species, read_trait_combos, read_traits,
    to_presentation_dto, write_collection,
};
use crate::store::{add_record, find_record, is_well_formed, remove_record};
use crate::validate::{validate_add_request, validate_remove_request};

pub struct PalService {
    gateway: Arc<dyn StoreGateway>,
    gender_domain: GenderDomain,
    /// Serialises read-modify-write of the stored pals node within this
    /// process. Other writers to the same store are not covered.
    write_lock: Mutex<()>,
}

impl PalService {
    pub fn new(gateway: Arc<dyn StoreGateway>, gender_domain: GenderDomain) -> Self {
        Self {
            gateway,
            gender_domain,
            write_lock: Mutex::new(()),
        }
    }

    pub fn gender_domain(&self) -> GenderDomain {
        self.gender_domain
    }

    // ── Gateway access ───────────────────────────────────────────────

    async fn read_node(&self, path: StorePath) -> PalResult<Value> {
        match self.gateway.read(path).await {
            Ok(value) => Ok(value.unwrap_or(Value::Null)),
            Err(e) => {
                metrics::STORE_ERRORS_TOTAL.with_label_values(&["read"]).inc();
                Err(e)
            }
        }
    }

    async fn write_node(&self, path: StorePath, value: &Value) -> PalResult<()> {
        self.gateway.write(path, value).await.inspect_err(|_| {
            metrics::STORE_ERRORS_TOTAL.with_label_values(&["write"]).inc();
        })
    }

    pub async fn species(&self) -> PalResult<Vec<Species>> {
        Ok(read_species(&self.read_node(StorePath::Species).await?))
    }

    pub async fn traits(&self) -> PalResult<Vec<Trait>> {
        Ok(read_traits(&self.read_node(StorePath::Traits).await?))
    }

    pub async fn trait_combos(&self) -> PalResult<Vec<TraitCombo>> {
        Ok(read_trait_combos(&self.read_node(StorePath::TraitCombos).await?))
    }

    pub async fn stored(&self) -> PalResult<StoredCollection> {
        Ok(read_collection(&self.read_node(StorePath::StoredRecords).await?))
    }

    async fn save_stored(&self, collection: &[SpeciesGroup]) -> PalResult<()> {
        self.write_node(StorePath::StoredRecords, &write_collection(collection))
            .await?;
        let total: usize = collection.iter().map(|g| g.records.len()).sum();
        metrics::STORED_PALS.set(total as i64);
        Ok(())
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Validate and append a pal. Returns the validated request.
    pub async fn add_pal(&self, req: AddPalRequest) -> PalResult<NewPal> {
        let _guard = self.write_lock.lock().await;

        let (species, traits) = tokio::try_join!(self.species(), self.traits())?;
        let pal = validate_add_request(&species, &traits, self.gender_domain, req)
            .inspect_err(|e| rejected("add", e))?;

        let stored = self.stored().await?;
        let updated = add_record(&stored, &pal.species, pal.gender.code(), &pal.traits);
        self.save_stored(&updated).await?;

        metrics::PALS_ADDED_TOTAL.inc();
        tracing::info!(species = %pal.species, gender = pal.gender.code(), "Pal added");
        Ok(pal)
    }

    /// Remove a pal by species and positional id.
    pub async fn remove_pal(&self, req: RemovePalRequest) -> PalResult<(String, u32)> {
        let (name, id) = validate_remove_request(req).inspect_err(|e| rejected("remove", e))?;

        let _guard = self.write_lock.lock().await;
        let stored = self.stored().await?;
        if find_record(&stored, &name, id).is_none() {
            let err = PalError::RecordNotFound { name, id };
            rejected("remove", &err);
            return Err(err);
        }

        let updated = remove_record(&stored, &name, id);
        self.save_stored(&updated).await?;

        metrics::PALS_REMOVED_TOTAL.inc();
        tracing::info!(species = %name, id, "Pal removed");
        Ok((name, id))
    }

    /// Flattened list rows, genders rendered in this deployment's tokens.
    pub async fn list_pals(&self, name: Option<&str>, skills: &[String]) -> PalResult<Vec<PalDto>> {
        let (stored, species) = tokio::try_join!(self.stored(), self.species())?;
        let mut rows = to_presentation_dto(&stored, &species);
        for row in &mut rows {
            row.gender = self.gender_domain.display(&row.gender);
        }
        Ok(filter_pals(rows, name, skills))
    }

    // ── Bulk data ────────────────────────────────────────────────────

    /// Replace all four nodes from an uploaded snapshot. Catalog entries
    /// are normalised to the in-process shape, stored pals to the
    /// capitalised store shape.
    pub async fn import(&self, snapshot: DataSnapshot) -> PalResult<CollectionCounts> {
        let species = read_species(&snapshot.pals);
        let traits = read_traits(&snapshot.passive_skills);
        let combos = read_trait_combos(&snapshot.passive_skill_combos);
        let stored = read_collection(&snapshot.stored_pals);

        if !is_well_formed(&stored) {
            tracing::warn!("Imported stored pals have gaps in their ids or empty species");
        }

        let _guard = self.write_lock.lock().await;
        self.write_node(StorePath::Species, &serde_json::to_value(&species)?)
            .await?;
        self.write_node(StorePath::Traits, &serde_json::to_value(&traits)?)
            .await?;
        self.write_node(StorePath::TraitCombos, &serde_json::to_value(&combos)?)
            .await?;
        self.save_stored(&stored).await?;

        let counts = CollectionCounts {
            pals: species.len(),
            passive_skills: traits.len(),
            passive_skill_combos: combos.len(),
            stored_pals: stored.len(),
        };
        metrics::IMPORTS_TOTAL.inc();
        tracing::info!(?counts, "Data imported");
        Ok(counts)
    }

    pub async fn counts(&self) -> PalResult<CollectionCounts> {
        let (species, traits, combos, stored) = tokio::try_join!(
            self.species(),
            self.traits(),
            self.trait_combos(),
            self.stored()
        )?;
        Ok(CollectionCounts {
            pals: species.len(),
            passive_skills: traits.len(),
            passive_skill_combos: combos.len(),
            stored_pals: stored.len(),
        })
    }

    /// True when no species catalog has been written yet.
    pub async fn is_empty(&self) -> PalResult<bool> {
        Ok(self.gateway.read(StorePath::Species).await?.is_none())
    }
}

fn rejected(op: &str, err: &PalError) {
    metrics::VALIDATION_FAILURES_TOTAL
        .with_label_values(&[err.kind()])
        .inc();
    tracing::warn!(op, "Rejected: {err}");
}
