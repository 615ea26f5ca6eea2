// Pure add/remove transforms over the stored pals collection.
//
// Invariant kept by both transforms: in every species group,
// `records[k].id == k + 1`, and no group is left without records.

use crate::catalog::names_match;
use crate::models::{SpeciesGroup, StoredCollection, StoredRecord};

pub fn find_group<'a>(collection: &'a [SpeciesGroup], name: &str) -> Option<&'a SpeciesGroup> {
    collection.iter().find(|g| names_match(&g.name, name))
}

pub fn find_record<'a>(
    collection: &'a [SpeciesGroup],
    name: &str,
    id: u32,
) -> Option<&'a StoredRecord> {
    find_group(collection, name).and_then(|g| g.records.iter().find(|r| r.id == id))
}

/// Append a pal to its species group, creating the group if needed.
///
/// The new id is `records.len() + 1`, which only stays unique while
/// every removal goes through [`remove_record`].
pub fn add_record(
    collection: &[SpeciesGroup],
    species: &str,
    gender: &str,
    traits: &[String],
) -> StoredCollection {
    let mut updated = collection.to_vec();
    match updated.iter_mut().find(|g| names_match(&g.name, species)) {
        Some(group) => {
            let next_id = group.records.len() as u32 + 1;
            group
                .records
                .push(StoredRecord::new(next_id, gender, traits.to_vec()));
        }
        None => updated.push(SpeciesGroup::new(
            species,
            vec![StoredRecord::new(1, gender, traits.to_vec())],
        )),
    }
    updated
}

/// Remove one pal and renumber its later siblings. A group emptied by
/// the removal is dropped. Unknown species or id leaves the collection
/// unchanged.
pub fn remove_record(collection: &[SpeciesGroup], species: &str, id: u32) -> StoredCollection {
    let mut updated = collection.to_vec();

    let Some(group_idx) = updated.iter().position(|g| names_match(&g.name, species)) else {
        return updated;
    };
    let group = &mut updated[group_idx];
    let Some(record_idx) = group.records.iter().position(|r| r.id == id) else {
        return updated;
    };

    group.records.remove(record_idx);
    for (j, record) in group.records.iter_mut().enumerate().skip(record_idx) {
        record.id = j as u32 + 1;
    }

    if group.records.is_empty() {
        updated.remove(group_idx);
    }
    updated
}

/// True when every group is non-empty and densely numbered from 1.
pub fn is_well_formed(collection: &[SpeciesGroup]) -> bool {
    collection.iter().all(|g| {
        !g.records.is_empty()
            && g
                .records
                .iter()
                .enumerate()
                .all(|(k, r)| r.id == k as u32 + 1)
    })
}
