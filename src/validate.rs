// Request validation against the species and passive skill catalogs.
//
// Nothing here touches the store; failures come back as values so the
// caller picks the transport status.

use crate::catalog::{find_species, find_trait};
use crate::error::{PalError, PalResult};
use crate::models::{AddPalRequest, GenderDomain, NewPal, RemovePalRequest, Species, Trait};

pub fn is_valid_species_name(catalog: &[Species], name: &str) -> bool {
    find_species(catalog, name).is_some()
}

pub fn is_valid_gender(domain: GenderDomain, token: &str) -> bool {
    domain.parse(token).is_some()
}

/// Check every name in order and return the first one the catalog lacks.
pub fn validate_traits<'a>(catalog: &[Trait], names: &'a [String]) -> Result<(), &'a str> {
    match names.iter().find(|n| find_trait(catalog, n).is_none()) {
        Some(bad) => Err(bad.as_str()),
        None => Ok(()),
    }
}

/// Validate an add request end to end: required fields, then species,
/// gender and passive skills, in that order.
pub fn validate_add_request(
    species: &[Species],
    traits: &[Trait],
    domain: GenderDomain,
    req: AddPalRequest,
) -> PalResult<NewPal> {
    let (name, gender_token, skills) = match (req.name, req.gender, req.passive_skills) {
        (Some(n), Some(g), Some(s)) if !n.is_empty() && !g.is_empty() => (n, g, s),
        _ => {
            return Err(PalError::InvalidInput(
                "Missing required fields: name, gender, passive_skills".into(),
            ))
        }
    };

    if !is_valid_species_name(species, &name) {
        return Err(PalError::UnknownSpecies(name));
    }

    let gender = domain.parse(&gender_token).ok_or(PalError::InvalidGender {
        token: gender_token.clone(),
        expected: domain.expected(),
    })?;

    validate_traits(traits, &skills).map_err(|bad| PalError::UnknownTrait(bad.to_string()))?;

    Ok(NewPal {
        species: name,
        gender,
        traits: skills,
    })
}

/// A remove request needs a non-empty name and a non-zero id.
pub fn validate_remove_request(req: RemovePalRequest) -> PalResult<(String, u32)> {
    match (req.name, req.id) {
        (Some(name), Some(id)) if !name.is_empty() && id > 0 => Ok((name, id)),
        _ => Err(PalError::InvalidInput("Name and id are required".into())),
    }
}
