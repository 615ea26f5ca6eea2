// Read-only lookups over the species and passive skill catalogs.

use crate::models::{Species, Trait};

/// Case-insensitive name comparison used by every catalog and store lookup.
pub fn names_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub fn find_species<'a>(catalog: &'a [Species], name: &str) -> Option<&'a Species> {
    catalog.iter().find(|s| names_match(&s.name, name))
}

pub fn find_trait<'a>(catalog: &'a [Trait], name: &str) -> Option<&'a Trait> {
    catalog.iter().find(|t| names_match(&t.name, name))
}

pub fn species_names(catalog: &[Species]) -> Vec<String> {
    catalog.iter().map(|s| s.name.clone()).collect()
}

pub fn trait_names(catalog: &[Trait]) -> Vec<String> {
    catalog.iter().map(|t| t.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paldex() -> Vec<Species> {
        ["Lamball", "Cattiva", "Foxparks"]
            .iter()
            .map(|n| Species {
                name: n.to_string(),
                image_url: format!("https://img/{}.png", n.to_lowercase()),
                ..Default::default()
            })
            .collect()
    }

    fn skills() -> Vec<Trait> {
        vec![
            Trait {
                name: "Swift".into(),
                effect: "+30% movement speed".into(),
                tier: 3,
            },
            Trait {
                name: "Lucky".into(),
                effect: "+15% attack".into(),
                tier: 3,
            },
        ]
    }

    #[test]
    fn test_find_species_any_case() {
        let catalog = paldex();
        for query in ["foxparks", "FOXPARKS", "FoXpArKs", "Foxparks"] {
            let found = find_species(&catalog, query).unwrap();
            assert_eq!(found.name, "Foxparks");
        }
    }

    #[test]
    fn test_find_species_missing() {
        assert!(find_species(&paldex(), "Pikachu").is_none());
        assert!(find_species(&[], "Lamball").is_none());
    }

    #[test]
    fn test_find_trait_any_case() {
        let catalog = skills();
        assert_eq!(find_trait(&catalog, "sWIFT").unwrap().tier, 3);
        assert!(find_trait(&catalog, "Swiftly").is_none());
    }

    #[test]
    fn test_name_listings_keep_catalog_order() {
        assert_eq!(species_names(&paldex()), vec!["Lamball", "Cattiva", "Foxparks"]);
        assert_eq!(trait_names(&skills()), vec!["Swift", "Lucky"]);
    }
}
