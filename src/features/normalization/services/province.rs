use crate::features::normalization::models::{ProvinceRule, RegionProfile};
use crate::shared::text::fold;

/// Map a published province name onto the region's canonical province.
///
/// Matching is exact on the folded form, so `"VALÈNCIA"`, `"Valencia"` and
/// `"valencia"` all resolve while `"Valencia city"` does not.
pub fn resolve_province(profile: &RegionProfile, raw: &str) -> Option<&'static ProvinceRule> {
    let folded = fold(raw);
    if folded.is_empty() {
        return None;
    }
    profile
        .provinces
        .iter()
        .find(|rule| rule.aliases.iter().any(|alias| *alias == folded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::regions::models::Region;

    fn canonical(region: Region, raw: &str) -> Option<&'static str> {
        resolve_province(RegionProfile::for_region(region), raw).map(|r| r.canonical)
    }

    #[test]
    fn test_galician_aliases() {
        for raw in [
            "A Coruña",
            "la coruña",
            "A CORUNA",
            "La Coruna",
            "Coruña",
            " coruna ",
        ] {
            assert_eq!(canonical(Region::Gal, raw), Some("A Coruña"), "{raw}");
        }
        assert_eq!(canonical(Region::Gal, "Orense"), Some("Ourense"));
        assert_eq!(canonical(Region::Gal, "LUGO"), Some("Lugo"));
        assert_eq!(canonical(Region::Gal, "Pontevedra"), Some("Pontevedra"));
        assert_eq!(canonical(Region::Gal, "Barcelona"), None);
    }

    #[test]
    fn test_catalan_aliases() {
        assert_eq!(canonical(Region::Cat, "Gerona"), Some("Girona"));
        assert_eq!(canonical(Region::Cat, "LÉRIDA"), Some("Lleida"));
        assert_eq!(canonical(Region::Cat, "Tarragona"), Some("Tarragona"));
        assert_eq!(canonical(Region::Cat, "Terres de l'Ebre"), None);
    }

    #[test]
    fn test_valencian_aliases() {
        for raw in ["Castellón", "CASTELLO", "Castelló", "Castellón de la Plana"] {
            assert_eq!(canonical(Region::Cv, raw), Some("Castellón"), "{raw}");
        }
        assert_eq!(canonical(Region::Cv, "València"), Some("Valencia"));
        assert_eq!(canonical(Region::Cv, "Alacant"), Some("Alicante"));
        assert_eq!(canonical(Region::Cv, ""), None);
        assert_eq!(canonical(Region::Cv, "Murcia"), None);
    }
}
