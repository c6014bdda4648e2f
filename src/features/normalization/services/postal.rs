use crate::features::normalization::models::ProvinceRule;
use crate::shared::validation::POSTAL_CODE_REGEX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalCode {
    Valid(String),
    /// Nothing published
    Missing,
    /// Published but unusable; the field is blanked
    Invalid(String),
}

/// Validate a published postal code against the resolved province.
///
/// Four digit numbers lose their leading zero in some exports (`3001` for
/// `03001`), so they are padded before the format check.
pub fn normalize_postal_code(raw: &str, province: &ProvinceRule) -> PostalCode {
    let raw = raw.trim();
    if raw.is_empty() {
        return PostalCode::Missing;
    }

    let candidate = if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("0{}", raw)
    } else {
        raw.to_string()
    };

    if !POSTAL_CODE_REGEX.is_match(&candidate) {
        return PostalCode::Invalid(format!("postal code '{}' is not five digits", raw));
    }

    let prefix = &candidate[..2];
    if !province.postal_prefixes.contains(&prefix) {
        return PostalCode::Invalid(format!(
            "postal code '{}' does not belong to {} (expected prefix {})",
            raw,
            province.canonical,
            province.postal_prefixes.join(", ")
        ));
    }

    PostalCode::Valid(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::normalization::models::RegionProfile;
    use crate::features::normalization::services::province::resolve_province;
    use crate::features::regions::models::Region;

    fn rule(region: Region, name: &str) -> &'static ProvinceRule {
        resolve_province(RegionProfile::for_region(region), name).unwrap()
    }

    #[test]
    fn test_valid_and_padded() {
        let alicante = rule(Region::Cv, "Alicante");
        assert_eq!(
            normalize_postal_code("03001", alicante),
            PostalCode::Valid("03001".to_string())
        );
        assert_eq!(
            normalize_postal_code("3001", alicante),
            PostalCode::Valid("03001".to_string())
        );
    }

    #[test]
    fn test_prefix_mismatch_is_invalid() {
        let valencia = rule(Region::Cv, "Valencia");
        let outcome = normalize_postal_code("08015", valencia);
        assert!(matches!(outcome, PostalCode::Invalid(ref m) if m.contains("Valencia")));
    }

    #[test]
    fn test_bad_format_and_missing() {
        let lugo = rule(Region::Gal, "Lugo");
        assert_eq!(normalize_postal_code("  ", lugo), PostalCode::Missing);
        assert!(matches!(normalize_postal_code("27 003", lugo), PostalCode::Invalid(_)));
        assert!(matches!(normalize_postal_code("270030", lugo), PostalCode::Invalid(_)));
    }
}
