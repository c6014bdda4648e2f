use crate::features::stations::models::StationType;
use crate::shared::text::fold;

/// Folded keywords that mark a mobile unit (agricultural units travel too)
const MOBILE_KEYWORDS: [&str; 4] = ["movil", "mobil", "mobile", "agricola"];
const FIXED_KEYWORDS: [&str; 3] = ["fija", "fixa", "fixed"];

fn has_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Station type from an explicit source field, falling back to keywords in
/// the record's free text. Anything undecided is a fixed station.
pub fn classify_station_type(explicit: &str, hints: &[String]) -> StationType {
    let explicit = fold(explicit);
    if has_any(&explicit, &MOBILE_KEYWORDS) {
        return StationType::Mobile;
    }
    if has_any(&explicit, &FIXED_KEYWORDS) {
        return StationType::Fixed;
    }

    if hints.iter().any(|h| has_any(&fold(h), &MOBILE_KEYWORDS)) {
        StationType::Mobile
    } else {
        StationType::Fixed
    }
}
