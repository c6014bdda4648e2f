use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Canonical Spanish postal code: exactly five digits
    /// - Valid: "08015", "46014"
    /// - Invalid: "8015", "080150", "08 015"
    pub static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^\d{5}$").unwrap();

    /// Loose email shape check used for station contacts
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    /// Degree + decimal minutes component, e.g. "43° 18.856'" or "-8° 17.165'"
    pub static ref DEGREE_MINUTES_REGEX: Regex =
        Regex::new(r"^\s*([+-]?\d+)[^\d.]+(\d+(?:\.\d+)?)").unwrap();

    /// Well-known-text point, e.g. "POINT(-0.376 39.469)"
    pub static ref WKT_POINT_REGEX: Regex = Regex::new(
        r"(?i)^\s*POINT\s*\(\s*([+-]?\d+(?:\.\d+)?)\s+([+-]?\d+(?:\.\d+)?)\s*\)\s*$"
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_code_regex() {
        assert!(POSTAL_CODE_REGEX.is_match("08015"));
        assert!(POSTAL_CODE_REGEX.is_match("46014"));
        assert!(!POSTAL_CODE_REGEX.is_match("8015"));
        assert!(!POSTAL_CODE_REGEX.is_match("080150"));
        assert!(!POSTAL_CODE_REGEX.is_match("08 015"));
        assert!(!POSTAL_CODE_REGEX.is_match(""));
    }

    #[test]
    fn test_email_regex() {
        assert!(EMAIL_REGEX.is_match("itv@applus.com"));
        assert!(EMAIL_REGEX.is_match("cita.previa@sitval.es"));
        assert!(!EMAIL_REGEX.is_match("93 123 45 67"));
        assert!(!EMAIL_REGEX.is_match("itv@localhost"));
    }

    #[test]
    fn test_wkt_point_regex() {
        let caps = WKT_POINT_REGEX.captures("POINT(413028 2175842)").unwrap();
        assert_eq!(&caps[1], "413028");
        assert_eq!(&caps[2], "2175842");
        assert!(WKT_POINT_REGEX.is_match("point ( -0.37 39.46 )"));
        assert!(!WKT_POINT_REGEX.is_match("POINT(1)"));
    }
}
