use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::features::normalization::models::{
    CoordinateSource, NormalizedRecord, RecordRejection, RegionProfile,
};
use crate::features::normalization::services::coordinates::{
    extract_coordinates, CoordinateOutcome,
};
use crate::features::normalization::services::municipalities::municipality_centroid;
use crate::features::normalization::services::postal::{normalize_postal_code, PostalCode};
use crate::features::normalization::services::province::resolve_province;
use crate::features::normalization::services::station_type::classify_station_type;
use crate::features::regions::models::{field_text, RawRecord, Region};
use crate::shared::constants::{DEFAULT_CONTACT, DEFAULT_SCHEDULE};
use crate::shared::text::title_case;
use crate::shared::validation::EMAIL_REGEX;

lazy_static! {
    static ref CATALAN_SCHEDULE_WORDS: Regex = Regex::new(
        r"(?i)\b(dilluns|dimarts|dimecres|dijous|divendres|dissabte|diumenge|festius|tancat)\b"
    )
    .unwrap();
}

fn translate_catalan_schedule(text: &str) -> String {
    CATALAN_SCHEDULE_WORDS
        .replace_all(text, |caps: &Captures| {
            match caps[1].to_lowercase().as_str() {
                "dilluns" => "Lunes",
                "dimarts" => "Martes",
                "dimecres" => "Miércoles",
                "dijous" => "Jueves",
                "divendres" => "Viernes",
                "dissabte" => "Sábado",
                "diumenge" => "Domingo",
                "festius" => "festivos",
                _ => "cerrado",
            }
            .to_string()
        })
        .into_owned()
}

/// Maps raw records of one region onto canonical station fields
#[derive(Debug, Clone, Copy)]
pub struct FieldNormalizer {
    profile: &'static RegionProfile,
}

impl FieldNormalizer {
    pub fn new(region: Region) -> Self {
        Self {
            profile: RegionProfile::for_region(region),
        }
    }

    pub fn profile(&self) -> &'static RegionProfile {
        self.profile
    }

    /// The region's duplicate-detection key, if the record carries one
    pub fn natural_key(&self, record: &RawRecord) -> Option<String> {
        let key = field_text(record, self.profile.fields.natural_key);
        (!key.is_empty() && key != "N/A").then_some(key)
    }

    /// Normalize the record at 1-based `index`.
    ///
    /// Unmapped provinces, empty localities and (where required) a missing
    /// natural key reject the record. A bad postal code or coordinate only
    /// blanks that field and is reported as an issue.
    pub fn normalize(
        &self,
        index: usize,
        record: &RawRecord,
    ) -> Result<NormalizedRecord, RecordRejection> {
        let profile = self.profile;
        let fields = &profile.fields;
        let reject = |reason: String| RecordRejection { index, reason };

        let raw_province = field_text(record, fields.province);
        if raw_province.is_empty() {
            return Err(reject("province is empty".to_string()));
        }
        let province = resolve_province(profile, &raw_province).ok_or_else(|| {
            reject(format!(
                "province '{}' is not a province of {}",
                raw_province,
                profile.region.display_name()
            ))
        })?;

        let locality = title_case(&field_text(record, fields.locality));
        if locality.is_empty() {
            return Err(reject("locality is empty".to_string()));
        }

        let natural_key = self.natural_key(record);
        if profile.requires_natural_key && natural_key.is_none() {
            return Err(reject("station number is missing".to_string()));
        }

        let station_type = classify_station_type(
            &field_text(record, fields.station_type),
            &fields
                .type_hints
                .iter()
                .map(|key| field_text(record, &[*key]))
                .collect::<Vec<_>>(),
        );

        let schedule = match field_text(record, fields.schedule) {
            s if s.is_empty() => DEFAULT_SCHEDULE.to_string(),
            s if profile.catalan_schedule => translate_catalan_schedule(&s),
            s => s,
        };

        let url = match profile.fixed_url {
            Some(url) => url.to_string(),
            None => field_text(record, fields.url),
        };

        let raw_postal_code = field_text(record, fields.postal_code);

        let mut normalized = NormalizedRecord {
            index,
            region: profile.region,
            natural_key,
            province: province.canonical.to_string(),
            raw_province,
            locality,
            address: field_text(record, fields.address),
            postal_code: String::new(),
            raw_postal_code: raw_postal_code.clone(),
            coordinates: None,
            coordinate_source: CoordinateSource::None,
            station_type,
            schedule,
            contact: DEFAULT_CONTACT.to_string(),
            url,
            issues: Vec::new(),
        };

        match normalize_postal_code(&raw_postal_code, province) {
            PostalCode::Valid(code) => {
                if code != raw_postal_code {
                    normalized.repair(
                        "postal_code",
                        format!("postal code '{}' padded to '{}'", raw_postal_code, code),
                    );
                }
                normalized.postal_code = code;
            }
            PostalCode::Invalid(reason) => normalized.repair("postal_code", reason),
            PostalCode::Missing => {}
        }

        match extract_coordinates(record, profile) {
            CoordinateOutcome::Found(coords) => {
                normalized.coordinates = Some(coords);
                normalized.coordinate_source = CoordinateSource::Source;
            }
            outcome => {
                if let CoordinateOutcome::Rejected(reason) = outcome {
                    normalized.repair("coordinates", reason);
                }
                if let Some(coords) = municipality_centroid(profile.region, &normalized.locality) {
                    normalized.coordinates = Some(coords);
                    normalized.coordinate_source = CoordinateSource::MunicipalityTable;
                    normalized.repair(
                        "coordinates",
                        format!("using centroid of {}", normalized.locality),
                    );
                }
            }
        }

        let contact = self.contact(record, &mut normalized);
        normalized.contact = contact;

        Ok(normalized)
    }

    /// Phone first where the source has one, then a valid email, else `N/A`
    fn contact(&self, record: &RawRecord, normalized: &mut NormalizedRecord) -> String {
        let fields = &self.profile.fields;

        let phone = field_text(record, fields.phone);
        if !phone.is_empty() {
            return phone;
        }

        let email = field_text(record, fields.email);
        if email.is_empty() {
            return DEFAULT_CONTACT.to_string();
        }
        if EMAIL_REGEX.is_match(&email) {
            return email;
        }

        normalized.repair("contact", format!("'{}' is not a valid email", email));
        DEFAULT_CONTACT.to_string()
    }
}
