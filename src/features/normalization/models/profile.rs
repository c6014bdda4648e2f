use crate::features::regions::models::Region;

/// A canonical province, the spellings that map to it and its postal prefixes
#[derive(Debug)]
pub struct ProvinceRule {
    pub canonical: &'static str,
    /// Folded (accent-free, lower-case) spellings
    pub aliases: &'static [&'static str],
    pub postal_prefixes: &'static [&'static str],
}

/// Inclusive latitude/longitude box a region's coordinates must fall in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Ways a source encodes a station's position, tried in profile order
#[derive(Debug)]
pub enum CoordinateEncoding {
    /// Integer micro-degrees in two fields; small values are already degrees
    MicroDegrees {
        lat: &'static [&'static str],
        lon: &'static [&'static str],
    },
    /// `"43° 18.856', -8° 17.165'"` in one field
    DegreeMinutes(&'static [&'static str]),
    /// `POINT(x y)` with unknown axis order and scale
    WktPoint(&'static [&'static str]),
    /// Plain decimal degrees in two fields
    Decimal {
        lat: &'static [&'static str],
        lon: &'static [&'static str],
    },
}

/// Where each canonical field is read from
#[derive(Debug)]
pub struct FieldKeys {
    pub province: &'static [&'static str],
    pub locality: &'static [&'static str],
    pub address: &'static [&'static str],
    pub postal_code: &'static [&'static str],
    pub schedule: &'static [&'static str],
    pub email: &'static [&'static str],
    pub phone: &'static [&'static str],
    pub url: &'static [&'static str],
    pub natural_key: &'static [&'static str],
    pub station_type: &'static [&'static str],
    /// Free text scanned for type keywords when no explicit type is given
    pub type_hints: &'static [&'static str],
}

/// Everything region-specific the field normalizer needs
#[derive(Debug)]
pub struct RegionProfile {
    pub region: Region,
    pub provinces: &'static [ProvinceRule],
    pub bounds: BoundingBox,
    pub fields: FieldKeys,
    pub coordinates: &'static [CoordinateEncoding],
    /// Fixed booking URL used instead of a source field
    pub fixed_url: Option<&'static str>,
    /// Schedules are published in Catalan
    pub catalan_schedule: bool,
    /// Localities are looked up by `(name, province)` rather than by name
    pub locality_scoped_by_province: bool,
    /// A record without a natural key is rejected
    pub requires_natural_key: bool,
}

impl RegionProfile {
    pub fn for_region(region: Region) -> &'static RegionProfile {
        match region {
            Region::Cat => &CAT_PROFILE,
            Region::Gal => &GAL_PROFILE,
            Region::Cv => &CV_PROFILE,
        }
    }
}

// =============================================================================
// CATALONIA
// =============================================================================

static CAT_PROVINCES: [ProvinceRule; 4] = [
    ProvinceRule {
        canonical: "Barcelona",
        aliases: &["barcelona"],
        postal_prefixes: &["08"],
    },
    ProvinceRule {
        canonical: "Girona",
        aliases: &["girona", "gerona"],
        postal_prefixes: &["17"],
    },
    ProvinceRule {
        canonical: "Lleida",
        aliases: &["lleida", "lerida"],
        postal_prefixes: &["25"],
    },
    ProvinceRule {
        canonical: "Tarragona",
        aliases: &["tarragona"],
        postal_prefixes: &["43"],
    },
];

static CAT_COORDINATES: [CoordinateEncoding; 2] = [
    CoordinateEncoding::MicroDegrees {
        lat: &["lat"],
        lon: &["long", "lon"],
    },
    CoordinateEncoding::WktPoint(&["geocoded_column", "localitzacio"]),
];

static CAT_PROFILE: RegionProfile = RegionProfile {
    region: Region::Cat,
    provinces: &CAT_PROVINCES,
    bounds: BoundingBox {
        min_lat: 40.5,
        max_lat: 42.9,
        min_lon: 0.1,
        max_lon: 3.4,
    },
    fields: FieldKeys {
        province: &["serveis_territorials"],
        locality: &["municipi"],
        address: &["adre_a"],
        postal_code: &["cp"],
        schedule: &["horari_de_servei"],
        email: &["correu_electr_nic"],
        phone: &["tel_atenc_public"],
        url: &["web"],
        natural_key: &["estaci"],
        station_type: &["tipus"],
        type_hints: &["estaci", "operador"],
    },
    coordinates: &CAT_COORDINATES,
    fixed_url: None,
    catalan_schedule: true,
    locality_scoped_by_province: false,
    requires_natural_key: false,
};

// =============================================================================
// GALICIA
// =============================================================================

static GAL_PROVINCES: [ProvinceRule; 4] = [
    ProvinceRule {
        canonical: "A Coruña",
        aliases: &["a coruna", "la coruna", "coruna"],
        postal_prefixes: &["15"],
    },
    ProvinceRule {
        canonical: "Lugo",
        aliases: &["lugo"],
        postal_prefixes: &["27"],
    },
    ProvinceRule {
        canonical: "Ourense",
        aliases: &["ourense", "orense"],
        postal_prefixes: &["32"],
    },
    ProvinceRule {
        canonical: "Pontevedra",
        aliases: &["pontevedra"],
        postal_prefixes: &["36"],
    },
];

static GAL_COORDINATES: [CoordinateEncoding; 2] = [
    CoordinateEncoding::DegreeMinutes(&["COORDENADAS GMAPS"]),
    CoordinateEncoding::WktPoint(&["COORDENADAS GMAPS"]),
];

static GAL_PROFILE: RegionProfile = RegionProfile {
    region: Region::Gal,
    provinces: &GAL_PROVINCES,
    bounds: BoundingBox {
        min_lat: 41.8,
        max_lat: 43.9,
        min_lon: -9.4,
        max_lon: -6.7,
    },
    fields: FieldKeys {
        province: &["PROVINCIA"],
        locality: &["CONCELLO"],
        address: &["ENDEREZO"],
        postal_code: &["CÓDIGO POSTAL", "CODIGO POSTAL"],
        schedule: &["HORARIO"],
        email: &["CORREO ELECTRÓNICO", "CORREO ELECTRONICO"],
        phone: &[],
        url: &["SOLICITUDE DE CITA PREVIA"],
        natural_key: &["NOME DA ESTACIÓN", "NOME DA ESTACION"],
        station_type: &["TIPO"],
        type_hints: &["NOME DA ESTACIÓN"],
    },
    coordinates: &GAL_COORDINATES,
    fixed_url: None,
    catalan_schedule: false,
    locality_scoped_by_province: false,
    requires_natural_key: false,
};

// =============================================================================
// VALENCIAN COMMUNITY
// =============================================================================

static CV_PROVINCES: [ProvinceRule; 3] = [
    ProvinceRule {
        canonical: "Castellón",
        aliases: &["castellon", "castello", "castellon de la plana"],
        postal_prefixes: &["12"],
    },
    ProvinceRule {
        canonical: "Valencia",
        aliases: &["valencia"],
        postal_prefixes: &["46"],
    },
    ProvinceRule {
        canonical: "Alicante",
        aliases: &["alicante", "alacant"],
        postal_prefixes: &["03"],
    },
];

static CV_COORDINATES: [CoordinateEncoding; 2] = [
    CoordinateEncoding::Decimal {
        lat: &["LATITUD", "LATITUDE"],
        lon: &["LONGITUD", "LONGITUDE"],
    },
    CoordinateEncoding::WktPoint(&["GEOMETRIA", "COORDENADAS"]),
];

static CV_PROFILE: RegionProfile = RegionProfile {
    region: Region::Cv,
    provinces: &CV_PROVINCES,
    bounds: BoundingBox {
        min_lat: 37.8,
        max_lat: 40.8,
        min_lon: -1.6,
        max_lon: 0.7,
    },
    fields: FieldKeys {
        province: &["PROVINCIA"],
        locality: &["MUNICIPIO"],
        address: &["DIRECCIÓN", "DIRECCION"],
        postal_code: &["C.POSTAL", "C. POSTAL", "CÓDIGO POSTAL", "CODIGO POSTAL"],
        schedule: &["HORARIOS"],
        email: &["CORREO", "EMAIL"],
        phone: &[],
        url: &[],
        natural_key: &["Nº ESTACIÓN", "N. ESTACIÓN", "Nº ESTACION", "N. ESTACION"],
        station_type: &["TIPO ESTACIÓN", "TIPO ESTACION"],
        type_hints: &[],
    },
    coordinates: &CV_COORDINATES,
    fixed_url: Some(crate::shared::constants::CV_BOOKING_URL),
    catalan_schedule: false,
    locality_scoped_by_province: true,
    requires_natural_key: true,
};
