use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// One of the three independent station sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Catalonia, XML source
    Cat,
    /// Galicia, CSV source
    Gal,
    /// Valencian Community, JSON source
    Cv,
}

/// File format a region publishes its listing in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xml,
    Csv,
    Json,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Cat, Region::Gal, Region::Cv];

    pub fn slug(&self) -> &'static str {
        match self {
            Region::Cat => "cat",
            Region::Gal => "gal",
            Region::Cv => "cv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Cat => "Catalunya",
            Region::Gal => "Galicia",
            Region::Cv => "Comunitat Valenciana",
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            Region::Cat => SourceFormat::Xml,
            Region::Gal => SourceFormat::Csv,
            Region::Cv => SourceFormat::Json,
        }
    }
}

impl SourceFormat {
    /// Lower-case name used in health payload keys (`xml_exists`, ...)
    #[cfg(test)]
    pub fn key(&self) -> &'static str {
        match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Region {
    type Err = String;

    /// Accepts the slug plus the spellings the upload form uses
    /// ("Catalunya", "GAL (Galicia)", "Comunidad Valenciana", ...)
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded = crate::shared::text::fold(value);
        let head = folded
            .split(|c: char| !c.is_alphanumeric())
            .find(|s| !s.is_empty())
            .unwrap_or("");

        match head {
            "cat" | "catalunya" | "cataluna" | "catalonia" => Ok(Region::Cat),
            "gal" | "galicia" => Ok(Region::Gal),
            "cv" | "comunitat" | "comunidad" | "valencia" | "valenciana" => Ok(Region::Cv),
            _ => Err(format!("Unknown region '{}'", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_str() {
        assert_eq!("cat".parse::<Region>(), Ok(Region::Cat));
        assert_eq!("GAL (Galicia)".parse::<Region>(), Ok(Region::Gal));
        assert_eq!("Comunidad Valenciana".parse::<Region>(), Ok(Region::Cv));
        assert_eq!("Cataluña".parse::<Region>(), Ok(Region::Cat));
        assert!("madrid".parse::<Region>().is_err());
        assert!("".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_formats() {
        assert_eq!(Region::Cat.format().key(), "xml");
        assert_eq!(Region::Gal.format().key(), "csv");
        assert_eq!(Region::Cv.format().key(), "json");
    }
}
