use std::collections::HashMap;

/// First-occurrence-wins tracker for a region's natural key within one run
#[derive(Debug, Default)]
pub struct DuplicateTracker {
    first_seen: HashMap<String, usize>,
    duplicates: usize,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` for the record at `index`. Returns the index of the
    /// earlier record when `key` was already seen.
    pub fn check(&mut self, key: &str, index: usize) -> Option<usize> {
        match self.first_seen.get(key) {
            Some(&first) => {
                self.duplicates += 1;
                Some(first)
            }
            None => {
                self.first_seen.insert(key.to_string(), index);
                None
            }
        }
    }

    #[cfg(test)]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Hands out `Estación de {Locality}` names, numbering repeats per locality
#[derive(Debug, Default)]
pub struct StationNamer {
    per_locality: HashMap<String, usize>,
}

impl StationNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self, locality: &str) -> String {
        let count = self.per_locality.entry(locality.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            format!("Estación de {}", locality)
        } else {
            format!("Estación de {} {}", locality, count)
        }
    }
}

pub fn station_description(name: &str, locality: &str, province: &str) -> String {
    format!(
        "Estación de ITV {} ubicada en {} ({}).",
        name, locality, province
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let mut tracker = DuplicateTracker::new();
        assert_eq!(tracker.check("4610", 1), None);
        assert_eq!(tracker.check("4611", 2), None);
        assert_eq!(tracker.check("4610", 3), Some(1));
        assert_eq!(tracker.check("4610", 4), Some(1));
        assert_eq!(tracker.duplicates(), 2);
    }

    #[test]
    fn test_station_names_are_numbered_per_locality() {
        let mut namer = StationNamer::new();
        assert_eq!(namer.next_name("Vigo"), "Estación de Vigo");
        assert_eq!(namer.next_name("Lugo"), "Estación de Lugo");
        assert_eq!(namer.next_name("Vigo"), "Estación de Vigo 2");
        assert_eq!(namer.next_name("Vigo"), "Estación de Vigo 3");
    }

    #[test]
    fn test_station_description() {
        assert_eq!(
            station_description("Estación de Vigo", "Vigo", "Pontevedra"),
            "Estación de ITV Estación de Vigo ubicada en Vigo (Pontevedra)."
        );
    }
}
