//! Read-only country reference list for the destination picker.
//!
//! A copy of the dataset is compiled into the crate. Loading never fails:
//! a missing or malformed source is logged and yields an empty catalog.

use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::types::Country;

const BUNDLED_COUNTRIES: &str = include_str!("../data/countries.json");

static SHARED: OnceLock<CountryCatalog> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCatalog {
    countries: Vec<Country>,
}

impl CountryCatalog {
    /// The process-wide catalog, initialized from `path` (or the bundled data
    /// when `None`) on first call. Later calls ignore `path`.
    pub fn shared(path: Option<&Path>) -> &'static CountryCatalog {
        SHARED.get_or_init(|| match path {
            Some(path) => Self::load(path),
            None => Self::bundled(),
        })
    }

    #[must_use]
    pub fn bundled() -> Self {
        Self::from_json(BUNDLED_COUNTRIES)
    }

    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "country list not readable");
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Vec<Country>>(json) {
            Ok(countries) => {
                debug!(count = countries.len(), "loaded country list");
                Self { countries }
            }
            Err(e) => {
                warn!(error = %e, "failed to decode country list");
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Lookup by ISO code, ignoring case.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|country| country.code.eq_ignore_ascii_case(code))
    }

    /// Countries whose name, code or dial code contains `query`, in catalog
    /// order. A leading `+` in the query is ignored for dial codes; an empty
    /// query returns everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Country> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.countries.iter().collect();
        }
        let dial = query.replace('+', "");
        self.countries
            .iter()
            .filter(|country| {
                country.name.to_lowercase().contains(&query)
                    || country.code.to_lowercase().contains(&query)
                    || (!dial.is_empty() && country.dial_code.contains(&dial))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_is_not_empty() {
        let catalog = CountryCatalog::bundled();
        assert!(!catalog.is_empty());
        let ng = catalog.find_by_code("ng").unwrap();
        assert_eq!(ng.name, "Nigeria");
        assert_eq!(ng.dial_code, "+234");
    }

    #[test]
    fn malformed_json_yields_empty_catalog() {
        assert!(CountryCatalog::from_json("{not json").is_empty());
        assert!(CountryCatalog::from_json(r#"[{"name":"Nowhere"}]"#).is_empty());
    }

    #[test]
    fn missing_file_yields_empty_catalog() {
        assert!(CountryCatalog::load(Path::new("/nonexistent/countries.json")).is_empty());
    }

    #[test]
    fn search_by_name_code_and_dial_code() {
        let catalog = CountryCatalog::bundled();
        let names = |q: &str| -> Vec<String> {
            catalog.search(q).into_iter().map(|c| c.name.clone()).collect()
        };
        assert_eq!(names("united k"), ["United Kingdom"]);
        assert_eq!(names("GH"), ["Ghana"]);
        assert_eq!(names("+234"), ["Nigeria"]);
        assert_eq!(catalog.search("").len(), catalog.countries().len());
    }
}
