use super::{HeaderIndex, LoadError, cell, display_path, parse_year};
use crate::core::utils::identifiers::normalize_identifier;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Authoritative attributes for one dam. Absent cells leave the population value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistryEntry {
    pub id: String,
    pub purpose: Option<String>,
    pub construction_year: Option<i32>,
    pub owner: Option<String>,
}

/// The national dam registry keyed by normalised identifier.
pub type AuthoritativeRegistry = BTreeMap<String, RegistryEntry>;

pub fn load_registry(path: &Path) -> Result<AuthoritativeRegistry, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: display_path(path),
        source: e,
    })?;
    read_registry(file, &display_path(path))
}

pub fn read_registry(reader: impl Read, source: &str) -> Result<AuthoritativeRegistry, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(|e| LoadError::Csv {
        path: source.to_string(),
        source: e,
    })?;
    let index = HeaderIndex::new(headers);
    let id_col = index.require(&["id", "dam_id", "damnr", "dam_nr"], "id", source)?;
    let purpose_col = index.find(&["purpose", "formal"]);
    let year_col = index.find(&["construction_year", "year", "byggear"]);
    let owner_col = index.find(&["owner", "owner_type", "eier"]);

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let mut registry = AuthoritativeRegistry::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| LoadError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        let id = normalize_identifier(cell(&record, Some(id_col)));
        if id.is_empty() {
            continue;
        }
        let entry = RegistryEntry {
            id: id.clone(),
            purpose: non_empty(cell(&record, purpose_col)),
            construction_year: parse_year(cell(&record, year_col)),
            owner: non_empty(cell(&record, owner_col)),
        };
        registry.insert(id, entry);
    }
    Ok(registry)
}
