use super::error::EngineError;
use crate::core::catalog::stations::StationCatalog;
use crate::core::climate::projection::ClimateProjector;
use crate::core::io::dams::{RawDamRow, load_dams};
use crate::core::io::projections::load_projections;
use crate::core::io::registry::{AuthoritativeRegistry, load_registry};
use crate::core::io::stations::{StationSeries, load_station_catalog, load_station_series_files};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Where each input table lives. Only the dam population is mandatory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputPaths {
    pub dams: PathBuf,
    pub registry: Option<PathBuf>,
    pub weather: Vec<PathBuf>,
    pub stations: Option<PathBuf>,
    pub projections: Option<PathBuf>,
}

/// Everything the batch reads, loaded once before any dam is assessed.
#[derive(Debug, Clone)]
pub struct AssessmentInputs {
    pub dams: Vec<RawDamRow>,
    pub registry: Option<AuthoritativeRegistry>,
    pub catalog: StationCatalog,
    pub series: StationSeries,
    pub projector: ClimateProjector,
}

impl AssessmentInputs {
    /// In-memory inputs with the built-in station catalog and projection table.
    pub fn new(dams: Vec<RawDamRow>) -> Self {
        Self {
            dams,
            registry: None,
            catalog: StationCatalog::default_arctic(),
            series: StationSeries::new(),
            projector: ClimateProjector::builtin(),
        }
    }

    /// Loads every configured table. Any table that cannot be parsed at all is fatal.
    #[instrument(skip_all, name = "load_inputs")]
    pub fn load(paths: &InputPaths) -> Result<Self, EngineError> {
        let dams = load_dams(&paths.dams).map_err(|source| EngineError::MalformedInput {
            what: "dam population",
            source,
        })?;

        let registry = paths
            .registry
            .as_deref()
            .map(load_registry)
            .transpose()
            .map_err(|source| EngineError::MalformedInput {
                what: "authoritative registry",
                source,
            })?;

        let catalog = match paths.stations.as_deref() {
            Some(path) => {
                load_station_catalog(path).map_err(|source| EngineError::MalformedInput {
                    what: "station catalog",
                    source,
                })?
            }
            None => StationCatalog::default_arctic(),
        };

        let series = if paths.weather.is_empty() {
            StationSeries::new()
        } else {
            load_station_series_files(&paths.weather).map_err(|source| {
                EngineError::MalformedInput {
                    what: "weather station series",
                    source,
                }
            })?
        };

        let projector = match paths.projections.as_deref() {
            Some(path) => ClimateProjector::from_entries(load_projections(path).map_err(
                |source| EngineError::MalformedInput {
                    what: "climate projection table",
                    source,
                },
            )?),
            None => ClimateProjector::builtin(),
        };

        info!(
            dams = dams.len(),
            registry = registry.as_ref().map_or(0, |r| r.len()),
            stations = catalog.len(),
            series = series.len(),
            scenarios = projector.scenarios().len(),
            "Inputs loaded."
        );
        Ok(Self {
            dams,
            registry,
            catalog,
            series,
            projector,
        })
    }
}
