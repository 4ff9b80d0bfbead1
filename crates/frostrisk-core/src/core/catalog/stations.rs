use crate::core::utils::geometry::great_circle_km;
use phf::{Map, phf_map};
use std::cmp::Ordering;

/// Known Norwegian Arctic climate stations: id → (name, latitude, longitude).
static ARCTIC_STATIONS: Map<&'static str, (&'static str, f64, f64)> = phf_map! {
    "SN90450" => ("Tromsø", 69.679, 18.940),
    "SN94280" => ("Hammerfest", 70.680, 23.668),
    "SN98550" => ("Vardø", 70.373, 31.103),
    "SN99710" => ("Bjørnøya", 74.518, 19.012),
    "SN93140" => ("Alta", 69.976, 23.371),
    "SN99370" => ("Kirkenes", 69.725, 29.891),
    "SN95350" => ("Banak", 70.069, 24.967),
    "SN84701" => ("Narvik", 68.439, 17.427),
    "SN82310" => ("Bodø", 67.267, 14.365),
};

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// An immutable set of station positions, injected into the weather provider.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    /// The built-in catalog of Norwegian Arctic stations.
    pub fn default_arctic() -> Self {
        Self::from_stations(
            ARCTIC_STATIONS
                .entries()
                .map(|(id, (name, lat, lon))| Station {
                    id: id.to_string(),
                    name: name.to_string(),
                    latitude: *lat,
                    longitude: *lon,
                })
                .collect(),
        )
    }

    /// Builds a catalog from explicit stations. Stations are kept sorted by id so that
    /// nearest-station ties always resolve the same way.
    pub fn from_stations(mut stations: Vec<Station>) -> Self {
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        stations.dedup_by(|a, b| a.id == b.id);
        Self { stations }
    }

    pub fn get(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The closest station to a coordinate and its great-circle distance in kilometres.
    pub fn nearest(&self, latitude: f64, longitude: f64) -> Option<(&Station, f64)> {
        closest(self.stations.iter(), latitude, longitude)
    }

    /// Like [`nearest`](Self::nearest), restricted to the stations at `indices`.
    pub fn nearest_among(
        &self,
        indices: &[usize],
        latitude: f64,
        longitude: f64,
    ) -> Option<(&Station, f64)> {
        closest(
            indices.iter().filter_map(|&i| self.stations.get(i)),
            latitude,
            longitude,
        )
    }

    /// Indices of the stations within `radius_km` of a coordinate, in catalog order.
    pub fn indices_within(&self, latitude: f64, longitude: f64, radius_km: f64) -> Vec<usize> {
        self.stations
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                great_circle_km(latitude, longitude, s.latitude, s.longitude) <= radius_km
            })
            .map(|(i, _)| i)
            .collect()
    }
}

// First minimum wins, so catalog order breaks ties.
fn closest<'a>(
    stations: impl Iterator<Item = &'a Station>,
    latitude: f64,
    longitude: f64,
) -> Option<(&'a Station, f64)> {
    stations
        .map(|s| {
            let distance = great_circle_km(latitude, longitude, s.latitude, s.longitude);
            (s, distance)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}
