//! Query store
//!
//! Persists every classified location and the tide snapshot returned for it.
//! Stored as a single JSON file in the XDG data directory
//! (~/.local/share/tide-explore/tides.json) unless configured otherwise.

use crate::config::defaults::APP_DIR_NAME;
use crate::config::StorageConfig;
use crate::constants::geo::SAME_PLACE_TOLERANCE_DEG;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::region::LocationInfo;
use crate::service::TideReport;
use crate::tide::{round_cm, DataSourceKind, ForecastEvent, TidalSnapshot, TideStatus, Trend};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

const STORE_FILE_NAME: &str = "tides.json";
const MAX_TIDAL_RECORDS: usize = 1000;

/// A location that has been queried at least once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    pub region: String,
    pub country: String,
    pub area: String,
    pub locality: String,
    pub coast_distance_km: f64,
    pub query_count: u64,
    pub first_queried: NaiveDateTime,
    pub last_queried: NaiveDateTime,
}

impl LocationRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// The current tide recorded for one query, with its forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidalRecord {
    pub id: Uuid,
    pub location_id: u64,
    pub timestamp: NaiveDateTime,
    pub height_m: f64,
    pub status: TideStatus,
    pub trend: Trend,
    pub data_source: DataSourceKind,
    #[serde(default)]
    pub forecasts: Vec<ForecastEvent>,
}

/// A tidal record joined with its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub location: LocationRecord,
    pub record: TidalRecord,
}

/// Height statistics for one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub area: String,
    pub avg_height_m: f64,
    pub max_height_m: f64,
    pub min_height_m: f64,
    pub count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    next_location_id: u64,
    #[serde(default)]
    locations: Vec<LocationRecord>,
    /// Oldest first
    #[serde(default)]
    records: Vec<TidalRecord>,
}

/// File-backed store of locations and tidal records
#[derive(Debug)]
pub struct TideStore {
    data: StoreData,
    path: PathBuf,
    /// Bumped by every [`TideStore::prepare_save`]
    revision: u64,
}

/// Serialized store contents waiting to be written to disk
///
/// Produced under the store lock, written after it is released.
#[derive(Debug)]
pub struct PendingWrite {
    path: PathBuf,
    content: String,
    revision: u64,
}

impl PendingWrite {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Write the contents, creating the parent directory if needed
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("Failed to create store directory: {}", e)))?;
        }

        fs::write(&self.path, &self.content)
            .map_err(|e| Error::Store(format!("Failed to write store file: {}", e)))
    }
}

/// Serializes [`PendingWrite`]s from concurrent tasks
///
/// A write older than the last one on disk is dropped, so the file never
/// goes back to an earlier revision.
#[derive(Debug, Default)]
pub struct StoreWriter {
    written: Mutex<u64>,
}

impl StoreWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `pending` unless a newer revision already landed
    ///
    /// Returns whether the file was written.
    pub fn write(&self, pending: PendingWrite) -> Result<bool> {
        let mut written = self
            .written
            .lock()
            .map_err(|_| Error::Store("Store writer lock poisoned".to_string()))?;
        if pending.revision <= *written {
            return Ok(false);
        }
        pending.write()?;
        *written = pending.revision;
        Ok(true)
    }
}

impl TideStore {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Resolve the store path from configuration
    pub fn resolve_path(config: &StorageConfig) -> Result<PathBuf> {
        match &config.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(STORE_FILE_NAME)),
        }
    }

    /// Open the configured store
    pub fn open(config: &StorageConfig) -> Result<Self> {
        Self::load_from(Self::resolve_path(config)?)
    }

    /// Load a store from a specific path; a missing file is an empty store
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Store(format!("Failed to read store file: {}", e)))?;

            serde_json::from_str(&content)
                .map_err(|e| Error::Store(format!("Failed to parse store file: {}", e)))?
        } else {
            StoreData::default()
        };

        Ok(Self {
            data,
            path,
            revision: 0,
        })
    }

    /// Write the store to disk
    pub fn save(&mut self) -> Result<()> {
        self.prepare_save()?.write()
    }

    /// Serialize the current contents without touching the disk
    pub fn prepare_save(&mut self) -> Result<PendingWrite> {
        self.revision += 1;
        Ok(PendingWrite {
            path: self.path.clone(),
            content: serde_json::to_string_pretty(&self.data)?,
            revision: self.revision,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Record a query of a location
    ///
    /// A location within 0.01° of an existing one counts as the same place:
    /// its query count goes up and its details are refreshed.
    pub fn save_location(&mut self, info: &LocationInfo, now: NaiveDateTime) -> u64 {
        let coords = info.coordinates();

        if let Some(existing) = self
            .data
            .locations
            .iter_mut()
            .find(|l| l.coordinates().is_near(coords, SAME_PLACE_TOLERANCE_DEG))
        {
            existing.query_count += 1;
            existing.last_queried = now;
            existing.area = info.area.clone();
            existing.locality = info.locality.clone();
            existing.coast_distance_km = info.coast_distance_km;
            return existing.id;
        }

        self.data.next_location_id += 1;
        let id = self.data.next_location_id;
        self.data.locations.push(LocationRecord {
            id,
            lat: info.lat,
            lon: info.lon,
            region: info.region.clone(),
            country: info.country.clone(),
            area: info.area.clone(),
            locality: info.locality.clone(),
            coast_distance_km: info.coast_distance_km,
            query_count: 1,
            first_queried: now,
            last_queried: now,
        });
        tracing::debug!("New location {} at ({}, {})", id, info.lat, info.lon);
        id
    }

    /// Append the current tide and forecast for a location
    pub fn save_tidal_data(
        &mut self,
        location_id: u64,
        snapshot: &TidalSnapshot,
        source: DataSourceKind,
        now: NaiveDateTime,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.data.records.push(TidalRecord {
            id,
            location_id,
            timestamp: now,
            height_m: snapshot.current.height_m,
            status: snapshot.current.status,
            trend: snapshot.current.trend,
            data_source: source,
            forecasts: snapshot.forecast.clone(),
        });

        if self.data.records.len() > MAX_TIDAL_RECORDS {
            let excess = self.data.records.len() - MAX_TIDAL_RECORDS;
            self.data.records.drain(..excess);
        }
        id
    }

    /// Save a report's location and tide in one go
    pub fn record_report(&mut self, report: &TideReport, now: NaiveDateTime) -> Uuid {
        let location_id = self.save_location(&report.location, now);
        self.save_tidal_data(location_id, &report.tide, report.source, now)
    }

    pub fn location(&self, id: u64) -> Option<&LocationRecord> {
        self.data.locations.iter().find(|l| l.id == id)
    }

    /// Locations ordered by query count, most queried first
    pub fn most_queried(&self, limit: usize) -> Vec<LocationRecord> {
        let mut locations = self.data.locations.clone();
        locations.sort_by(|a, b| {
            b.query_count
                .cmp(&a.query_count)
                .then(b.last_queried.cmp(&a.last_queried))
        });
        locations.truncate(limit);
        locations
    }

    fn join(&self, record: &TidalRecord) -> Option<HistoryEntry> {
        self.location(record.location_id).map(|location| HistoryEntry {
            location: location.clone(),
            record: record.clone(),
        })
    }

    /// Records for locations near a coordinate, newest first
    pub fn location_history(&self, coords: Coordinates, limit: usize) -> Vec<HistoryEntry> {
        self.data
            .records
            .iter()
            .rev()
            .filter_map(|r| self.join(r))
            .filter(|e| e.location.coordinates().is_near(coords, SAME_PLACE_TOLERANCE_DEG))
            .take(limit)
            .collect()
    }

    /// Most recent records across all locations, newest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.data
            .records
            .iter()
            .rev()
            .filter_map(|r| self.join(r))
            .take(limit)
            .collect()
    }

    /// Per-area height statistics over the last `days` days, highest average first
    ///
    /// A window reaching past the earliest representable time covers every record.
    pub fn statistics(&self, days: i64, now: NaiveDateTime) -> Vec<AreaStats> {
        let cutoff = Duration::try_days(days).and_then(|d| now.checked_sub_signed(d));
        let mut by_area: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

        let in_window = |r: &&TidalRecord| cutoff.map_or(true, |c| r.timestamp >= c);
        for record in self.data.records.iter().filter(in_window) {
            if let Some(location) = self.location(record.location_id) {
                by_area
                    .entry(location.area.as_str())
                    .or_default()
                    .push(record.height_m);
            }
        }

        let mut stats: Vec<AreaStats> = by_area
            .into_iter()
            .map(|(area, heights)| {
                let sum: f64 = heights.iter().sum();
                AreaStats {
                    area: area.to_string(),
                    avg_height_m: round_cm(sum / heights.len() as f64),
                    max_height_m: heights.iter().copied().fold(f64::MIN, f64::max),
                    min_height_m: heights.iter().copied().fold(f64::MAX, f64::min),
                    count: heights.len(),
                }
            })
            .collect();

        stats.sort_by(|a, b| b.avg_height_m.total_cmp(&a.avg_height_m));
        stats
    }

    pub fn location_count(&self) -> usize {
        self.data.locations.len()
    }

    pub fn record_count(&self) -> usize {
        self.data.records.len()
    }

    /// Remove every location and record
    pub fn clear(&mut self) {
        self.data = StoreData::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tide::simulate;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn info(lat: f64, lon: f64, area: &str) -> LocationInfo {
        LocationInfo {
            lat,
            lon,
            region: "NSW".to_string(),
            country: "Australia".to_string(),
            area: area.to_string(),
            locality: "Unknown".to_string(),
            coast_distance_km: 1.0,
            nearest_reference: "Sydney".to_string(),
        }
    }

    fn create_test_store() -> (TideStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tides.json");
        let store = TideStore::load_from(path).unwrap();
        (store, temp_dir)
    }

    fn record_query(store: &mut TideStore, info: &LocationInfo, now: NaiveDateTime) -> Uuid {
        let id = store.save_location(info, now);
        let snapshot = simulate(info.coordinates(), now);
        store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, now)
    }

    #[test]
    fn test_empty_store() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.location_count(), 0);
        assert_eq!(store.record_count(), 0);
        assert!(store.most_queried(5).is_empty());
    }

    #[test]
    fn test_nearby_locations_are_merged() {
        let (mut store, _temp) = create_test_store();
        let first = store.save_location(&info(-33.8651, 151.2099, "Sydney"), at(1, 9));
        let again = store.save_location(&info(-33.8700, 151.2050, "Sydney"), at(1, 10));
        let elsewhere = store.save_location(&info(-32.9167, 151.75, "Newcastle"), at(1, 11));

        assert_eq!(first, again);
        assert_ne!(first, elsewhere);
        assert_eq!(store.location_count(), 2);

        let location = store.location(first).unwrap();
        assert_eq!(location.query_count, 2);
        assert_eq!(location.first_queried, at(1, 9));
        assert_eq!(location.last_queried, at(1, 10));
    }

    #[test]
    fn test_save_tidal_data_keeps_forecast() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let id = store.save_location(&sydney, at(1, 9));
        let snapshot = simulate(sydney.coordinates(), at(1, 9));
        store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, at(1, 9));

        let history = store.location_history(sydney.coordinates(), 10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].record.height_m, snapshot.current.height_m);
        assert_eq!(history[0].record.forecasts, snapshot.forecast);
        assert_eq!(history[0].location.id, id);
    }

    #[test]
    fn test_most_queried_order_and_limit() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let newcastle = info(-32.9167, 151.75, "Newcastle");
        let eden = info(-37.0637, 149.9005, "Bega Valley");

        for hour in 0..3 {
            store.save_location(&newcastle, at(1, hour));
        }
        store.save_location(&sydney, at(1, 5));
        store.save_location(&eden, at(1, 6));
        store.save_location(&eden, at(1, 7));

        let popular = store.most_queried(2);
        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].area, "Newcastle");
        assert_eq!(popular[0].query_count, 3);
        assert_eq!(popular[1].area, "Bega Valley");
    }

    #[test]
    fn test_location_history_newest_first() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let newcastle = info(-32.9167, 151.75, "Newcastle");

        for hour in 1..=4 {
            record_query(&mut store, &sydney, at(2, hour));
        }
        record_query(&mut store, &newcastle, at(2, 5));

        let history = store.location_history(sydney.coordinates(), 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].record.timestamp, at(2, 4));
        assert_eq!(history[2].record.timestamp, at(2, 2));
        assert!(history.iter().all(|e| e.location.area == "Sydney"));

        let recent = store.recent(2);
        assert_eq!(recent[0].location.area, "Newcastle");
        assert_eq!(recent[1].record.timestamp, at(2, 4));
    }

    #[test]
    fn test_statistics_window_and_order() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let newcastle = info(-32.9167, 151.75, "Newcastle");

        let sydney_id = store.save_location(&sydney, at(1, 0));
        let newcastle_id = store.save_location(&newcastle, at(1, 0));

        let mut snapshot = simulate(sydney.coordinates(), at(1, 0));
        let mut add = |store: &mut TideStore, id: u64, height: f64, when: NaiveDateTime| {
            snapshot.current.height_m = height;
            store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, when);
        };

        add(&mut store, sydney_id, 1.0, at(20, 0));
        add(&mut store, sydney_id, 2.0, at(21, 0));
        add(&mut store, newcastle_id, 2.5, at(21, 0));
        // Outside a 7-day window ending on the 25th
        add(&mut store, newcastle_id, 0.1, at(1, 0));

        let stats = store.statistics(7, at(25, 0));
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].area, "Newcastle");
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[1].area, "Sydney");
        assert_eq!(stats[1].avg_height_m, 1.5);
        assert_eq!(stats[1].max_height_m, 2.0);
        assert_eq!(stats[1].min_height_m, 1.0);
        assert_eq!(stats[1].count, 2);

        let all = store.statistics(30, at(25, 0));
        assert_eq!(all[0].area, "Sydney");
        assert_eq!(all[1].count, 2);
    }

    #[test]
    fn test_statistics_huge_window_covers_everything() {
        let (mut store, _temp) = create_test_store();
        let id = store.save_location(&info(-33.8651, 151.2099, "Sydney"), at(1, 0));
        let snapshot = simulate(Coordinates::new(-33.8651, 151.2099), at(1, 0));
        store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, at(1, 0));
        store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, at(2, 0));

        for days in [1_000_000_000, i64::MAX / 86_400, i64::MAX] {
            let stats = store.statistics(days, at(25, 0));
            assert_eq!(stats.len(), 1, "days = {}", days);
            assert_eq!(stats[0].count, 2);
        }
    }

    #[test]
    fn test_writer_skips_stale_revisions() {
        let (mut store, _temp) = create_test_store();
        let writer = StoreWriter::new();

        store.save_location(&info(-33.8651, 151.2099, "Sydney"), at(1, 0));
        let older = store.prepare_save().unwrap();
        store.save_location(&info(-32.9167, 151.75, "Newcastle"), at(1, 1));
        let newer = store.prepare_save().unwrap();
        assert!(newer.revision() > older.revision());

        assert!(writer.write(newer).unwrap());
        assert!(!writer.write(older).unwrap());

        let loaded = TideStore::load_from(store.path().clone()).unwrap();
        assert_eq!(loaded.location_count(), 2);
    }

    #[test]
    fn test_record_cap() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let id = store.save_location(&sydney, at(1, 0));
        let snapshot = simulate(sydney.coordinates(), at(1, 0));

        let first = store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, at(1, 0));
        for _ in 0..MAX_TIDAL_RECORDS + 5 {
            store.save_tidal_data(id, &snapshot, DataSourceKind::Simulated, at(2, 0));
        }

        assert_eq!(store.record_count(), MAX_TIDAL_RECORDS);
        assert!(store.recent(MAX_TIDAL_RECORDS).iter().all(|e| e.record.id != first));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("tides.json");
        let sydney = info(-33.8651, 151.2099, "Sydney");

        {
            let mut store = TideStore::load_from(path.clone()).unwrap();
            record_query(&mut store, &sydney, at(3, 8));
            store.save().unwrap();
        }

        let store = TideStore::load_from(path).unwrap();
        assert_eq!(store.location_count(), 1);
        assert_eq!(store.record_count(), 1);

        // Ids keep counting up after a reload
        let mut store = store;
        let id = store.save_location(&info(-28.6, 153.6, "Byron"), at(3, 9));
        assert_eq!(id, 2);
    }

    #[test]
    fn test_corrupt_file_is_store_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tides.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(TideStore::load_from(path), Err(Error::Store(_))));
    }

    #[test]
    fn test_record_report() {
        let (mut store, _temp) = create_test_store();
        let sydney = info(-33.8651, 151.2099, "Sydney");
        let report = TideReport {
            location: sydney.clone(),
            tide: simulate(sydney.coordinates(), at(4, 12)),
            source: DataSourceKind::Simulated,
        };
        let id = store.record_report(&report, at(4, 12));

        let recent = store.recent(1);
        assert_eq!(recent[0].record.id, id);
        assert_eq!(recent[0].record.status, report.tide.current.status);
        assert_eq!(recent[0].record.data_source, DataSourceKind::Simulated);
    }

    #[test]
    fn test_clear() {
        let (mut store, _temp) = create_test_store();
        record_query(&mut store, &info(-33.8651, 151.2099, "Sydney"), at(1, 0));
        store.clear();
        assert_eq!(store.location_count(), 0);
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_resolve_path_prefers_config() {
        let config = StorageConfig {
            path: Some(PathBuf::from("/tmp/custom.json")),
        };
        assert_eq!(
            TideStore::resolve_path(&config).unwrap(),
            PathBuf::from("/tmp/custom.json")
        );
    }
}
