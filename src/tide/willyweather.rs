//! WillyWeather tide provider
//!
//! Two requests per lookup:
//! 1. `search.json` finds the closest location with tide data
//! 2. `locations/{id}/weather.json?forecasts=tides&days=2` fetches its tides
//!
//! The response is normalized into a [`TidalSnapshot`]. Anything unexpected
//! (HTTP errors, missing fields, no station) is a provider error.

use crate::config::ProviderConfig;
use crate::constants::api::WILLYWEATHER_URL;
use crate::constants::tide::FORECAST_EVENTS;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::tide::{
    round_cm, ChartPoint, CurrentTide, ForecastEvent, PointType, TidalSnapshot, TideProvider,
    TideStatus, TideType, Trend,
};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::Deserialize;
use std::time::Duration;

/// WillyWeather API client
#[derive(Debug, Clone)]
pub struct WillyWeatherProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    location: Vec<SearchLocation>,
}

#[derive(Debug, Deserialize)]
struct SearchLocation {
    id: u64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    #[serde(default)]
    forecasts: Option<Forecasts>,
}

#[derive(Debug, Deserialize)]
struct Forecasts {
    #[serde(default)]
    tides: Option<TideForecast>,
}

#[derive(Debug, Default, Deserialize)]
struct TideForecast {
    #[serde(default)]
    current: Option<TideCurrent>,
    #[serde(default)]
    days: Vec<TideDay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TideCurrent {
    #[serde(default)]
    height: f64,
    #[serde(default)]
    is_high: bool,
    #[serde(default)]
    rising: bool,
}

#[derive(Debug, Default, Deserialize)]
struct TideDay {
    #[serde(default)]
    entries: Vec<TideEntry>,
    #[serde(default)]
    points: Vec<TidePoint>,
}

/// A high/low turning point
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TideEntry {
    date_time: String,
    #[serde(default)]
    height: f64,
    #[serde(rename = "type", default)]
    kind: String,
}

/// A regular sample on the tide curve
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TidePoint {
    date_time: String,
    #[serde(default)]
    height: f64,
}

impl WillyWeatherProvider {
    /// Create a provider with the given API key
    pub fn new(api_key: impl Into<String>, config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: WILLYWEATHER_URL.to_string(),
        })
    }

    /// Point the provider at a different API root
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn api_root(&self) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(&self.api_key))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "WillyWeather returned status: {}",
                response.status()
            )));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Find the closest tide location id
    fn find_station(&self, coords: Coordinates) -> Result<u64> {
        let url = format!(
            "{}/search.json?lat={}&lng={}&units=distance:km&types=tide&limit=1",
            self.api_root(),
            coords.lat,
            coords.lng
        );
        let search: SearchResponse = self.get_json(&url)?;

        let station = search
            .location
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("No tide station near location".to_string()))?;
        tracing::debug!(
            "Nearest tide station: {} ({})",
            station.name.as_deref().unwrap_or("unnamed"),
            station.id
        );
        Ok(station.id)
    }

    fn fetch_tides(&self, station_id: u64, now: NaiveDateTime) -> Result<TideForecast> {
        let url = format!(
            "{}/locations/{}/weather.json?forecasts=tides&days=2&startDate={}",
            self.api_root(),
            station_id,
            now.format("%Y-%m-%d")
        );
        let weather: WeatherResponse = self.get_json(&url)?;

        weather
            .forecasts
            .and_then(|f| f.tides)
            .ok_or_else(|| Error::Provider("Response has no tide forecast".to_string()))
    }
}

impl TideProvider for WillyWeatherProvider {
    fn name(&self) -> &'static str {
        "willyweather"
    }

    fn fetch(&self, coords: Coordinates, now: NaiveDateTime) -> Result<TidalSnapshot> {
        let station_id = self.find_station(coords)?;
        let tides = self.fetch_tides(station_id, now)?;
        normalize(tides, now)
    }
}

/// Parse a provider timestamp into local wall-clock time
///
/// Accepts RFC 3339 (converted to local time) or a bare `YYYY-MM-DD HH:MM:SS`
/// which is already local.
fn parse_time(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| Error::Provider(format!("Unparseable tide time: {}", s)))
}

fn entry_kind(kind: &str) -> TideType {
    if kind.eq_ignore_ascii_case("high") {
        TideType::High
    } else {
        TideType::Low
    }
}

fn normalize(tides: TideForecast, now: NaiveDateTime) -> Result<TidalSnapshot> {
    let first_day = tides
        .days
        .first()
        .ok_or_else(|| Error::Provider("Tide forecast has no days".to_string()))?;

    let current = tides.current.unwrap_or_default();
    let current = CurrentTide {
        height_m: round_cm(current.height),
        status: if current.is_high {
            TideStatus::High
        } else {
            TideStatus::Low
        },
        trend: if current.rising {
            Trend::Rising
        } else {
            Trend::Falling
        },
        timestamp: now,
    };

    let forecast = first_day
        .entries
        .iter()
        .take(FORECAST_EVENTS)
        .map(|e| {
            Ok(ForecastEvent {
                kind: entry_kind(&e.kind),
                time: parse_time(&e.date_time)?,
                height_m: round_cm(e.height),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut chart_data = Vec::new();
    for day in &tides.days {
        for p in &day.points {
            chart_data.push(ChartPoint {
                time: parse_time(&p.date_time)?,
                height_m: round_cm(p.height),
                kind: PointType::Normal,
            });
        }
    }
    for day in &tides.days {
        for e in &day.entries {
            chart_data.push(ChartPoint {
                time: parse_time(&e.date_time)?,
                height_m: round_cm(e.height),
                kind: entry_kind(&e.kind).into(),
            });
        }
    }
    // Stable sort keeps a curve point ahead of a marker at the same instant
    chart_data.sort_by_key(|p| p.time);

    Ok(TidalSnapshot {
        current,
        forecast,
        chart_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    const SAMPLE: &str = r#"{
        "forecasts": {
            "tides": {
                "current": {"height": 1.234, "isHigh": false, "rising": true},
                "days": [
                    {
                        "entries": [
                            {"dateTime": "2024-04-15 03:10:00", "height": 0.41, "type": "low"},
                            {"dateTime": "2024-04-15 09:22:00", "height": 1.72, "type": "high"},
                            {"dateTime": "2024-04-15 15:31:00", "height": 0.38, "type": "low"},
                            {"dateTime": "2024-04-15 21:40:00", "height": 1.65, "type": "high"},
                            {"dateTime": "2024-04-15 23:59:00", "height": 1.0, "type": "low"}
                        ],
                        "points": [
                            {"dateTime": "2024-04-15 09:00:00", "height": 1.6},
                            {"dateTime": "2024-04-15 03:00:00", "height": 0.42}
                        ]
                    },
                    {
                        "entries": [
                            {"dateTime": "2024-04-16 04:00:00", "height": 0.45, "type": "low"}
                        ],
                        "points": [
                            {"dateTime": "2024-04-16 00:00:00", "height": 1.1}
                        ]
                    }
                ]
            }
        }
    }"#;

    fn sample_tides() -> TideForecast {
        let weather: WeatherResponse = serde_json::from_str(SAMPLE).unwrap();
        weather.forecasts.unwrap().tides.unwrap()
    }

    #[test]
    fn test_normalize_current() {
        let snapshot = normalize(sample_tides(), now()).unwrap();
        assert_eq!(snapshot.current.height_m, 1.23);
        assert_eq!(snapshot.current.status, TideStatus::Low);
        assert_eq!(snapshot.current.trend, Trend::Rising);
        assert_eq!(snapshot.current.timestamp, now());
    }

    #[test]
    fn test_normalize_caps_forecast_at_four() {
        let snapshot = normalize(sample_tides(), now()).unwrap();
        assert_eq!(snapshot.forecast.len(), 4);
        assert_eq!(snapshot.forecast[0].kind, TideType::Low);
        assert_eq!(snapshot.forecast[1].kind, TideType::High);
        assert_eq!(snapshot.forecast[1].height_m, 1.72);
    }

    #[test]
    fn test_normalize_chart_merges_and_sorts() {
        let snapshot = normalize(sample_tides(), now()).unwrap();
        // 3 points + 6 entries
        assert_eq!(snapshot.chart_data.len(), 9);
        for pair in snapshot.chart_data.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
        assert_eq!(snapshot.chart_data[0].kind, PointType::Normal);
        assert_eq!(snapshot.chart_data[1].kind, PointType::Low);
        let highs = snapshot
            .chart_data
            .iter()
            .filter(|p| p.kind == PointType::High)
            .count();
        assert_eq!(highs, 2);
    }

    #[test]
    fn test_normalize_without_days_fails() {
        let tides = TideForecast::default();
        assert!(normalize(tides, now()).is_err());
    }

    #[test]
    fn test_parse_time_formats() {
        let naive = parse_time("2024-04-15 09:22:00").unwrap();
        assert_eq!(naive, NaiveDate::from_ymd_opt(2024, 4, 15).unwrap().and_hms_opt(9, 22, 0).unwrap());

        let utc = parse_time("2024-04-15T09:22:00Z").unwrap();
        let expected = DateTime::parse_from_rfc3339("2024-04-15T09:22:00Z")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(utc, expected);

        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_empty_search_is_error() {
        let search: SearchResponse = serde_json::from_str(r#"{"location": []}"#).unwrap();
        assert!(search.location.is_empty());
    }

    #[test]
    fn test_api_root_encodes_key() {
        let provider = WillyWeatherProvider::new("a/b", &ProviderConfig::default()).unwrap();
        assert_eq!(provider.api_root(), "https://api.willyweather.com.au/v2/a%2Fb");
    }

    #[test]
    fn test_unreachable_provider_errors() {
        let config = ProviderConfig {
            timeout_secs: 2,
            ..ProviderConfig::default()
        };
        let provider = WillyWeatherProvider::new("key", &config)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let result = provider.fetch(Coordinates::new(-33.865143, 151.2099), now());
        assert!(result.is_err());
    }
}
