//! # Simulated Tide Model
//!
//! Deterministic stand-in used when no tide provider is configured. It models
//! a single semi-diurnal constituent:
//!
//! - **Period**: 12.42 hours (lunar semi-diurnal)
//! - **Mean level**: 1.5 m
//! - **Amplitude**: 0.8 m plus up to 0.2 m depending on latitude, so nearby
//!   locations get slightly different ranges
//!
//! The phase comes from the wall-clock hour and minute of `now` only, so the
//! same `(coordinates, now)` always yields the same snapshot.
//!
//! ## Two height formulas
//! The current height uses a piecewise-linear ramp while the chart series
//! uses a true sine. They disagree between turning points. Consumers already
//! depend on both shapes, so they are kept separate.

use crate::constants::tide::{
    BASELINE_M, CHART_MARKER_EVERY, CHART_POINTS, CHART_STEP_MINUTES, FORECAST_EVENTS,
    MIN_AMPLITUDE_M, PERIOD_HOURS,
};
use crate::coord::Coordinates;
use crate::tide::{
    round_cm, ChartPoint, CurrentTide, ForecastEvent, PointType, TidalSnapshot, TideStatus,
    TideType, Trend,
};
use chrono::{Duration, NaiveDateTime, Timelike};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Parameters of the simulated curve for one location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TideModel {
    pub amplitude: f64,
    pub period: f64,
    pub baseline: f64,
}

impl TideModel {
    /// Model for a latitude; amplitude lies in [0.8, 1.0)
    pub fn for_latitude(lat: f64) -> Self {
        Self {
            amplitude: MIN_AMPLITUDE_M + (lat.abs() % 10.0) / 50.0,
            period: PERIOD_HOURS,
            baseline: BASELINE_M,
        }
    }

    fn half_period(&self) -> f64 {
        self.period / 2.0
    }

    /// Position within the tidal cycle, in hours
    pub fn hour_in_cycle(&self, t: NaiveDateTime) -> f64 {
        (t.hour() as f64 + t.minute() as f64 / 60.0) % self.period
    }

    fn phase(&self, hour_in_cycle: f64) -> f64 {
        (hour_in_cycle / self.period) * TAU
    }

    /// Piecewise-linear height used for the current reading (unrounded)
    pub fn linear_height(&self, hour_in_cycle: f64) -> f64 {
        let offset = (self.phase(hour_in_cycle) - FRAC_PI_2) / PI;
        if hour_in_cycle < self.half_period() {
            self.baseline + self.amplitude * -offset
        } else {
            self.baseline + self.amplitude * offset
        }
    }

    /// Sine height used for the chart series (unrounded)
    pub fn sine_height(&self, hour_in_cycle: f64) -> f64 {
        self.baseline + self.amplitude * self.phase(hour_in_cycle).sin()
    }

    fn extreme(&self, kind: TideType) -> f64 {
        match kind {
            TideType::High => self.baseline + self.amplitude,
            TideType::Low => self.baseline - self.amplitude,
        }
    }

    fn current(&self, now: NaiveDateTime) -> CurrentTide {
        let hic = self.hour_in_cycle(now);
        let half = self.half_period();
        let is_rising = hic < half;
        let is_high = hic > 0.8 * half && hic < 1.2 * half;

        let status = if is_high {
            TideStatus::NearHigh
        } else if (0.3..0.7).contains(&(hic / self.period)) {
            TideStatus::Mid
        } else {
            TideStatus::NearLow
        };

        CurrentTide {
            height_m: round_cm(self.linear_height(hic)),
            status,
            trend: if is_rising { Trend::Rising } else { Trend::Falling },
            timestamp: now,
        }
    }

    fn forecast(&self, now: NaiveDateTime) -> Vec<ForecastEvent> {
        let hic = self.hour_in_cycle(now);
        let half = self.half_period();

        let hours_to_next = if hic < half {
            half - hic
        } else {
            self.period - hic
        };
        let first_kind = if hic < half {
            TideType::Low
        } else {
            TideType::High
        };
        let first_time = now + hours(hours_to_next);

        let mut events = Vec::with_capacity(FORECAST_EVENTS);
        let mut kind = first_kind;
        for i in 0..FORECAST_EVENTS {
            events.push(ForecastEvent {
                kind,
                time: first_time + hours(half * i as f64),
                height_m: round_cm(self.extreme(kind)),
            });
            kind = kind.opposite();
        }
        events
    }

    fn chart(&self, now: NaiveDateTime) -> Vec<ChartPoint> {
        (0..CHART_POINTS)
            .map(|i| {
                let time = now + Duration::minutes(CHART_STEP_MINUTES * i as i64);
                let kind = if i % CHART_MARKER_EVERY == 0 {
                    if (i / CHART_MARKER_EVERY) % 2 == 0 {
                        PointType::High
                    } else {
                        PointType::Low
                    }
                } else {
                    PointType::Normal
                };
                ChartPoint {
                    time,
                    height_m: round_cm(self.sine_height(self.hour_in_cycle(time))),
                    kind,
                }
            })
            .collect()
    }

    /// Build the full snapshot at `now`
    pub fn snapshot(&self, now: NaiveDateTime) -> TidalSnapshot {
        TidalSnapshot {
            current: self.current(now),
            forecast: self.forecast(now),
            chart_data: self.chart(now),
        }
    }
}

/// Fractional hours as a duration, to the millisecond
fn hours(h: f64) -> Duration {
    Duration::milliseconds((h * 3_600_000.0).round() as i64)
}

/// Simulate tides for a location at `now`
pub fn simulate(coords: Coordinates, now: NaiveDateTime) -> TidalSnapshot {
    TideModel::for_latitude(coords.lat).snapshot(now)
}
