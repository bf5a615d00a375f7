//! Human-readable text output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::service::TideReport;
use crate::tide::{ChartPoint, PointType};

/// Height of the ASCII chart in rows
const CHART_ROWS: usize = 10;

/// Width reserved for the height labels, including the axis
const Y_AXIS_WIDTH: usize = 6;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text with a tide chart"
    }

    fn format(&self, report: &TideReport) -> Result<String> {
        let mut output = String::new();
        let location = &report.location;
        let current = &report.tide.current;

        output.push_str(&format!(
            "{}, {} ({}, {})\n",
            location.locality, location.area, location.region, location.country
        ));
        output.push_str(&format!(
            "Position: ({:.6}, {:.6}), {:.1} km from {}\n",
            location.lat, location.lon, location.coast_distance_km, location.nearest_reference
        ));
        output.push_str(&format!("Data source: {}\n\n", report.source));

        output.push_str(&format!(
            "Current tide: {:.2} m, {} ({}) at {}\n",
            current.height_m,
            current.status,
            current.trend,
            current.timestamp.format("%H:%M %d-%b")
        ));

        if !report.tide.forecast.is_empty() {
            output.push_str("\nUpcoming tides:\n");
            for event in &report.tide.forecast {
                output.push_str(&format!(
                    "  {:<4} {}  {:.2} m\n",
                    event.kind.to_string(),
                    event.time.format("%H:%M %d-%b"),
                    event.height_m
                ));
            }
        }

        if !report.tide.chart_data.is_empty() {
            output.push('\n');
            output.push_str(&ascii_chart(&report.tide.chart_data));
        }

        Ok(output)
    }
}

/// Coarse chart of the series, one column per point
///
/// Turning points are drawn as `H`/`L`, everything else as `•`.
pub fn ascii_chart(points: &[ChartPoint]) -> String {
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
            (min.min(p.height_m), max.max(p.height_m))
        });
    let range = max - min;

    let height_to_row = |h: f64| {
        if range <= f64::EPSILON {
            return CHART_ROWS / 2;
        }
        let normalized = (h - min) / range;
        ((1.0 - normalized) * (CHART_ROWS as f64 - 1.0)).round() as usize
    };

    let mut grid = vec![vec![' '; points.len() + Y_AXIS_WIDTH]; CHART_ROWS];

    for (row, line) in grid.iter_mut().enumerate() {
        line[Y_AXIS_WIDTH - 1] = '│';
        let label = if row == 0 {
            Some(max)
        } else if row == CHART_ROWS - 1 {
            Some(min)
        } else {
            None
        };
        if let Some(value) = label {
            for (i, ch) in format!("{:>4.1}", value).chars().take(Y_AXIS_WIDTH - 2).enumerate() {
                line[i] = ch;
            }
        }
    }

    for (column, point) in points.iter().enumerate() {
        let row = height_to_row(point.height_m).min(CHART_ROWS - 1);
        grid[row][column + Y_AXIS_WIDTH] = match point.kind {
            PointType::High => 'H',
            PointType::Low => 'L',
            PointType::Normal => '•',
        };
    }

    let mut output: String = grid
        .into_iter()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_string() + "\n")
        .collect();

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        output.push_str(&format!(
            "{:width$}{} → {}\n",
            "",
            first.time.format("%H:%M %d-%b"),
            last.time.format("%H:%M %d-%b"),
            width = Y_AXIS_WIDTH
        ));
    }

    output
}
