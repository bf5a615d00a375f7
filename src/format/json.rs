//! JSON output formatter

use crate::error::Result;
use crate::format::OutputFormatter;
use crate::service::TideReport;

/// Pretty-printed report, same shape as the `/api/tide` response
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &TideReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::text::tests::sample_report;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter.format(&sample_report()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["source"], "Simulated");
        assert_eq!(parsed["location"]["region"], "NSW");
        assert_eq!(parsed["tide"]["current"]["status"], "Near Low");
        assert_eq!(parsed["tide"]["forecast"].as_array().unwrap().len(), 4);
        assert_eq!(parsed["tide"]["chart_data"].as_array().unwrap().len(), 96);
    }

    #[test]
    fn test_json_formatter_info() {
        assert_eq!(JsonFormatter.name(), "json");
        assert!(!JsonFormatter.description().is_empty());
    }
}
