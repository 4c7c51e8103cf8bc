//! Panel descriptors submitted by dashboard clients
//!
//! A panel is one chart/metric unit. Its `data` is either an ordered list of
//! point records or a single record; which shape is valid depends on
//! `metricType`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Kind of metric a panel displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    TimeSeries,
    Distribution,
    Comparison,
    SingleValue,
    Table,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::TimeSeries => "time_series",
            MetricType::Distribution => "distribution",
            MetricType::Comparison => "comparison",
            MetricType::SingleValue => "single_value",
            MetricType::Table => "table",
        }
    }
}

/// Alerting thresholds attached to a panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<f64>,
}

/// Panel payload: a sequence of point records or a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelData {
    Points(Vec<Value>),
    Record(Map<String, Value>),
}

impl PanelData {
    pub fn is_empty(&self) -> bool {
        match self {
            PanelData::Points(points) => points.is_empty(),
            PanelData::Record(record) => record.is_empty(),
        }
    }
}

/// One panel as submitted by the caller
///
/// Immutable once submitted; not retained after the request completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelDescriptor {
    pub panel_id: String,
    pub title: String,
    pub metric_type: MetricType,
    pub unit: String,
    pub time_range: String,
    pub data: PanelData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Panel shape does not match its declared metric type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PanelValidationError {
    #[error("Panel {0} has empty data")]
    EmptyData(String),

    #[error("{metric} panel {panel_id} data must be a list")]
    ExpectedList { panel_id: String, metric: &'static str },

    #[error("{metric} panel {panel_id} data must be an object")]
    ExpectedObject { panel_id: String, metric: &'static str },

    #[error("Time series panel {panel_id} point {index} must be an object with 't' and 'v' fields")]
    MalformedPoint { panel_id: String, index: usize },
}

impl PanelDescriptor {
    /// Name used when referring to the panel in narration text
    pub fn display_name(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.panel_id
        } else {
            &self.title
        }
    }

    /// Check the data shape against the declared metric type
    pub fn validate(&self) -> Result<(), PanelValidationError> {
        if self.data.is_empty() {
            return Err(PanelValidationError::EmptyData(self.panel_id.clone()));
        }

        let metric = self.metric_type.as_str();
        match (self.metric_type, &self.data) {
            (MetricType::TimeSeries, PanelData::Points(points)) => {
                for (index, point) in points.iter().enumerate() {
                    let well_formed = point
                        .as_object()
                        .map(|p| p.contains_key("t") && p.contains_key("v"))
                        .unwrap_or(false);
                    if !well_formed {
                        return Err(PanelValidationError::MalformedPoint {
                            panel_id: self.panel_id.clone(),
                            index,
                        });
                    }
                }
                Ok(())
            }
            (MetricType::SingleValue, PanelData::Record(_)) => Ok(()),
            (MetricType::SingleValue, PanelData::Points(_)) => {
                Err(PanelValidationError::ExpectedObject {
                    panel_id: self.panel_id.clone(),
                    metric,
                })
            }
            (_, PanelData::Points(_)) => Ok(()),
            // Comparison and table panels take either shape
            (MetricType::Comparison | MetricType::Table, PanelData::Record(_)) => Ok(()),
            (MetricType::TimeSeries | MetricType::Distribution, PanelData::Record(_)) => {
                Err(PanelValidationError::ExpectedList {
                    panel_id: self.panel_id.clone(),
                    metric,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn panel(metric_type: &str, data: Value) -> PanelDescriptor {
        serde_json::from_value(json!({
            "panelId": "p1",
            "title": "Revenue",
            "metricType": metric_type,
            "unit": "USD",
            "timeRange": "2025-01",
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let p: PanelDescriptor = serde_json::from_value(json!({
            "panelId": "revenue",
            "title": "Revenue trend",
            "metricType": "time_series",
            "unit": "USD",
            "timeRange": "2025-01-01~2025-12-31",
            "data": [{"t": "2025-01", "v": 120000}],
            "thresholds": {"warning": 100000, "critical": 80000},
            "order": 1
        }))
        .unwrap();

        assert_eq!(p.panel_id, "revenue");
        assert_eq!(p.metric_type, MetricType::TimeSeries);
        assert_eq!(p.thresholds.as_ref().unwrap().warning, Some(100000.0));
        assert_eq!(p.order, Some(1));
        assert!(matches!(p.data, PanelData::Points(ref v) if v.len() == 1));
    }

    #[test]
    fn test_single_record_data() {
        let p = panel("single_value", json!({"value": 42}));
        assert!(matches!(p.data, PanelData::Record(_)));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_time_series_requires_t_and_v() {
        let ok = panel("time_series", json!([{"t": "2025-01", "v": 1}]));
        assert!(ok.validate().is_ok());

        let bad = panel("time_series", json!([{"t": "2025-01"}]));
        assert_eq!(
            bad.validate(),
            Err(PanelValidationError::MalformedPoint {
                panel_id: "p1".to_string(),
                index: 0
            })
        );

        let scalar_point = panel("time_series", json!([1, 2, 3]));
        assert!(scalar_point.validate().is_err());
    }

    #[test]
    fn test_time_series_rejects_record() {
        let p = panel("time_series", json!({"t": "2025-01", "v": 1}));
        assert!(matches!(
            p.validate(),
            Err(PanelValidationError::ExpectedList { .. })
        ));
    }

    #[test]
    fn test_comparison_and_table_accept_record() {
        assert!(panel("comparison", json!({"a": 1, "b": 2})).validate().is_ok());
        assert!(panel("table", json!({"region": "EU", "total": 3})).validate().is_ok());
        assert!(matches!(
            panel("distribution", json!({"p50": 3})).validate(),
            Err(PanelValidationError::ExpectedList { .. })
        ));
    }

    #[test]
    fn test_single_value_rejects_list() {
        let p = panel("single_value", json!([{"v": 1}]));
        assert!(matches!(
            p.validate(),
            Err(PanelValidationError::ExpectedObject { .. })
        ));
    }

    #[test]
    fn test_empty_data_rejected() {
        assert_eq!(
            panel("distribution", json!([])).validate(),
            Err(PanelValidationError::EmptyData("p1".to_string()))
        );
        assert!(panel("single_value", json!({})).validate().is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut p = panel("table", json!([{"a": 1}]));
        assert_eq!(p.display_name(), "Revenue");
        p.title = "  ".to_string();
        assert_eq!(p.display_name(), "p1");
    }

    #[test]
    fn test_serialization_omits_absent_optionals() {
        let p = panel("comparison", json!([{"k": "a", "v": 1}]));
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("thresholds").is_none());
        assert!(value.get("order").is_none());
        assert_eq!(value["metricType"], "comparison");
    }
}
