//! Trend series for plotting: raw points, a mean line and a one-sigma band
//! per metric key.

use crate::error::FilterError;
use chrono::NaiveDateTime;
use connectors::store::SampleStore;
use model::{
    core::value::Value,
    execution::query::{OrderDir, SampleQuery},
    records::{column::Column, row::RowData},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERIES_COLOR: &str = "rgb(0,100,80)";
const BAND_FILL: &str = "rgba(0,100,80,0.2)";
const BAND_EDGE: &str = "rgba(255,255,255,0)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
}

/// One plot trace. Only `x` and `y` carry data; the rest are rendering hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: Vec<NaiveDateTime>,
    pub y: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub line: Line,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

impl PlotSeries {
    fn scatter(x: Vec<NaiveDateTime>, y: Vec<f64>, color: &str) -> Self {
        PlotSeries {
            kind: "scatter".to_string(),
            x,
            y,
            mode: None,
            line: Line {
                color: color.to_string(),
            },
            fill: None,
            fillcolor: None,
            name: None,
            showlegend: None,
        }
    }
}

/// Builds the three traces for one key from points in plotting order.
/// Returns nothing for an empty series.
///
/// Mean and standard deviation are population statistics.
pub fn build_series(key: &str, points: &[(NaiveDateTime, f64)]) -> Vec<PlotSeries> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len();
    let x = points.iter().map(|(ts, _)| *ts).collect::<Vec<_>>();
    let y = points.iter().map(|(_, v)| *v).collect::<Vec<_>>();

    let mean = y.iter().sum::<f64>() / n as f64;
    let stdev = (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt();

    let mut raw = PlotSeries::scatter(x.clone(), y, SERIES_COLOR);
    raw.mode = Some("markers".to_string());
    raw.name = Some(key.to_string());

    let mut mean_line = PlotSeries::scatter(x.clone(), vec![mean; n], SERIES_COLOR);
    mean_line.mode = Some("lines".to_string());
    mean_line.showlegend = Some(false);

    let band_x = x.iter().chain(x.iter().rev()).copied().collect::<Vec<_>>();
    let mut band_y = vec![mean - stdev; n];
    band_y.extend(std::iter::repeat_n(mean + stdev, n));

    let mut band = PlotSeries::scatter(band_x, band_y, BAND_EDGE);
    band.fill = Some("tozerox".to_string());
    band.fillcolor = Some(BAND_FILL.to_string());
    band.showlegend = Some(false);

    vec![raw, mean_line, band]
}

/// `query` narrowed to one metric and projected to `(created_at, value)`
/// in plotting order.
pub fn metric_query(query: &SampleQuery, key: &str) -> SampleQuery {
    query
        .clone()
        .with_metric_key(key)
        .select(vec![Column::ReportCreatedAt, Column::SampleDataValue])
        .order_by(Column::ReportCreatedAt, OrderDir::Asc)
        .order_by(Column::SampleDataId, OrderDir::Asc)
}

/// Runs `query` once per key and builds each key's traces.
///
/// Each key starts from an unmodified copy of `query`. The first key without
/// any values ends the call; keys after it are not queried.
pub async fn trend_series<S>(
    store: &S,
    query: &SampleQuery,
    keys: &[String],
) -> Result<Vec<PlotSeries>, FilterError>
where
    S: SampleStore + ?Sized,
{
    let mut plots = Vec::with_capacity(keys.len() * 3);

    for key in keys {
        let rows = store.fetch(&metric_query(query, key)).await?;
        if rows.is_empty() {
            info!(key = %key, "No values for metric, skipping remaining keys");
            break;
        }

        let points = rows.iter().map(point).collect::<Result<Vec<_>, _>>()?;
        debug!(key = %key, points = points.len(), store = store.name(), "Built trend series");
        plots.extend(build_series(key, &points));
    }

    Ok(plots)
}

fn point(row: &RowData) -> Result<(NaiveDateTime, f64), FilterError> {
    let created_at = row.get_value(Column::ReportCreatedAt);
    let ts = created_at
        .as_timestamp()
        .ok_or_else(|| FilterError::ValueConversion {
            field: Column::ReportCreatedAt.to_string(),
            value: created_at.to_string(),
        })?;

    let value = row.get_value(Column::SampleDataValue);
    let number = value.as_f64().ok_or_else(|| FilterError::ValueConversion {
        field: Column::SampleDataValue.to_string(),
        value: match &value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    })?;

    Ok((ts, number))
}
