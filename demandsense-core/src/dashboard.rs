//! Presentation model for a [`DemandReport`].
//!
//! No business logic lives here; the view is a projection of the report and
//! the weather reading that produced it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{DemandReport, DemandRow, MarketSignal, RestockStatus, WeatherReading};

pub const TITLE: &str = "DemandSense AI";
pub const CHART_LIMIT: usize = 10;
pub const HEALTHY_MESSAGE: &str = "Supply Chain Healthy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
    pub delta: String,
}

impl Kpi {
    fn new(label: &str, value: impl Into<String>, delta: impl Into<String>) -> Self {
        Self { label: label.to_string(), value: value.into(), delta: delta.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub product_id: String,
    pub predicted_demand: u64,
    pub status: RestockStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockItem {
    pub product_id: String,
    pub predicted_demand: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionsPanel {
    Healthy { message: String },
    Critical { headline: String, items: Vec<RestockItem> },
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub caption: String,
    pub message: String,
    pub signal: MarketSignal,
    pub kpis: Vec<Kpi>,
    /// Highest predicted demand first.
    pub chart: Vec<ChartBar>,
    pub actions: ActionsPanel,
    pub rows: Vec<DemandRow>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardView {
    pub fn project(report: &DemandReport, weather: &WeatherReading) -> Self {
        Self {
            title: TITLE.to_string(),
            caption: format!("Real-Time Optimization • {}", weather.location),
            message: report.message.clone(),
            signal: report.signal,
            kpis: kpis(report, weather),
            chart: top_demand(&report.rows, CHART_LIMIT),
            actions: actions(report),
            rows: report.rows.clone(),
            generated_at: Utc::now(),
        }
    }
}

fn kpis(report: &DemandReport, weather: &WeatherReading) -> Vec<Kpi> {
    vec![
        // Static placeholders; not derived from the report.
        Kpi::new("Revenue Risk Avoided", "15%", "Saved"),
        Kpi::new("Stock-out Reduction", "40%", "Optimized"),
        Kpi::new(
            "Live Weather",
            format!("{}°C", weather.temperature_c),
            weather.condition.clone(),
        ),
        Kpi::new(
            "Forecast Demand",
            format!("{} Units", group_thousands(report.total_predicted_demand())),
            "Active SKU",
        ),
    ]
}

/// The `limit` rows with the highest predicted demand, descending.
/// Ties keep inventory order.
pub fn top_demand(rows: &[DemandRow], limit: usize) -> Vec<ChartBar> {
    let mut ranked: Vec<&DemandRow> = rows.iter().collect();
    ranked.sort_by(|a, b| b.predicted_demand.cmp(&a.predicted_demand));

    ranked
        .into_iter()
        .take(limit)
        .map(|r| ChartBar {
            product_id: r.product_id.clone(),
            predicted_demand: r.predicted_demand,
            status: r.status,
        })
        .collect()
}

fn actions(report: &DemandReport) -> ActionsPanel {
    let items: Vec<RestockItem> = report
        .restock_rows()
        .map(|r| RestockItem {
            product_id: r.product_id.clone(),
            predicted_demand: r.predicted_demand,
        })
        .collect();

    if items.is_empty() {
        ActionsPanel::Healthy { message: HEALTHY_MESSAGE.to_string() }
    } else {
        ActionsPanel::Critical { headline: format!("{} items Critical", items.len()), items }
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
