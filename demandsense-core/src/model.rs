use serde::{Deserialize, Serialize};

/// A normalized weather observation, either simulated or fetched live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: String,
    pub temperature_c: f64,
    /// Primary condition label, e.g. "Clear", "Rain", "Drizzle".
    pub condition: String,
    pub description: Option<String>,
}

/// One product line as stored in the `inventory` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub product_id: String,
    pub category: String,
    pub base_demand: u64,
    pub current_stock: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestockStatus {
    Ok,
    Restock,
}

impl RestockStatus {
    /// Restock iff the predicted demand strictly exceeds what is on hand.
    pub fn classify(predicted_demand: u64, current_stock: u64) -> Self {
        if predicted_demand > current_stock {
            RestockStatus::Restock
        } else {
            RestockStatus::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestockStatus::Ok => "OK",
            RestockStatus::Restock => "RESTOCK",
        }
    }

    pub fn needs_restock(&self) -> bool {
        matches!(self, RestockStatus::Restock)
    }
}

impl std::fmt::Display for RestockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inventory row annotated with the weather adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRow {
    pub product_id: String,
    pub category: String,
    pub base_demand: u64,
    pub current_stock: u64,
    pub multiplier: f64,
    pub predicted_demand: u64,
    pub status: RestockStatus,
}

/// Machine-readable kind of the report headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSignal {
    Stable,
    RainAlert,
    LowTemp,
    HighHeat,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandReport {
    pub rows: Vec<DemandRow>,
    pub message: String,
    pub signal: MarketSignal,
}

impl DemandReport {
    pub fn no_data() -> Self {
        Self {
            rows: Vec::new(),
            message: "DB Connection Failed".to_string(),
            signal: MarketSignal::NoData,
        }
    }

    /// True when there was no inventory to evaluate.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of predicted demand, saturating at `u64::MAX`.
    pub fn total_predicted_demand(&self) -> u64 {
        self.rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.predicted_demand))
    }

    pub fn restock_rows(&self) -> impl Iterator<Item = &DemandRow> {
        self.rows.iter().filter(|r| r.status.needs_restock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_not_restock() {
        assert_eq!(RestockStatus::classify(150, 150), RestockStatus::Ok);
        assert_eq!(RestockStatus::classify(151, 150), RestockStatus::Restock);
        assert_eq!(RestockStatus::classify(0, 0), RestockStatus::Ok);
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&RestockStatus::Restock).unwrap();
        assert_eq!(json, "\"RESTOCK\"");
    }

    #[test]
    fn no_data_report_is_empty() {
        let report = DemandReport::no_data();
        assert!(report.is_empty());
        assert_eq!(report.signal, MarketSignal::NoData);
        assert_eq!(report.total_predicted_demand(), 0);
    }

    #[test]
    fn total_demand_saturates() {
        let row = |id: &str, predicted_demand: u64| DemandRow {
            product_id: id.into(),
            category: "Monsoon".into(),
            base_demand: predicted_demand,
            current_stock: 0,
            multiplier: 1.0,
            predicted_demand,
            status: RestockStatus::classify(predicted_demand, 0),
        };
        let report = DemandReport {
            rows: vec![row("A", u64::MAX), row("B", 1)],
            message: "Market Stable".into(),
            signal: MarketSignal::Stable,
        };

        assert_eq!(report.total_predicted_demand(), u64::MAX);
    }
}
