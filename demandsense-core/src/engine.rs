//! Weather-driven demand adjustment.
//!
//! A [`RuleSet`] is an ordered list of rules. Each rule that fires sets the
//! multiplier for the categories it names, so a later rule overwrites an
//! earlier one on the same category. Categories no rule names keep 1.0.

use crate::{
    model::{DemandReport, DemandRow, InventoryRow, MarketSignal, RestockStatus, WeatherReading},
    weather::is_raining,
};

pub const LOW_TEMP_THRESHOLD_C: f64 = 20.0;
pub const HIGH_TEMP_THRESHOLD_C: f64 = 32.0;

/// Weather facts the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub temperature_c: f64,
    pub raining: bool,
}

impl Conditions {
    pub fn from_reading(reading: &WeatherReading) -> Self {
        Self {
            temperature_c: reading.temperature_c,
            raining: is_raining(&reading.condition),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Raining,
    /// Strictly below the threshold.
    TempBelow(f64),
    /// Strictly above the threshold.
    TempAbove(f64),
}

impl Trigger {
    pub fn fires(&self, conditions: &Conditions) -> bool {
        match *self {
            Trigger::Raining => conditions.raining,
            Trigger::TempBelow(t) => conditions.temperature_c < t,
            Trigger::TempAbove(t) => conditions.temperature_c > t,
        }
    }
}

/// How a firing rule affects the report headline.
#[derive(Debug, Clone, PartialEq)]
pub enum Headline {
    Always { signal: MarketSignal, text: String },
    /// Only when it is not raining. `{temp}` is replaced with the temperature.
    UnlessRaining { signal: MarketSignal, template: String },
}

impl Headline {
    fn render(&self, conditions: &Conditions) -> Option<(MarketSignal, String)> {
        match self {
            Headline::Always { signal, text } => Some((*signal, text.clone())),
            Headline::UnlessRaining { .. } if conditions.raining => None,
            Headline::UnlessRaining { signal, template } => Some((
                *signal,
                template.replace("{temp}", &conditions.temperature_c.to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: &'static str,
    pub trigger: Trigger,
    /// `(category, multiplier)` pairs set when the rule fires.
    pub adjustments: Vec<(String, f64)>,
    pub headline: Headline,
}

impl Rule {
    pub fn multiplier_for(&self, category: &str) -> Option<f64> {
        self.adjustments.iter().find(|(c, _)| c == category).map(|(_, m)| *m)
    }
}

fn adjustments(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(c, m)| (c.to_string(), *m)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rain first, then the temperature overrides.
    pub fn standard() -> Self {
        Self::new(vec![
            Rule {
                name: "rain",
                trigger: Trigger::Raining,
                adjustments: adjustments(&[("Monsoon", 3.5), ("Summer", 0.2)]),
                headline: Headline::Always {
                    signal: MarketSignal::RainAlert,
                    text: "Rain Alert: Monsoon Spike".into(),
                },
            },
            Rule {
                name: "low-temp",
                trigger: Trigger::TempBelow(LOW_TEMP_THRESHOLD_C),
                adjustments: adjustments(&[("Summer", 0.05), ("Winter", 2.5)]),
                headline: Headline::UnlessRaining {
                    signal: MarketSignal::LowTemp,
                    template: "Low Temp ({temp}°C): Winter Surge".into(),
                },
            },
            Rule {
                name: "high-heat",
                trigger: Trigger::TempAbove(HIGH_TEMP_THRESHOLD_C),
                adjustments: adjustments(&[("Winter", 0.05), ("Summer", 2.0)]),
                headline: Headline::UnlessRaining {
                    signal: MarketSignal::HighHeat,
                    template: "High Heat ({temp}°C): Summer Surge".into(),
                },
            },
        ])
    }

    /// Rules that fire for `conditions`, in application order.
    pub fn fired<'a>(&'a self, conditions: &'a Conditions) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| r.trigger.fires(conditions))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DemandEngine {
    rules: RuleSet,
}

impl DemandEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Annotate `inventory` with weather-adjusted demand.
    ///
    /// Pure: the same inputs always give the same report. An empty inventory
    /// yields [`DemandReport::no_data`].
    pub fn calculate(&self, inventory: &[InventoryRow], weather: &WeatherReading) -> DemandReport {
        if inventory.is_empty() {
            return DemandReport::no_data();
        }

        let conditions = Conditions::from_reading(weather);
        let fired: Vec<&Rule> = self.rules.fired(&conditions).collect();

        let mut signal = MarketSignal::Stable;
        let mut message = "Market Stable".to_string();
        for rule in &fired {
            if let Some((s, m)) = rule.headline.render(&conditions) {
                signal = s;
                message = m;
            }
        }

        let rows = inventory
            .iter()
            .map(|row| {
                // Last firing rule that names the category wins.
                let multiplier = fired
                    .iter()
                    .rev()
                    .find_map(|rule| rule.multiplier_for(&row.category))
                    .unwrap_or(1.0);
                annotate(row, multiplier)
            })
            .collect();

        DemandReport { rows, message, signal }
    }
}

/// `floor(base * multiplier)`, clamped to the `u64` range.
fn scaled_demand(base_demand: u64, multiplier: f64) -> u64 {
    let scaled = (base_demand as f64 * multiplier).floor();
    if scaled >= u64::MAX as f64 {
        u64::MAX
    } else if scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

fn annotate(row: &InventoryRow, multiplier: f64) -> DemandRow {
    let predicted_demand = scaled_demand(row.base_demand, multiplier);

    DemandRow {
        product_id: row.product_id.clone(),
        category: row.category.clone(),
        base_demand: row.base_demand,
        current_stock: row.current_stock,
        multiplier,
        predicted_demand,
        status: RestockStatus::classify(predicted_demand, row.current_stock),
    }
}
