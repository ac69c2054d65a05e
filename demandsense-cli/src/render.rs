//! Human-friendly and JSON output for a [`Frame`].

use demandsense_core::{
    DashboardView, DemandRow, MarketSignal, RestockStatus,
    dashboard::{ActionsPanel, ChartBar},
};

use crate::app::Frame;

pub const DEFAULT_WIDTH: usize = 80;

/// Terminal width from `COLUMNS`, falling back to 80.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|w: &usize| *w >= 40)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn json(frame: &Frame) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(frame)?)
}

pub fn text(frame: &Frame, width: usize) -> String {
    match frame {
        Frame::Idle { message } => format!("👈 {message}\n"),
        Frame::ConnectionError { error } => format!("Connection Error: {error}\n"),
        Frame::NoData { message } => format!("{} {message}\n", icon(MarketSignal::NoData)),
        Frame::Dashboard(view) => dashboard(view, width),
    }
}

fn icon(signal: MarketSignal) -> &'static str {
    match signal {
        MarketSignal::Stable => "✅",
        MarketSignal::RainAlert => "🌧️",
        MarketSignal::LowTemp => "❄️",
        MarketSignal::HighHeat => "☀️",
        MarketSignal::NoData => "❌",
    }
}

fn rule(width: usize) -> String {
    "─".repeat(width)
}

fn heading(title: &str, width: usize) -> String {
    let pad = width.saturating_sub(title.chars().count() + 4);
    format!("── {title} {}\n", "─".repeat(pad))
}

fn dashboard(view: &DashboardView, width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", view.title));
    out.push_str(&format!("{}\n", view.caption));
    out.push_str(&format!("{} {}\n", icon(view.signal), view.message));
    out.push_str(&format!("{}\n", rule(width)));

    let label_w = view.kpis.iter().map(|k| k.label.chars().count()).max().unwrap_or(0);
    let value_w = view.kpis.iter().map(|k| k.value.chars().count()).max().unwrap_or(0);
    for kpi in &view.kpis {
        out.push_str(&format!(
            "{:<label_w$}  {:>value_w$}  ({})\n",
            kpi.label, kpi.value, kpi.delta
        ));
    }

    out.push('\n');
    out.push_str(&heading("Demand Velocity", width));
    out.push_str(&chart(&view.chart, width));

    out.push('\n');
    out.push_str(&heading("Actions", width));
    match &view.actions {
        ActionsPanel::Healthy { message } => out.push_str(&format!("{message}\n")),
        ActionsPanel::Critical { headline, items } => {
            out.push_str(&format!("{headline}\n"));
            let id_w = items.iter().map(|i| i.product_id.chars().count()).max().unwrap_or(0);
            for item in items {
                out.push_str(&format!("  {:<id_w$}  {}\n", item.product_id, item.predicted_demand));
            }
        }
    }

    out.push('\n');
    out.push_str(&heading("Full Log", width));
    out.push_str(&table(&view.rows));

    out.push_str(&format!("\nGenerated {}\n", view.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
    out
}

/// Horizontal bars, longest first. `!` marks products that need restock.
fn chart(bars: &[ChartBar], width: usize) -> String {
    let Some(max) = bars.iter().map(|b| b.predicted_demand).max() else {
        return String::new();
    };

    let id_w = bars.iter().map(|b| b.product_id.chars().count()).max().unwrap_or(0);
    let num_w = bars.iter().map(|b| b.predicted_demand.to_string().len()).max().unwrap_or(1);
    // id, spaces, number, marker
    let bar_room = width.saturating_sub(id_w + num_w + 6).max(10);

    let mut out = String::new();
    for bar in bars {
        let len = if max == 0 {
            0
        } else {
            ((bar.predicted_demand as f64 / max as f64) * bar_room as f64).round() as usize
        };
        let fill = match bar.status {
            RestockStatus::Restock => "█",
            RestockStatus::Ok => "▒",
        };
        let marker = if bar.status.needs_restock() { " !" } else { "" };

        out.push_str(&format!(
            "{:<id_w$} {:<bar_room$} {:>num_w$}{marker}\n",
            bar.product_id,
            fill.repeat(len),
            bar.predicted_demand,
        ));
    }
    out
}

fn table(rows: &[DemandRow]) -> String {
    const HEADERS: [&str; 7] = [
        "product_id",
        "category",
        "base_demand",
        "current_stock",
        "multiplier",
        "predicted_demand",
        "status",
    ];

    let cells: Vec<[String; 7]> = rows
        .iter()
        .map(|r| {
            let status = match r.status {
                RestockStatus::Restock => format!("{} !", r.status),
                RestockStatus::Ok => r.status.to_string(),
            };
            [
                r.product_id.clone(),
                r.category.clone(),
                r.base_demand.to_string(),
                r.current_stock.to_string(),
                format!("{:.2}", r.multiplier),
                r.predicted_demand.to_string(),
                status,
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = table_line(&HEADERS, &widths);
    for row in &cells {
        let cols: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&table_line(&cols, &widths));
    }
    out
}

fn table_line(cols: &[&str], widths: &[usize]) -> String {
    let joined: Vec<String> =
        cols.iter().zip(widths).map(|(c, &w)| format!("{c:<w$}")).collect();
    format!("{}\n", joined.join("  ").trim_end())
}
