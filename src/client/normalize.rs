//! Reshapes sparse API responses into the dense structures charts expect.

use crate::api::models::{
    AlertsResponse, GeneratorStatusResponse, HeatmapCell, LoggedReading, MeterConsumptionRecord,
    MeterLogEntry, ZoneHourlyRecord,
};
use crate::domain::range::{parse_day, parse_hour_key, parse_timestamp, MAX_DAY_SPAN};
use crate::domain::zones::{
    self, DISPLAY_METERS, GENERATOR_1_METER_ID, GENERATOR_METERS, TOTAL_METER_ID,
    TRANSFORMER_METER_ID,
};
use crate::domain::{round1, round2, DayRange, GeneratorStatus, Metric};
use chrono::{NaiveDateTime, Timelike};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const HOURS_PER_DAY: usize = 24;

/// kg of CO2 per kWh drawn from the grid.
pub const EMISSION_FACTOR_KG_PER_KWH: f64 = 0.82;
/// Car distance equivalent of one kg of CO2.
pub const KM_PER_KG_CO2: f64 = 0.356;

/// A generator reporting within this many seconds of now is running.
pub const GENERATOR_RUNNING_WINDOW_SECS: i64 = 3;

/// Sum hour buckets into a 24-slot array indexed by hour of day. Missing
/// hours stay at 0; keys that are not timestamps are skipped. Sums keep the
/// two decimals that cost values carry.
pub fn hourly_series(data: &BTreeMap<String, f64>) -> [f64; HOURS_PER_DAY] {
    let mut series = [0.0; HOURS_PER_DAY];
    for (key, value) in data {
        match parse_hour_key(key) {
            Some(hour) => series[hour.hour() as usize] += value,
            None => debug!(key = %key, "skipping unparseable hour key"),
        }
    }
    for v in series.iter_mut() {
        *v = round2(*v);
    }
    series
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeterCard {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub consumption: f64,
}

impl MeterCard {
    fn new(id: i32, consumption: f64) -> Self {
        let label = zones::label(id);
        Self {
            id,
            name: label.name,
            category: label.category,
            consumption,
        }
    }
}

/// One card per display meter in declared order, defaulting to 0, with the
/// facility total spliced in just before the transformer.
pub fn meter_cards(records: &[MeterConsumptionRecord], total: f64) -> Vec<MeterCard> {
    let mut cards = Vec::with_capacity(DISPLAY_METERS.count() + 1);
    for id in DISPLAY_METERS {
        if id == TRANSFORMER_METER_ID {
            cards.push(MeterCard::new(TOTAL_METER_ID, total));
        }
        let consumption = records
            .iter()
            .find(|r| r.energy_meter_id == id)
            .map(|r| r.consumption)
            .unwrap_or(0.0);
        cards.push(MeterCard::new(id, consumption));
    }
    cards
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourValue {
    pub hour: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSeries {
    pub zone_id: i32,
    pub name: String,
    pub category: String,
    pub data: Vec<HourValue>,
}

/// Group per-meter hourly records by zone. Only zones present in the
/// response appear: known zones in metadata order, then unknown ids
/// ascending with their fallback label.
pub fn zone_series(records: &[ZoneHourlyRecord], metric: Metric) -> Vec<ZoneSeries> {
    let mut grouped: BTreeMap<i32, Vec<HourValue>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.energy_meter_id).or_default().push(HourValue {
            hour: r.hour.clone(),
            value: r.value(metric),
        });
    }

    let known: BTreeSet<i32> = zones::all().iter().map(|z| z.id).collect();
    let order = zones::all()
        .iter()
        .map(|z| z.id)
        .chain(grouped.keys().copied().filter(|id| !known.contains(id)))
        .collect::<Vec<_>>();

    order
        .into_iter()
        .filter_map(|id| {
            let data = grouped.remove(&id)?;
            let label = zones::label(id);
            Some(ZoneSeries {
                zone_id: id,
                name: label.name,
                category: label.category.unwrap_or_default(),
                data,
            })
        })
        .collect()
}

/// A `days x 24` grid for the heatmap, never more than [`MAX_DAY_SPAN`]
/// rows. Cells outside the window are dropped.
pub fn heatmap_grid(cells: &[HeatmapCell], days: &DayRange) -> Vec<[f64; HOURS_PER_DAY]> {
    let rows = days.num_days().min(MAX_DAY_SPAN as usize);
    let mut grid = vec![[0.0; HOURS_PER_DAY]; rows];
    for cell in cells {
        let Ok(day) = parse_day("day", &cell.day) else {
            debug!(day = %cell.day, "skipping unparseable heatmap day");
            continue;
        };
        if !days.contains(day) || cell.hour as usize >= HOURS_PER_DAY {
            continue;
        }
        let row = (day - days.first).num_days() as usize;
        if let Some(slots) = grid.get_mut(row) {
            slots[cell.hour as usize] = cell.total_consumption;
        }
    }
    grid
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Running,
    Off,
    /// No reading in the window.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorCard {
    pub id: i32,
    pub name: String,
    pub power_kw: Option<f64>,
    pub last_seen: Option<NaiveDateTime>,
    pub state: GeneratorState,
}

/// One card per generator, in meter order, whether or not it reported.
pub fn generator_cards(
    status: &GeneratorStatusResponse,
    now: NaiveDateTime,
) -> Vec<GeneratorCard> {
    GENERATOR_METERS
        .map(|id| {
            let reading = status.get(id);
            let last_seen = reading
                .and_then(|r| r.timestamp.as_deref())
                .and_then(|ts| parse_timestamp("timestamp", ts).ok());
            let state = match last_seen {
                Some(ts) if (now - ts).num_seconds().abs() <= GENERATOR_RUNNING_WINDOW_SECS => {
                    GeneratorState::Running
                }
                Some(_) => GeneratorState::Off,
                None => GeneratorState::Unknown,
            };
            GeneratorCard {
                id,
                name: zones::label(id).name,
                power_kw: reading.and_then(|r| r.total_kw),
                last_seen,
                state,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeterLogRow {
    pub zone_id: i32,
    pub label: String,
    pub start: Option<LoggedReading>,
    pub end: Option<LoggedReading>,
}

fn log_label(id: i32) -> String {
    match zones::lookup(id) {
        Some(z) => match z.category {
            Some(category) => format!("{} ({})", z.name, category),
            None => z.name.to_string(),
        },
        None => format!("Zone {}", id),
    }
}

/// Rows of the meter-reading log, in response order.
pub fn meter_log_rows(entries: &[MeterLogEntry]) -> Vec<MeterLogRow> {
    entries
        .iter()
        .map(|e| MeterLogRow {
            zone_id: e.zone,
            label: log_label(e.zone),
            start: e.min.clone(),
            end: e.max.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    PeakDemand,
    GeneratorStarted,
    GeneratorEnded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertItem {
    pub at: NaiveDateTime,
    pub kind: AlertKind,
    pub title: String,
    pub value: String,
    pub limit: Option<String>,
}

fn generator_number(meter: i32) -> i32 {
    meter - GENERATOR_1_METER_ID + 1
}

/// Peak-demand minutes and generator runs merged into one feed ordered by
/// time. A stop whose start lies before the window has no run length and
/// is left out.
pub fn alert_feed(body: &AlertsResponse) -> Vec<AlertItem> {
    let limit = format!("{} kVA", body.threshold_kva);
    let peaks = body.peak_demand_above_threshold.iter().filter_map(|p| {
        let at = parse_timestamp("minute", &p.minute).ok()?;
        Some(AlertItem {
            at,
            kind: AlertKind::PeakDemand,
            title: "Peak Demand".to_string(),
            value: format!("{} kVA", p.total_kva),
            limit: Some(limit.clone()),
        })
    });

    let generators = body.dg_activations.iter().filter_map(|a| {
        let at = parse_timestamp("timestamp", &a.timestamp).ok()?;
        let number = generator_number(a.meter);
        let (kind, title, value) = match GeneratorStatus::from_label(&a.status) {
            Some(GeneratorStatus::Started) => (
                AlertKind::GeneratorStarted,
                format!("DG{} Started", number),
                format!("{:.2} kWh", a.kwh),
            ),
            Some(GeneratorStatus::Stopped) => {
                let units = a.kwh - a.start_kwh?;
                (
                    AlertKind::GeneratorEnded,
                    format!("DG{} Ended", number),
                    format!("{:.2} kWh (Units: {:.2})", a.kwh, units),
                )
            }
            None => {
                debug!(status = %a.status, "skipping unknown generator status");
                return None;
            }
        };
        Some(AlertItem {
            at,
            kind,
            title,
            value,
            limit: None,
        })
    });

    let mut feed: Vec<AlertItem> = peaks.chain(generators).collect();
    feed.sort_by_key(|item| item.at);
    feed
}

/// Headline figures of the landing screen.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingSummary {
    pub kwh: f64,
    pub kvah: f64,
    pub peak_demand_kva: f64,
    pub cost: f64,
    pub currency: String,
    pub emissions_kg: f64,
    pub distance_km: f64,
}

impl LandingSummary {
    pub fn new(kwh: f64, kvah: f64, peak_demand_kva: f64, cost: f64, currency: String) -> Self {
        let emissions_kg = round1(kwh * EMISSION_FACTOR_KG_PER_KWH);
        Self {
            kwh,
            kvah,
            peak_demand_kva,
            cost,
            currency,
            emissions_kg,
            distance_km: round1(emissions_kg * KM_PER_KG_CO2),
        }
    }
}
