use super::metric::Metric;
use super::range::{hour_floor, DateRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Raw `modbus_data` row. `kwh` and `kvah` are cumulative counters;
/// `total_kw` and `total_kva` are instantaneous power at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub energy_meter_id: i32,
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
    pub kvah: f64,
    #[serde(default)]
    pub total_kw: f64,
    #[serde(default)]
    pub total_kva: f64,
}

impl MeterReading {
    pub fn new(energy_meter_id: i32, timestamp: NaiveDateTime, kwh: f64, kvah: f64) -> Self {
        Self {
            energy_meter_id,
            timestamp,
            kwh,
            kvah,
            total_kw: 0.0,
            total_kva: 0.0,
        }
    }

    pub fn with_power(mut self, total_kw: f64, total_kva: f64) -> Self {
        self.total_kw = total_kw;
        self.total_kva = total_kva;
        self
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Kwh => self.kwh,
            Metric::Kvah => self.kvah,
        }
    }
}

/// Consumption of one meter within one hour bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyMeterDelta {
    pub energy_meter_id: i32,
    pub hour: NaiveDateTime,
    pub delta: f64,
}

/// Consumption of one meter over a whole window.
#[derive(Debug, Clone, PartialEq)]
pub struct MeterDelta {
    pub energy_meter_id: i32,
    pub delta: f64,
}

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy)]
struct Extent {
    lo: f64,
    hi: f64,
}

impl Extent {
    fn new(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    fn push(&mut self, v: f64) {
        self.lo = self.lo.min(v);
        self.hi = self.hi.max(v);
    }
}

pub(crate) fn selected<'a>(
    readings: &'a [MeterReading],
    range: &'a DateRange,
    meters: &'a RangeInclusive<i32>,
) -> impl Iterator<Item = &'a MeterReading> + 'a {
    readings.iter().filter(move |r| {
        meters.contains(&r.energy_meter_id) && r.timestamp >= range.start && r.timestamp <= range.end
    })
}

/// Per meter and hour: `MAX(bucket) - MAX(previous bucket)`, or
/// `MAX - MIN` for the meter's first bucket in the window. Ordered by hour,
/// then meter.
pub fn hourly_meter_deltas(
    readings: &[MeterReading],
    range: &DateRange,
    metric: Metric,
    meters: &RangeInclusive<i32>,
) -> Vec<HourlyMeterDelta> {
    let mut buckets: BTreeMap<(i32, NaiveDateTime), Extent> = BTreeMap::new();
    for r in selected(readings, range, meters) {
        let v = r.value(metric);
        buckets
            .entry((r.energy_meter_id, hour_floor(r.timestamp)))
            .and_modify(|e| e.push(v))
            .or_insert_with(|| Extent::new(v));
    }

    let mut out = Vec::with_capacity(buckets.len());
    let mut previous: Option<(i32, f64)> = None;
    for ((meter, hour), extent) in buckets {
        let base = match previous {
            Some((prev_meter, prev_hi)) if prev_meter == meter => prev_hi,
            _ => extent.lo,
        };
        out.push(HourlyMeterDelta {
            energy_meter_id: meter,
            hour,
            delta: round1(extent.hi - base),
        });
        previous = Some((meter, extent.hi));
    }
    out.sort_by(|a, b| (a.hour, a.energy_meter_id).cmp(&(b.hour, b.energy_meter_id)));
    out
}

/// Per meter over the whole window: `MAX - MIN`, ordered by meter.
pub fn meter_deltas(
    readings: &[MeterReading],
    range: &DateRange,
    metric: Metric,
    meters: &RangeInclusive<i32>,
) -> Vec<MeterDelta> {
    let mut extents: BTreeMap<i32, Extent> = BTreeMap::new();
    for r in selected(readings, range, meters) {
        let v = r.value(metric);
        extents
            .entry(r.energy_meter_id)
            .and_modify(|e| e.push(v))
            .or_insert_with(|| Extent::new(v));
    }
    extents
        .into_iter()
        .map(|(energy_meter_id, e)| MeterDelta {
            energy_meter_id,
            delta: round1(e.hi - e.lo),
        })
        .collect()
}
