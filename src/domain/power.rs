//! Instantaneous power readings: per-meter first/last readings, minute
//! demand above a ceiling and generator on/off transitions.

use super::range::{minute_floor, DateRange};
use super::reading::{round1, selected, MeterReading};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// First and last reading of one meter inside a window.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingBounds {
    pub energy_meter_id: i32,
    pub first: MeterReading,
    pub last: MeterReading,
}

/// Facility apparent power for one minute: the per-meter average over the
/// minute, summed across meters.
#[derive(Debug, Clone, PartialEq)]
pub struct MinuteDemand {
    pub minute: NaiveDateTime,
    pub kva: f64,
}

/// A reading where a generator's running state differs from its previous
/// reading.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorTransition {
    pub energy_meter_id: i32,
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    Started,
    Stopped,
}

impl GeneratorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorStatus::Started => "DG started",
            GeneratorStatus::Stopped => "DG stopped",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "DG started" => Some(GeneratorStatus::Started),
            "DG stopped" => Some(GeneratorStatus::Stopped),
            _ => None,
        }
    }
}

/// Start or stop of a generator. A stop carries the counter value of the
/// matching start when that start is inside the window.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorEvent {
    pub status: GeneratorStatus,
    pub energy_meter_id: i32,
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
    pub start_kwh: Option<f64>,
}

/// Ordered by meter. Ties on timestamp keep the earliest stored reading.
pub fn reading_bounds(
    readings: &[MeterReading],
    range: &DateRange,
    meters: &RangeInclusive<i32>,
) -> Vec<ReadingBounds> {
    let mut bounds: BTreeMap<i32, ReadingBounds> = BTreeMap::new();
    for r in selected(readings, range, meters) {
        bounds
            .entry(r.energy_meter_id)
            .and_modify(|b| {
                if r.timestamp < b.first.timestamp {
                    b.first = r.clone();
                }
                if r.timestamp > b.last.timestamp {
                    b.last = r.clone();
                }
            })
            .or_insert_with(|| ReadingBounds {
                energy_meter_id: r.energy_meter_id,
                first: r.clone(),
                last: r.clone(),
            });
    }
    bounds.into_values().collect()
}

/// Minutes whose summed kVA is strictly above `threshold_kva`, ordered by
/// minute.
pub fn minute_demand_above(
    readings: &[MeterReading],
    range: &DateRange,
    meters: &RangeInclusive<i32>,
    threshold_kva: f64,
) -> Vec<MinuteDemand> {
    let mut samples: BTreeMap<(NaiveDateTime, i32), (f64, u32)> = BTreeMap::new();
    for r in selected(readings, range, meters) {
        let entry = samples
            .entry((minute_floor(r.timestamp), r.energy_meter_id))
            .or_insert((0.0, 0));
        entry.0 += r.total_kva;
        entry.1 += 1;
    }

    let mut minutes: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for ((minute, _), (sum, n)) in samples {
        *minutes.entry(minute).or_insert(0.0) += sum / f64::from(n);
    }

    minutes
        .into_iter()
        .filter(|(_, kva)| *kva > threshold_kva)
        .map(|(minute, kva)| MinuteDemand {
            minute,
            kva: round1(kva),
        })
        .collect()
}

/// A generator is running while its `total_kw` exceeds `running_kw`. The
/// first reading of each meter only sets the initial state. Ordered by
/// timestamp, then meter.
pub fn generator_transitions(
    readings: &[MeterReading],
    range: &DateRange,
    meters: &RangeInclusive<i32>,
    running_kw: f64,
) -> Vec<GeneratorTransition> {
    let mut rows: Vec<&MeterReading> = selected(readings, range, meters).collect();
    rows.sort_by(|a, b| (a.energy_meter_id, a.timestamp).cmp(&(b.energy_meter_id, b.timestamp)));

    let mut out = Vec::new();
    let mut previous: Option<(i32, bool)> = None;
    for r in rows {
        let running = r.total_kw > running_kw;
        if let Some((meter, was_running)) = previous {
            if meter == r.energy_meter_id && was_running != running {
                out.push(GeneratorTransition {
                    energy_meter_id: r.energy_meter_id,
                    timestamp: r.timestamp,
                    kwh: r.kwh,
                    running,
                });
            }
        }
        previous = Some((r.energy_meter_id, running));
    }
    out.sort_by(|a, b| (a.timestamp, a.energy_meter_id).cmp(&(b.timestamp, b.energy_meter_id)));
    out
}

/// Pair each stop with the latest unmatched start of the same generator.
pub fn generator_events(transitions: &[GeneratorTransition]) -> Vec<GeneratorEvent> {
    let mut started_at: BTreeMap<i32, f64> = BTreeMap::new();
    transitions
        .iter()
        .map(|t| {
            let (status, start_kwh) = if t.running {
                started_at.insert(t.energy_meter_id, t.kwh);
                (GeneratorStatus::Started, None)
            } else {
                (GeneratorStatus::Stopped, started_at.remove(&t.energy_meter_id))
            };
            GeneratorEvent {
                status,
                energy_meter_id: t.energy_meter_id,
                timestamp: t.timestamp,
                kwh: t.kwh,
                start_kwh,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::range::WIRE_FORMAT;
    use pretty_assertions::assert_eq;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, WIRE_FORMAT).unwrap()
    }

    fn day() -> DateRange {
        DateRange::new(ts("2025-04-01 00:00:00"), ts("2025-04-01 23:59:59")).unwrap()
    }

    fn power(meter: i32, at: &str, kwh: f64, kw: f64, kva: f64) -> MeterReading {
        MeterReading::new(meter, ts(at), kwh, kwh).with_power(kw, kva)
    }

    #[test]
    fn test_reading_bounds_pick_first_and_last_per_meter() {
        let readings = vec![
            power(2, "2025-04-01 09:00:00", 20.0, 0.0, 0.0),
            power(1, "2025-04-01 10:00:00", 12.0, 0.0, 0.0),
            power(1, "2025-04-01 08:00:00", 10.0, 0.0, 0.0),
            power(1, "2025-04-01 09:00:00", 11.0, 0.0, 0.0),
            power(1, "2025-04-02 09:00:00", 99.0, 0.0, 0.0),
        ];
        let bounds = reading_bounds(&readings, &day(), &(1..=14));

        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].energy_meter_id, 1);
        assert_eq!(bounds[0].first.kwh, 10.0);
        assert_eq!(bounds[0].last.kwh, 12.0);
        // a single reading is both first and last
        assert_eq!(bounds[1].first, bounds[1].last);
    }

    #[test]
    fn test_minute_demand_averages_per_meter_then_sums() {
        let readings = vec![
            power(1, "2025-04-01 08:00:05", 0.0, 0.0, 300.0),
            power(1, "2025-04-01 08:00:35", 0.0, 0.0, 400.0),
            power(2, "2025-04-01 08:00:10", 0.0, 0.0, 250.0),
            power(1, "2025-04-01 08:01:00", 0.0, 0.0, 100.0),
            // generators are not part of facility demand
            power(13, "2025-04-01 08:01:00", 0.0, 0.0, 900.0),
        ];
        let above = minute_demand_above(&readings, &day(), &(1..=11), 596.0);
        assert_eq!(
            above,
            vec![MinuteDemand {
                minute: ts("2025-04-01 08:00:00"),
                kva: 600.0,
            }]
        );
    }

    #[test]
    fn test_minute_demand_at_threshold_is_not_reported() {
        let readings = vec![power(1, "2025-04-01 08:00:00", 0.0, 0.0, 596.0)];
        assert!(minute_demand_above(&readings, &day(), &(1..=11), 596.0).is_empty());
    }

    #[test]
    fn test_generator_transitions_and_events() {
        let readings = vec![
            power(13, "2025-04-01 08:00:00", 100.0, 0.0, 0.0),
            power(13, "2025-04-01 08:10:00", 101.0, 35.0, 40.0),
            power(13, "2025-04-01 08:20:00", 104.0, 36.0, 41.0),
            power(13, "2025-04-01 08:30:00", 106.5, 0.0, 0.0),
            // already running when the window opens
            power(14, "2025-04-01 08:05:00", 500.0, 20.0, 22.0),
            power(14, "2025-04-01 08:25:00", 510.0, 0.0, 0.0),
        ];
        let transitions = generator_transitions(&readings, &day(), &(13..=14), 0.0);
        assert_eq!(
            transitions
                .iter()
                .map(|t| (t.energy_meter_id, t.running))
                .collect::<Vec<_>>(),
            vec![(13, true), (14, false), (13, false)]
        );

        let events = generator_events(&transitions);
        assert_eq!(events[0].status, GeneratorStatus::Started);
        assert_eq!(events[0].kwh, 101.0);
        assert_eq!(events[1].status, GeneratorStatus::Stopped);
        assert_eq!(events[1].start_kwh, None);
        assert_eq!(
            events[2],
            GeneratorEvent {
                status: GeneratorStatus::Stopped,
                energy_meter_id: 13,
                timestamp: ts("2025-04-01 08:30:00"),
                kwh: 106.5,
                start_kwh: Some(101.0),
            }
        );
    }

    #[test]
    fn test_status_labels() {
        for status in [GeneratorStatus::Started, GeneratorStatus::Stopped] {
            assert_eq!(GeneratorStatus::from_label(status.as_str()), Some(status));
        }
        assert_eq!(GeneratorStatus::from_label("DG idle"), None);
    }
}
