//! Static sub-meter reference data.

use std::ops::RangeInclusive;

/// Synthetic id of the facility total shown alongside the meters.
pub const TOTAL_METER_ID: i32 = 0;
pub const TRANSFORMER_METER_ID: i32 = 12;
pub const GENERATOR_1_METER_ID: i32 = 13;
pub const GENERATOR_2_METER_ID: i32 = 14;

/// Zone meters summed into facility totals.
pub const FACILITY_METERS: RangeInclusive<i32> = 1..=11;
/// Meters listed on per-meter views (zones plus the transformer).
pub const DISPLAY_METERS: RangeInclusive<i32> = 1..=12;
/// Diesel generators. Never part of consumption aggregates.
pub const GENERATOR_METERS: RangeInclusive<i32> = GENERATOR_1_METER_ID..=GENERATOR_2_METER_ID;
/// Every metered feed, as listed in the meter-reading log.
pub const LOGGED_METERS: RangeInclusive<i32> = 1..=GENERATOR_2_METER_ID;

pub const UNKNOWN_CATEGORY: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMetadata {
    pub id: i32,
    pub name: &'static str,
    pub category: Option<&'static str>,
}

const ZONES: [ZoneMetadata; 14] = [
    zone(1, "PLATING", Some("C-49")),
    zone(2, "DIE CASTING+CB+CNC", Some("C-50")),
    zone(3, "SCOTCH BUFFING", Some("C-50")),
    zone(4, "BUFFING", Some("C-49")),
    zone(5, "SPRAY+EPL-I", Some("C-50")),
    zone(6, "SPRAY+ EPL-II", Some("C-49")),
    zone(7, "RUMBLE", Some("C-50")),
    zone(8, "AIR COMPRESSOR", Some("C-49")),
    zone(9, "TERRACE", Some("C-49")),
    zone(10, "TOOL ROOM", Some("C-50")),
    zone(11, "ADMIN BLOCK", Some("C-50")),
    zone(TRANSFORMER_METER_ID, "TRANSFORMER", None),
    zone(GENERATOR_1_METER_ID, "DIESEL GENERATOR - 1", None),
    zone(GENERATOR_2_METER_ID, "DIESEL GENERATOR - 2", None),
];

const fn zone(id: i32, name: &'static str, category: Option<&'static str>) -> ZoneMetadata {
    ZoneMetadata { id, name, category }
}

/// Known meters in display order.
pub fn all() -> &'static [ZoneMetadata] {
    &ZONES
}

pub fn lookup(id: i32) -> Option<&'static ZoneMetadata> {
    ZONES.iter().find(|z| z.id == id)
}

/// Display label for any meter id, never failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLabel {
    pub name: String,
    pub category: Option<String>,
}

pub fn label(id: i32) -> ZoneLabel {
    if id == TOTAL_METER_ID {
        return ZoneLabel {
            name: "TOTAL CONSUMPTION".to_string(),
            category: None,
        };
    }
    match lookup(id) {
        Some(zone) => ZoneLabel {
            name: zone.name.to_string(),
            category: zone.category.map(str::to_string),
        },
        None => ZoneLabel {
            name: format!("Zone {}", id),
            category: Some(UNKNOWN_CATEGORY.to_string()),
        },
    }
}
