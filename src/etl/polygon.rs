use crate::data::tags::Tags;

enum PolygonMode {
    /// Any value except `no`.
    All,
    Whitelist(&'static [&'static str]),
}

struct PolygonRule {
    key: &'static str,
    mode: PolygonMode,
}

const POLYGON_RULES: &[PolygonRule] = &[
    PolygonRule { key: "building", mode: PolygonMode::All },
    PolygonRule { key: "building:part", mode: PolygonMode::All },
    PolygonRule { key: "landuse", mode: PolygonMode::All },
    PolygonRule {
        key: "natural",
        mode: PolygonMode::Whitelist(&[
            "wood", "forest", "scrub", "heath", "grassland", "fell", "bare_rock", "scree",
            "shingle", "sand", "mud", "water", "wetland", "glacier", "bay", "beach", "spring",
            "hot_spring", "rock", "stone", "sinkhole",
        ]),
    },
    PolygonRule {
        key: "leisure",
        mode: PolygonMode::Whitelist(&[
            "park", "garden", "pitch", "golf_course", "sports_centre", "stadium", "swimming_pool",
            "track", "playground", "common", "nature_reserve", "recreation_ground", "dog_park",
            "fitness_station",
        ]),
    },
    PolygonRule {
        key: "amenity",
        mode: PolygonMode::Whitelist(&[
            "parking", "school", "college", "university", "hospital", "kindergarten", "grave_yard",
            "marketplace", "fuel", "parking_space", "parking_entrance", "restaurant", "cafe",
            "fast_food", "bicycle_parking",
        ]),
    },
    PolygonRule {
        key: "highway",
        mode: PolygonMode::Whitelist(&["pedestrian", "services", "rest_area", "platform"]),
    },
    PolygonRule {
        key: "historic",
        mode: PolygonMode::Whitelist(&[
            "archaeological_site", "ruins", "castle", "fort", "memorial", "monument", "battlefield",
        ]),
    },
    PolygonRule { key: "water", mode: PolygonMode::All },
    PolygonRule {
        key: "waterway",
        mode: PolygonMode::Whitelist(&["riverbank", "dock", "boatyard", "dam", "waterfall"]),
    },
    PolygonRule { key: "boundary", mode: PolygonMode::All },
    PolygonRule {
        key: "man_made",
        mode: PolygonMode::Whitelist(&[
            "pier", "breakwater", "groyne", "reservoir_covered", "bridge", "tower", "lighthouse",
            "windmill", "works", "watermill", "wastewater_plant", "water_works", "storage_tank",
            "silo", "telescope",
        ]),
    },
    PolygonRule {
        key: "military",
        mode: PolygonMode::Whitelist(&[
            "airfield", "bunker", "barracks", "danger_area", "range", "naval_base", "training_area",
        ]),
    },
    PolygonRule {
        key: "tourism",
        mode: PolygonMode::Whitelist(&[
            "attraction", "camp_site", "caravan_site", "picnic_site", "theme_park", "zoo", "museum",
            "hotel", "motel", "guest_house", "hostel",
        ]),
    },
    PolygonRule { key: "shop", mode: PolygonMode::All },
    PolygonRule {
        key: "aeroway",
        mode: PolygonMode::Whitelist(&[
            "aerodrome", "heliport", "terminal", "hangar", "apron", "taxiway", "runway",
        ]),
    },
    PolygonRule {
        key: "place",
        mode: PolygonMode::Whitelist(&[
            "city", "town", "village", "hamlet", "suburb", "neighbourhood", "island", "islet",
        ]),
    },
    PolygonRule {
        key: "power",
        mode: PolygonMode::Whitelist(&["plant", "substation", "generator", "transformer"]),
    },
    PolygonRule {
        key: "public_transport",
        mode: PolygonMode::Whitelist(&["platform", "station"]),
    },
    PolygonRule { key: "office", mode: PolygonMode::All },
    PolygonRule { key: "area", mode: PolygonMode::All },
];

fn rule_for(key: &str) -> Option<&'static PolygonRule> {
    POLYGON_RULES.iter().find(|rule| rule.key == key)
}

/// Whether a closed way with these tags describes an area rather than a loop
/// of line. `area=no` always means line. Coerced booleans compare as
/// `yes`/`no`.
pub fn is_polygon(tags: &Tags) -> bool {
    if tags.get("area").is_some_and(|value| value.is_no()) {
        return false;
    }

    tags.iter().any(|(key, value)| {
        let Some(rule) = rule_for(key) else {
            return false;
        };
        if value.is_no() {
            return false;
        }
        match rule.mode {
            PolygonMode::All => true,
            PolygonMode::Whitelist(values) => values.contains(&&*value.as_osm_str()),
        }
    })
}
