//! Metric -> visual style lookups for the analysis overlays. Pure table
//! scans, no state.

/// The subset of polyline/polygon styling the rendering shell understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: &'static str,
    pub fill_color: Option<&'static str>,
    pub fill_opacity: f64,
    pub weight: u32,
    pub opacity: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeBucket {
    pub upper_bound_secs: u32,
    pub style: Style,
}

const fn iso_style(color: &'static str) -> Style {
    Style {
        color,
        fill_color: Some(color),
        fill_opacity: 0.4,
        weight: 2,
        opacity: 1.0,
    }
}

/// Viridis-ish ramp over reachable-time bands: 2 min yellow out to 7 min
/// blue. Ordered ascending; the last bucket is open-ended.
pub const ISOCHRONE_BUCKETS: [TimeBucket; 4] = [
    TimeBucket {
        upper_bound_secs: 120,
        style: iso_style("#fde725"),
    },
    TimeBucket {
        upper_bound_secs: 180,
        style: iso_style("#5dc963"),
    },
    TimeBucket {
        upper_bound_secs: 300,
        style: iso_style("#21918c"),
    },
    TimeBucket {
        upper_bound_secs: 420,
        style: iso_style("#3b528b"),
    },
];

/// First bucket whose upper bound covers `value_secs`, scanning ascending; a
/// value at a boundary resolves to that bucket, anything past the top bound
/// gets the last bucket.
pub fn style_for_time_bucket(value_secs: u32, buckets: &[TimeBucket]) -> Style {
    for bucket in buckets {
        if value_secs <= bucket.upper_bound_secs {
            return bucket.style;
        }
    }
    buckets.last().expect("bucket table must not be empty").style
}

const fn line_style(color: &'static str, weight: u32) -> Style {
    Style {
        color,
        fill_color: None,
        fill_opacity: 0.0,
        weight,
        opacity: 0.8,
    }
}

struct FrequencyTier {
    min_normalized: f64,
    style: Style,
}

// Scanned top-down: hottest tier first. Weight and warmth both increase with
// the normalized count, which is what keeps the ramp monotonic.
const FREQUENCY_TIERS: [FrequencyTier; 5] = [
    FrequencyTier {
        min_normalized: 0.7,
        style: line_style("#c62828", 8),
    },
    FrequencyTier {
        min_normalized: 0.5,
        style: line_style("#e53935", 6),
    },
    FrequencyTier {
        min_normalized: 0.3,
        style: line_style("#ff8f00", 4),
    },
    FrequencyTier {
        min_normalized: 0.15,
        style: line_style("#ffb300", 3),
    },
    FrequencyTier {
        min_normalized: 0.0,
        style: line_style("#6e6e6e", 2),
    },
];

/// Style for a segment used `count` times out of a maximum of `max_count`.
/// `max_count` is clamped to 1 so an all-zero dataset lands in the lowest
/// tier instead of dividing by zero.
pub fn style_for_frequency(count: u64, max_count: u64) -> Style {
    let normalized = count as f64 / max_count.max(1) as f64;
    for tier in &FREQUENCY_TIERS {
        if normalized >= tier.min_normalized {
            return tier.style;
        }
    }
    FREQUENCY_TIERS[FREQUENCY_TIERS.len() - 1].style
}
