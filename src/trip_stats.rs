use std::collections::HashMap;

/// One logged trip, as much of it as the statistics need.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub pickup_location: String,
    pub distance_km: f64,
    pub duration_minutes: f64,
    /// Departure wall clock as "HH:MM"; absent when the backend did not
    /// report one.
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripStatistics {
    pub total_trips: usize,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    pub avg_distance_km: f64,
    pub avg_duration_minutes: f64,
    pub most_common_location: String,
    pub most_common_location_count: u64,
}

/// Totals and averages over the logged trips. `None` when there is nothing
/// to aggregate.
pub fn calculate_statistics(trips: &[TripRecord]) -> Option<TripStatistics> {
    if trips.is_empty() {
        return None;
    }

    let total_distance_km: f64 = trips.iter().map(|t| t.distance_km).sum();
    let total_duration_minutes: f64 = trips.iter().map(|t| t.duration_minutes).sum();

    let mut location_counts: HashMap<&str, u64> = HashMap::new();
    for trip in trips {
        *location_counts.entry(trip.pickup_location.as_str()).or_insert(0) += 1;
    }
    // break count ties by name so the result is stable
    let (most_common_location, most_common_location_count) = location_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))?;

    let count = trips.len() as f64;
    Some(TripStatistics {
        total_trips: trips.len(),
        total_distance_km,
        total_duration_minutes,
        avg_distance_km: total_distance_km / count,
        avg_duration_minutes: total_duration_minutes / count,
        most_common_location: most_common_location.to_string(),
        most_common_location_count,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakHours {
    pub peak_hour: u32,
    pub peak_count: u32,
    pub hourly_distribution: [u32; 24],
}

/// Departure-hour histogram. Trips with no (or unparsable) time are left out
/// of the distribution.
pub fn analyze_peak_hours(trips: &[TripRecord]) -> PeakHours {
    let mut hourly_distribution = [0u32; 24];
    for trip in trips {
        let hour = trip
            .time
            .as_deref()
            .and_then(|t| t.split(':').next())
            .and_then(|h| h.parse::<u32>().ok());
        match hour {
            Some(hour) if hour < 24 => hourly_distribution[hour as usize] += 1,
            _ => {}
        }
    }
    let peak_hour = hourly_distribution
        .iter()
        .enumerate()
        .max_by_key(|(_, count)| **count)
        .map(|(hour, _)| hour as u32)
        .unwrap_or(0);
    PeakHours {
        peak_hour,
        peak_count: hourly_distribution[peak_hour as usize],
        hourly_distribution,
    }
}
