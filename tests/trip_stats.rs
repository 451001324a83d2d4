use ambutrack_core::trip_stats::{analyze_peak_hours, calculate_statistics, TripRecord};

fn record(location: &str, km: f64, minutes: f64, time: Option<&str>) -> TripRecord {
    TripRecord {
        pickup_location: location.to_string(),
        distance_km: km,
        duration_minutes: minutes,
        time: time.map(|t| t.to_string()),
    }
}

#[test]
fn no_trips_no_statistics() {
    assert!(calculate_statistics(&[]).is_none());
}

#[test]
fn statistics_aggregate_totals_and_averages() {
    let trips = vec![
        record("Gulmohar Park", 4.0, 8.0, Some("08:30")),
        record("Powai Lake", 6.0, 12.0, Some("08:45")),
        record("Gulmohar Park", 2.0, 4.0, Some("14:10")),
    ];
    let stats = calculate_statistics(&trips).unwrap();
    assert_eq!(stats.total_trips, 3);
    assert_eq!(stats.total_distance_km, 12.0);
    assert_eq!(stats.total_duration_minutes, 24.0);
    assert_eq!(stats.avg_distance_km, 4.0);
    assert_eq!(stats.avg_duration_minutes, 8.0);
    assert_eq!(stats.most_common_location, "Gulmohar Park");
    assert_eq!(stats.most_common_location_count, 2);
}

#[test]
fn location_ties_break_by_name() {
    let trips = vec![
        record("Hiranandani", 1.0, 1.0, None),
        record("Gulmohar Park", 1.0, 1.0, None),
    ];
    let stats = calculate_statistics(&trips).unwrap();
    assert_eq!(stats.most_common_location, "Gulmohar Park");
    assert_eq!(stats.most_common_location_count, 1);
}

#[test]
fn peak_hours_build_a_histogram() {
    let trips = vec![
        record("A", 1.0, 1.0, Some("08:30")),
        record("B", 1.0, 1.0, Some("08:45")),
        record("C", 1.0, 1.0, Some("14:00")),
        record("D", 1.0, 1.0, None),
        record("E", 1.0, 1.0, Some("not a time")),
    ];
    let peak = analyze_peak_hours(&trips);
    assert_eq!(peak.peak_hour, 8);
    assert_eq!(peak.peak_count, 2);
    assert_eq!(peak.hourly_distribution[14], 1);
    assert_eq!(peak.hourly_distribution.iter().sum::<u32>(), 3);
}
