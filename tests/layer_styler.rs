use ambutrack_core::layer_styler::{
    style_for_frequency, style_for_time_bucket, ISOCHRONE_BUCKETS,
};

#[test]
fn time_buckets_resolve_ascending() {
    let check = |secs: u32, color: &str| {
        assert_eq!(
            style_for_time_bucket(secs, &ISOCHRONE_BUCKETS).color,
            color,
            "value {secs}"
        );
    };
    check(0, "#fde725");
    check(60, "#fde725");
    check(121, "#5dc963");
    check(200, "#21918c");
    check(301, "#3b528b");
}

#[test]
fn boundary_values_stay_in_the_lower_bucket() {
    let check = |secs: u32, color: &str| {
        assert_eq!(style_for_time_bucket(secs, &ISOCHRONE_BUCKETS).color, color);
    };
    check(120, "#fde725");
    check(180, "#5dc963");
    check(300, "#21918c");
    check(420, "#3b528b");
}

#[test]
fn values_past_the_top_bucket_use_the_last_style() {
    assert_eq!(
        style_for_time_bucket(10_000, &ISOCHRONE_BUCKETS).color,
        "#3b528b"
    );
}

#[test]
fn frequency_weight_is_monotonic() {
    let max = 100;
    let mut last_weight = 0;
    for count in 0..=max {
        let weight = style_for_frequency(count, max).weight;
        assert!(
            weight >= last_weight,
            "weight dropped from {last_weight} to {weight} at count {count}"
        );
        last_weight = weight;
    }
}

#[test]
fn frequency_tier_edges() {
    // all-zero data must not divide by zero and lands in the lowest tier
    let lowest = style_for_frequency(0, 0);
    assert_eq!(lowest.color, "#6e6e6e");
    assert_eq!(lowest.weight, 2);

    let highest = style_for_frequency(7, 7);
    assert_eq!(highest.color, "#c62828");
    assert_eq!(highest.weight, 8);

    // the tier thresholds themselves
    assert_eq!(style_for_frequency(70, 100).color, "#c62828");
    assert_eq!(style_for_frequency(69, 100).color, "#e53935");
    assert_eq!(style_for_frequency(50, 100).color, "#e53935");
    assert_eq!(style_for_frequency(30, 100).color, "#ff8f00");
    assert_eq!(style_for_frequency(15, 100).color, "#ffb300");
    assert_eq!(style_for_frequency(14, 100).color, "#6e6e6e");
}

#[test]
fn isochrone_styles_fill_their_polygons() {
    for bucket in &ISOCHRONE_BUCKETS {
        assert_eq!(bucket.style.fill_color, Some(bucket.style.color));
        assert_eq!(bucket.style.weight, 2);
    }
}
