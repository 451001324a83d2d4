use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use ambutrack_core::app::{current_datetime_text, App, FormInput};
use ambutrack_core::config::AppConfig;
use ambutrack_core::logs;
use ambutrack_core::route_animator::Phase;

/// Headless console shell: list locations, or submit one trip and watch the
/// animation run to completion.
///
///   ambutrack                                  list pickup locations
///   ambutrack <location> <patient> <driver> [purpose] [notes]
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("AMBUTRACK_CONFIG")
        .unwrap_or_else(|_| "ambutrack.toml".to_string());
    let config = match AppConfig::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{config_path}: {err:#}; using defaults");
            AppConfig::default()
        }
    };
    logs::init(".")?;

    let app = App::new(config);
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        let locations = app.load_locations().await?;
        let odometer = app.prefill_odometer().await;
        let (date, time) = current_datetime_text();
        println!("{} {} | odometer {}", date, time, odometer);
        println!("Pickup locations:");
        for location in &locations {
            println!("  {} ({}, {})", location.name, location.lat, location.lon);
        }
        println!("CSV export: {}", app.export_csv_url());
        return Ok(());
    }

    let form = FormInput {
        location_name: args[0].clone(),
        patient_name: args.get(1).cloned().unwrap_or_default(),
        driver_name: args.get(2).cloned().unwrap_or_default(),
        purpose: args.get(3).cloned().unwrap_or_else(|| "pickup".to_string()),
        notes: args.get(4).cloned().unwrap_or_default(),
        pickup: None,
    };

    info!("submitting trip to {}", form.location_name);
    if let Err(err) = app.submit_trip(form).await {
        error!("{err:#}");
        for notification in app.take_notifications() {
            eprintln!("[{:?}] {}", notification.kind, notification.message);
        }
        std::process::exit(1);
    }

    if let Some(summary) = app.summary() {
        println!("Distance:  {}", summary.distance_text);
        println!("Duration:  {}", summary.duration_text);
        println!("Departure: {}", summary.departure_text);
        println!("Arrival:   {}", summary.arrival_text);
        println!("Odometer:  {}", summary.odometer_text);
    }

    // follow the marker until it arrives
    let mut seen_version = None;
    while app.animation_phase() == Phase::Running {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let map = app.routing_map();
        if map.changed_since(seen_version) {
            seen_version = Some(map.version());
            if let Some(marker) = map.ambulance() {
                println!(
                    "ambulance at ({:.5}, {:.5}) heading {:.0}°{}",
                    marker.position.latitude,
                    marker.position.longitude,
                    marker.heading,
                    marker
                        .popup
                        .as_deref()
                        .map(|p| format!(" — {p}"))
                        .unwrap_or_default()
                );
            }
        }
    }

    for notification in app.take_notifications() {
        eprintln!("[{:?}] {}", notification.kind, notification.message);
    }
    Ok(())
}
