#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod app;
pub mod config;
pub mod geo;
pub mod layer_styler;
pub mod logs;
pub mod map_view;
pub mod route;
pub mod route_animator;
pub mod trip_stats;
pub mod trip_summary;
