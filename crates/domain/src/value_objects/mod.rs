pub mod color;
pub mod geo_point;
pub mod provider_config;
pub mod tracker_config;
