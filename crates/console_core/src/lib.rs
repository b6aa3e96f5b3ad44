pub mod channel;
pub mod clock;
pub mod composer;
pub mod config;
pub mod directions;
pub mod geo;
pub mod map;
pub mod registry;
pub mod runner;
pub mod session;
pub mod systems;
pub mod telemetry;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
