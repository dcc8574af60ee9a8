//! Configuration: `credvault.toml` loading and conversion into layer params.

pub mod settings;

pub use settings::Settings;
