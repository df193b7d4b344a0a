// Adapters layer: concrete implementations for external systems
// (browser, HTTP APIs, gateways, files)

#[cfg(feature = "browser")]
pub mod browser;
pub mod csv_sink;
pub mod fxhash_api;
pub mod gateway;
pub mod source;
pub mod storage;
