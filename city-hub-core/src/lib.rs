//! Core library for the `city-hub` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over web-search providers (Tavily)
//! - The search invoker with its mock fallback
//! - Shaping provider output into per-use-case records
//!
//! It is used by `city-hub-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod invoker;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod service;

pub use config::{Config, ProviderConfig, Settings};
pub use invoker::{InvokeError, SearchInvoker};
pub use model::{NormalizedRecord, SearchDepth, SearchItem, SearchParameters, UseCase};
pub use provider::{ProviderError, ProviderId, SearchProvider};
pub use service::CityInfoService;
