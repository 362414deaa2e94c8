pub mod client;
pub mod config;
pub mod designer;
pub mod dispatch;
pub mod providers;
pub mod types;

// Re-exports for convenience
pub use client::{ClientError, DesignClient, DesignClientBuilder};
pub use config::{AppConfig, ConfigManager};
pub use designer::{DesignAdapter, DesignError, DesignerConfig};
pub use dispatch::{Action, DispatchError, Dispatcher};
pub use providers::google::GoogleProvider;
pub use providers::{Provider, ProviderError};
pub use types::*;
