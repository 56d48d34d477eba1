//! Subresource integrity injection for built HTML.
//!
//! Adds `integrity="sha384-..."` to every `<script src>` and
//! `<link rel="stylesheet" href>` whose resource can be found either in the
//! build output ([`Bundle`]) or at an absolute `http(s)` URL.
//!
//! # Example
//!
//! ```ignore
//! let bundle: Bundle = [("main.js", Artifact::chunk("console.log(1)"))]
//!     .into_iter()
//!     .collect();
//! let mut plugin = SriPlugin::new();
//! plugin.config_resolved(&ResolvedConfig::default());
//! let html = plugin
//!     .transform_index_html(r#"<script src="/main.js"></script>"#, &TransformContext { bundle: &bundle })
//!     .await?;
//! ```

pub mod annotate;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod integrity;
pub mod logger;
pub mod plugin;
pub mod resolve;
pub mod utils;

pub use annotate::{Annotated, Report, annotate};
pub use bundle::{Artifact, Bundle};
pub use config::PluginConfig;
pub use error::SriError;
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use integrity::Integrity;
pub use plugin::{Plugin, ResolvedConfig, SriPlugin, TransformContext};
