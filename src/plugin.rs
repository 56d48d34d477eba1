//! Build-tool plugin surface.
//!
//! A host drives a [`Plugin`] through two hooks per build:
//!
//! 1. [`Plugin::config_resolved`] once the host configuration is final
//! 2. [`Plugin::transform_index_html`] for each emitted HTML document
//!
//! [`SriPlugin`] is the integrity injector. Its settings are replaced on every
//! `config_resolved` call, so nothing leaks from one build into the next.

use std::future::Future;

use crate::annotate::annotate;
use crate::bundle::Bundle;
use crate::config::{DEFAULT_BASE, PluginConfig};
use crate::error::SriError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::log;

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "html-sri";

/// Which host commands the plugin takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    Serve,
    Build,
}

/// Ordering relative to other plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforce {
    Pre,
    Post,
}

/// Static registration data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMeta {
    pub name: &'static str,
    pub apply: Apply,
    pub enforce: Enforce,
}

/// Final host configuration, as seen by plugins.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// Public base path. `None` means the host default `/`.
    pub base: Option<String>,
}

/// Per-document data for [`Plugin::transform_index_html`].
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Artifacts emitted by the current build.
    pub bundle: &'a Bundle,
}

/// Hooks a host calls during a build.
pub trait Plugin {
    fn meta(&self) -> PluginMeta;

    /// Receive the final host configuration.
    fn config_resolved(&mut self, config: &ResolvedConfig);

    /// Rewrite one HTML document.
    fn transform_index_html(
        &self,
        html: &str,
        ctx: &TransformContext<'_>,
    ) -> impl Future<Output = Result<String, SriError>> + Send;
}

/// Adds `integrity` attributes to scripts and stylesheets.
#[derive(Debug, Default)]
pub struct SriPlugin<F = HttpFetcher> {
    config: PluginConfig,
    fetcher: F,
}

impl SriPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: Fetch> SriPlugin<F> {
    /// Use a custom fetcher for remote resources.
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            config: PluginConfig::default(),
            fetcher,
        }
    }

    /// Settings from the last `config_resolved` call.
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }
}

impl<F: Fetch + Sync> Plugin for SriPlugin<F> {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: PLUGIN_NAME,
            apply: Apply::Build,
            enforce: Enforce::Post,
        }
    }

    fn config_resolved(&mut self, config: &ResolvedConfig) {
        let base = config.base.as_deref().unwrap_or(DEFAULT_BASE);
        self.config = PluginConfig::new(base);
    }

    async fn transform_index_html(
        &self,
        html: &str,
        ctx: &TransformContext<'_>,
    ) -> Result<String, SriError> {
        let annotated = annotate(html, ctx.bundle, &self.config, &self.fetcher).await?;

        let report = &annotated.report;
        if !report.unresolved.is_empty() {
            log!("sri"; "{} annotated, {} unresolved", report.annotated.len(), report.unresolved.len());
        }

        Ok(annotated.html)
    }
}
