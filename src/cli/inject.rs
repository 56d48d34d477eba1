//! `inject` command: annotate the entry HTML files of a finished build.

use std::{
    fs,
    io::{Write, stdout},
    path::Path,
};

use anyhow::{Context, Result};

use crate::bundle::Bundle;
use crate::config::SriConfig;
use crate::plugin::{Plugin, TransformContext};
use crate::{debug, log};

/// Run the plugin over every configured entry.
///
/// The bundle is the whole output directory. Every entry is transformed
/// before anything is written, so a failing entry leaves all files as they
/// were. With `dry` the transformed HTML goes to stdout and nothing is
/// written.
pub async fn inject<P: Plugin>(config: &SriConfig, plugin: &mut P, dry: bool) -> Result<()> {
    let output = config.output_dir();
    let bundle = Bundle::from_dir(&output)
        .with_context(|| format!("failed to read build output `{}`", output.display()))?;

    if bundle.is_empty() {
        log!("warning"; "build output `{}` is empty", output.display());
    }
    debug!("sri"; "loaded {} artifacts from `{}`", bundle.len(), output.display());

    plugin.config_resolved(&config.resolved());
    let ctx = TransformContext { bundle: &bundle };

    let mut results = Vec::new();
    for entry in config.entry_paths() {
        let name = display_path(&entry, &config.root);
        let html = fs::read_to_string(&entry)
            .with_context(|| format!("failed to read entry `{name}`"))?;

        let transformed = plugin
            .transform_index_html(&html, &ctx)
            .await
            .with_context(|| format!("failed to transform `{name}`"))?;

        let changed = transformed != html;
        results.push((entry, name, transformed, changed));
    }

    if dry {
        let mut out = stdout().lock();
        for (_, _, transformed, _) in &results {
            out.write_all(transformed.as_bytes())?;
        }
        out.flush()?;
        return Ok(());
    }

    for (entry, name, transformed, changed) in results {
        if !changed {
            log!("sri"; "{name} unchanged");
            continue;
        }
        fs::write(&entry, &transformed).with_context(|| format!("failed to write `{name}`"))?;
        log!("sri"; "{name} updated");
    }

    Ok(())
}

/// Path relative to the project root when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
