//! Integrity annotation for script and stylesheet elements.
//!
//! One linear pass per call:
//!
//! ```text
//! parse → select → (resolve → hash → rewrite start tag)* → splice
//! ```
//!
//! Elements are found by scanning start tags, skipping comments and the text
//! of raw text elements. Edits are applied to the input text, so only the
//! `integrity` attribute of annotated start tags changes and all other bytes
//! are kept verbatim.

use std::ops::Range;

use crate::bundle::Bundle;
use crate::config::PluginConfig;
use crate::error::SriError;
use crate::fetch::Fetch;
use crate::integrity::Integrity;
use crate::resolve::{Resolution, Resolver};
use crate::utils::html::{StartTag, Unterminated, start_tags};
use crate::{debug, log};

/// Attribute written on every resolved element.
pub const INTEGRITY_ATTR: &str = "integrity";

/// Kind of element that can carry an integrity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<script src>`
    Script,
    /// `<link rel="stylesheet" href>`
    Stylesheet,
}

impl ElementKind {
    /// Tag name of this element kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "link",
        }
    }

    /// Attribute holding the resource reference.
    pub const fn reference_attr(self) -> &'static str {
        match self {
            Self::Script => "src",
            Self::Stylesheet => "href",
        }
    }
}

/// An element selected for annotation.
#[derive(Debug)]
struct Target<'h> {
    kind: ElementKind,
    /// Byte offset of the element's `<` in the document.
    start: usize,
    tag: StartTag<'h>,
    /// Entity-decoded reference value.
    reference: String,
}

/// A start tag replacement.
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// What one annotate call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// References that received an integrity value, in processing order.
    pub annotated: Vec<(String, Integrity)>,
    /// References that could not be resolved and were left untouched.
    pub unresolved: Vec<String>,
}

/// Transformed HTML plus its report.
#[derive(Debug, Clone)]
pub struct Annotated {
    pub html: String,
    pub report: Report,
}

/// Add `integrity` attributes to every resolvable script and stylesheet.
///
/// Scripts are processed before stylesheets, each group in document order.
/// Unresolvable references are logged and skipped; a failed remote fetch
/// aborts the whole call.
pub async fn annotate<F: Fetch>(
    html: &str,
    bundle: &Bundle,
    config: &PluginConfig,
    fetcher: &F,
) -> Result<Annotated, SriError> {
    let targets = select(html)?;
    let resolver = Resolver::new(config, bundle, fetcher);

    let mut edits = Vec::with_capacity(targets.len());
    let mut report = Report::default();

    for target in targets {
        let resolution = resolver.resolve(&target.reference).await?;

        let Some(content) = resolution.content() else {
            log!("warning"; "unable to resolve `{}`, <{}> left without integrity",
                target.reference, target.kind.tag());
            report.unresolved.push(target.reference);
            continue;
        };

        let integrity = Integrity::compute(content);
        match &resolution {
            Resolution::Bundle { key, .. } => {
                debug!("sri"; "{} -> {} (bundle `{}`)", target.reference, integrity, key)
            }
            _ => debug!("sri"; "{} -> {} (remote)", target.reference, integrity),
        }

        edits.push(Edit {
            range: target.start..target.start + target.tag.end(),
            replacement: target.tag.with_attr(INTEGRITY_ATTR, &integrity.to_string()),
        });
        report.annotated.push((target.reference, integrity));
    }

    Ok(Annotated {
        html: splice(html, edits),
        report,
    })
}

/// Find all eligible elements: scripts first, then stylesheets.
fn select(html: &str) -> Result<Vec<Target<'_>>, SriError> {
    let mut scripts = Vec::new();
    let mut stylesheets = Vec::new();

    for item in start_tags(html) {
        let (start, tag) = item.map_err(|Unterminated(offset)| {
            SriError::Parse(format!("unterminated start tag at byte {offset}"))
        })?;

        let name = tag.name();
        let kind = if name.eq_ignore_ascii_case(ElementKind::Script.tag()) {
            ElementKind::Script
        } else if name.eq_ignore_ascii_case(ElementKind::Stylesheet.tag()) {
            ElementKind::Stylesheet
        } else {
            continue;
        };

        if kind == ElementKind::Stylesheet && !is_stylesheet(&tag) {
            continue;
        }
        let Some(reference) = tag.attr(kind.reference_attr()) else {
            continue;
        };

        let target = Target {
            kind,
            start,
            reference: reference.decoded().into_owned(),
            tag,
        };
        match kind {
            ElementKind::Script => scripts.push(target),
            ElementKind::Stylesheet => stylesheets.push(target),
        }
    }

    scripts.append(&mut stylesheets);
    Ok(scripts)
}

/// Whether a `<link>` has `stylesheet` among its `rel` tokens.
fn is_stylesheet(tag: &StartTag<'_>) -> bool {
    tag.attr("rel").is_some_and(|rel| {
        rel.decoded()
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Apply non-overlapping edits to `html`.
fn splice(html: &str, mut edits: Vec<Edit>) -> String {
    if edits.is_empty() {
        return html.to_string();
    }
    edits.sort_by_key(|edit| edit.range.start);

    let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
    let mut out = String::with_capacity(html.len() + extra);
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&html[cursor..edit.range.start]);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(&html[cursor..]);
    out
}
