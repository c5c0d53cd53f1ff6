//! Layout composition.
//!
//! # Responsibilities
//! - Hold one request's composition state: the selected layout source and
//!   its replace/override/inject directives
//! - Resolve the layout through the origin fetcher and document transformer
//! - Apply directives and serialize the final page
//!
//! # Design Decisions
//! - The composer is request-scoped and consumed by `compose`; it is never
//!   pooled or shared across requests
//! - Directives apply in a fixed order: replacements first (they swap whole
//!   subtrees, so later directives see the final structure), then overrides,
//!   then injections (appended children are not themselves overridden)
//! - A directive whose selector matches nothing, or whose selector fails to
//!   parse, logs a warning and is skipped; composition never aborts for a
//!   single failed directive

use std::borrow::Cow;
use std::sync::Arc;

use lol_html::html_content::{ContentType, Element};
use lol_html::{rewrite_str, ElementContentHandlers, RewriteStrSettings, Selector};
use scraper::Html;
use thiserror::Error;

use crate::fetch::{FetchError, FetchOutcome, FetchResult, OriginFetcher};
use crate::transform::document::{DocumentTransformer, TransformError};

/// Error from layout composition. All variants are request-fatal.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// `compose` was called without any layout source having been set.
    /// Signals a caller-programming mistake, not an origin problem.
    #[error("no layout source was configured for this request")]
    LayoutNotConfigured,

    #[error("layout document not found at {path}")]
    LayoutNotFound { path: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Where the layout document comes from.
#[derive(Debug)]
pub enum LayoutSource {
    /// An origin path, fetched lazily at compose time.
    Path(String),
    /// A response already fetched for this request; no re-fetch happens.
    Fetched(FetchResult),
}

impl From<String> for LayoutSource {
    fn from(path: String) -> Self {
        LayoutSource::Path(path)
    }
}

impl From<&str> for LayoutSource {
    fn from(path: &str) -> Self {
        LayoutSource::Path(path.to_string())
    }
}

impl From<FetchResult> for LayoutSource {
    fn from(result: FetchResult) -> Self {
        LayoutSource::Fetched(result)
    }
}

/// An override directive: new inner HTML plus descendant selectors whose
/// matched content survives the override.
#[derive(Debug, Clone)]
struct OverrideDirective {
    html: String,
    except: Vec<String>,
}

/// Per-request layout composition state.
///
/// Callers choose a layout source (`set_layout` overwrites, last writer wins;
/// `set_default_layout` only fills an empty slot, first writer wins), stack
/// up directives in any order, and finally call [`compose`](Self::compose)
/// exactly once.
pub struct LayoutComposer {
    fetcher: Arc<OriginFetcher>,
    transformer: DocumentTransformer,
    source: Option<LayoutSource>,
    replacements: Vec<(String, String)>,
    overrides: Vec<(String, OverrideDirective)>,
    injections: Vec<(String, String)>,
}

impl LayoutComposer {
    pub fn new(fetcher: Arc<OriginFetcher>, transformer: DocumentTransformer) -> Self {
        Self {
            fetcher,
            transformer,
            source: None,
            replacements: Vec::new(),
            overrides: Vec::new(),
            injections: Vec::new(),
        }
    }

    /// Select the layout source, overwriting any previous choice.
    pub fn set_layout(&mut self, source: impl Into<LayoutSource>) {
        self.source = Some(source.into());
    }

    /// Select the layout source only if none was chosen yet.
    ///
    /// Lets a generic early stage propose a default that a more specific
    /// caller may already have replaced.
    pub fn set_default_layout(&mut self, source: impl Into<LayoutSource>) {
        if self.source.is_none() {
            self.source = Some(source.into());
        }
    }

    /// Replace every element matching `selector` with `html`.
    pub fn add_replacement(&mut self, selector: impl Into<String>, html: impl Into<String>) {
        upsert(&mut self.replacements, selector.into(), html.into());
    }

    /// Remove every element matching `selector`.
    pub fn remove_layout_element(&mut self, selector: impl Into<String>) {
        self.add_replacement(selector, "");
    }

    /// Replace the inner content of every element matching `selector`,
    /// preserving descendants matched by `except` selectors (re-appended
    /// after the new content).
    pub fn add_override(
        &mut self,
        selector: impl Into<String>,
        html: impl Into<String>,
        except: Vec<String>,
    ) {
        upsert(
            &mut self.overrides,
            selector.into(),
            OverrideDirective {
                html: html.into(),
                except,
            },
        );
    }

    /// Append `html` as a child of every element matching `selector`.
    pub fn add_injection(&mut self, selector: impl Into<String>, html: impl Into<String>) {
        upsert(&mut self.injections, selector.into(), html.into());
    }

    /// Resolve the layout, apply all directives, and serialize the page.
    ///
    /// Consumes the composer; the composition state cannot be reused.
    pub async fn compose(self) -> Result<String, ComposeError> {
        let LayoutComposer {
            fetcher,
            transformer,
            source,
            replacements,
            overrides,
            injections,
        } = self;

        let source = source.ok_or(ComposeError::LayoutNotConfigured)?;
        let document = match source {
            LayoutSource::Path(path) => {
                tracing::debug!(path = %path, "Fetching layout document");
                match fetcher.fetch(&path).await? {
                    FetchOutcome::Success(result) => transformer.rewrite(&result.body_text())?,
                    FetchOutcome::NotFound => return Err(ComposeError::LayoutNotFound { path }),
                }
            }
            LayoutSource::Fetched(result) => transformer.rewrite(&result.body_text())?,
        };

        let mut html = document.into_string();

        for (selector, replacement) in &replacements {
            html = apply_pass(&html, selector, "replacement", |el| {
                el.replace(replacement, ContentType::Html);
            });
        }

        for (selector, directive) in &overrides {
            let mut preserved = capture_preserved(&html, selector, &directive.except).into_iter();
            html = apply_pass(&html, selector, "override", |el| {
                let mut inner = directive.html.clone();
                if let Some(kept) = preserved.next() {
                    inner.push_str(&kept);
                }
                el.set_inner_content(&inner, ContentType::Html);
            });
        }

        for (selector, child) in &injections {
            html = apply_pass(&html, selector, "injection", |el| {
                el.append(child, ContentType::Html);
            });
        }

        // Last line of defense: any origin reference the tag rules did not
        // reach must still not leak to the client.
        Ok(transformer.rewriter().strip_origin(&html))
    }
}

/// Ordered upsert: a repeated selector overwrites its entry in place.
fn upsert<T>(entries: &mut Vec<(String, T)>, selector: String, value: T) {
    if let Some(entry) = entries.iter_mut().find(|(existing, _)| *existing == selector) {
        entry.1 = value;
    } else {
        entries.push((selector, value));
    }
}

/// Run one directive over every element matching `selector`.
///
/// Selector parse failures, rewrite failures, and zero-match selectors are
/// logged and leave the document unchanged.
fn apply_pass<F>(html: &str, selector: &str, directive: &str, mut apply: F) -> String
where
    F: for<'r, 't> FnMut(&mut Element<'r, 't>),
{
    let parsed: Selector = match selector.parse() {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(
                selector,
                directive,
                error = %error,
                "Skipping directive with unsupported selector"
            );
            return html.to_string();
        }
    };

    let mut matched = 0usize;
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![(
                Cow::Owned(parsed),
                ElementContentHandlers::default().element(|el: &mut Element| {
                    matched += 1;
                    apply(el);
                    Ok(())
                }),
            )],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(output) => {
            if matched == 0 {
                tracing::warn!(selector, directive, "Directive selector matched no elements");
            }
            output
        }
        Err(error) => {
            tracing::warn!(selector, directive, error = %error, "Failed to apply directive");
            html.to_string()
        }
    }
}

/// Capture, per element matching `selector`, the serialized descendants
/// matched by the `except` selectors.
///
/// Results are in document order, matching the order the rewrite pass visits
/// the overridden elements.
fn capture_preserved(html: &str, selector: &str, except: &[String]) -> Vec<String> {
    if except.is_empty() {
        return Vec::new();
    }

    let outer = match scraper::Selector::parse(selector) {
        Ok(outer) => outer,
        Err(error) => {
            tracing::warn!(selector, error = %error.to_string(), "Skipping except capture for unsupported selector");
            return Vec::new();
        }
    };
    let except_selectors: Vec<scraper::Selector> = except
        .iter()
        .filter_map(|raw| match scraper::Selector::parse(raw) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(
                    selector = %raw,
                    error = %error.to_string(),
                    "Skipping malformed except selector"
                );
                None
            }
        })
        .collect();

    let document = Html::parse_document(html);
    document
        .select(&outer)
        .map(|element| {
            let mut kept = String::new();
            for except_selector in &except_selectors {
                for preserved in element.select(except_selector) {
                    kept.push_str(&preserved.html());
                }
            }
            kept
        })
        .collect()
}
