//! HTML reference rewriting.
//!
//! # Responsibilities
//! - Stream-rewrite tag/attribute pairs in a fetched HTML body
//! - Route each matched element to the asset or navigational rule set
//!
//! # Design Decisions
//! - Asset rules (`img[src]`, stylesheet `link[href]`) may point at the CDN;
//!   navigational rules (`a[href]`, `script[src]`, non-stylesheet
//!   `link[href]`) must stay proxy-local
//! - A `link` routes to exactly one rule set based on its `rel` value
//! - Selectors carry the attribute condition, so elements missing the target
//!   attribute are never touched

use lol_html::{element, rewrite_str, RewriteStrSettings};
use thiserror::Error;

use crate::rewrite::UrlRewriter;

/// Error from the HTML rewriting pipeline.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("html rewrite failed: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

/// A document whose references have been rewritten.
///
/// Produced by [`DocumentTransformer::rewrite`]; composition directives apply
/// on top of this form.
#[derive(Debug, Clone)]
pub struct RewrittenDocument(String);

impl RewrittenDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Rewrites tag references in fetched HTML documents.
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    rewriter: UrlRewriter,
}

impl DocumentTransformer {
    pub fn new(rewriter: UrlRewriter) -> Self {
        Self { rewriter }
    }

    /// The URL rules this transformer applies.
    pub fn rewriter(&self) -> &UrlRewriter {
        &self.rewriter
    }

    /// Rewrite all asset and navigational references in `body`.
    pub fn rewrite(&self, body: &str) -> Result<RewrittenDocument, TransformError> {
        let rewriter = &self.rewriter;
        let output = rewrite_str(
            body,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!("img[src]", |el| {
                        if let Some(src) = el.get_attribute("src") {
                            el.set_attribute("src", &rewriter.to_local_or_cdn(&src))?;
                        }
                        Ok(())
                    }),
                    element!("link[href]", |el| {
                        if let Some(href) = el.get_attribute("href") {
                            let rewritten = if is_stylesheet(el.get_attribute("rel").as_deref()) {
                                rewriter.to_local_or_cdn(&href)
                            } else {
                                rewriter.to_local(&href)
                            };
                            el.set_attribute("href", &rewritten)?;
                        }
                        Ok(())
                    }),
                    element!("a[href]", |el| {
                        if let Some(href) = el.get_attribute("href") {
                            el.set_attribute("href", &rewriter.to_local(&href))?;
                        }
                        Ok(())
                    }),
                    element!("script[src]", |el| {
                        if let Some(src) = el.get_attribute("src") {
                            el.set_attribute("src", &rewriter.to_local(&src))?;
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )?;

        Ok(RewrittenDocument(output))
    }
}

fn is_stylesheet(rel: Option<&str>) -> bool {
    rel.map(|r| r.eq_ignore_ascii_case("stylesheet"))
        .unwrap_or(false)
}
