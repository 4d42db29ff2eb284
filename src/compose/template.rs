use std::ops::Range;

use crate::{
    assets::screenshot::EmbeddableImage,
    foundation::error::{FramerError, FramerResult},
    frames::registry::TemplateRef,
};

/// Reserved token marking where the screenshot goes in a template.
pub const SCREENSHOT_PLACEHOLDER: &str = "{{SCREENSHOT_DATA}}";

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A template with the screenshot spliced into its insertion point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedDocument {
    svg: String,
}

impl ComposedDocument {
    /// Wrap SVG text that was composed by other means.
    pub fn new(svg: impl Into<String>) -> Self {
        Self { svg: svg.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.svg
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.svg.as_bytes()
    }
}

/// Read the raw template text. File templates are read fresh on every call.
pub fn load_template(template: &TemplateRef) -> FramerResult<String> {
    match template {
        TemplateRef::Embedded { svg, .. } => Ok((*svg).to_string()),
        TemplateRef::File(path) => std::fs::read_to_string(path).map_err(|e| {
            FramerError::template_load(format!("read template '{}': {e}", path.display()))
        }),
    }
}

/// Byte range of the placeholder inside the template text.
///
/// The insertion point is the `href` (plain or `xlink:`) of an `<image>` element whose value is
/// exactly [`SCREENSHOT_PLACEHOLDER`]. There must be one such attribute and the token must not
/// occur anywhere else in the document.
pub fn locate_insertion_point(svg: &str) -> FramerResult<Range<usize>> {
    let doc = roxmltree::Document::parse(svg)
        .map_err(|e| FramerError::template_load(format!("template is not well-formed XML: {e}")))?;

    let slots: Vec<Range<usize>> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "image")
        .flat_map(|n| n.attributes())
        .filter(|a| {
            a.name() == "href"
                && matches!(a.namespace(), None | Some(XLINK_NS))
                && a.value() == SCREENSHOT_PLACEHOLDER
        })
        .map(|a| a.range_value())
        .collect();

    let occurrences = svg.matches(SCREENSHOT_PLACEHOLDER).count();
    match slots.as_slice() {
        [] => Err(FramerError::placeholder_missing(format!(
            "no <image> href carries {SCREENSHOT_PLACEHOLDER}"
        ))),
        [range] if occurrences == 1 => {
            if &svg[range.clone()] != SCREENSHOT_PLACEHOLDER {
                return Err(FramerError::placeholder_missing(format!(
                    "{SCREENSHOT_PLACEHOLDER} must be written without character references"
                )));
            }
            Ok(range.clone())
        }
        _ => Err(FramerError::placeholder_missing(format!(
            "expected exactly one {SCREENSHOT_PLACEHOLDER}, found {} (in {} <image> hrefs)",
            occurrences.max(slots.len()),
            slots.len()
        ))),
    }
}

/// Load and validate a template without composing anything.
pub fn preflight_template(template: &TemplateRef) -> FramerResult<()> {
    let svg = load_template(template)?;
    locate_insertion_point(&svg)
        .map(|_| ())
        .map_err(|e| with_template_name(e, template))
}

/// Load `template` and substitute `image` into its insertion point as a `data:` URI.
pub fn compose(template: &TemplateRef, image: &EmbeddableImage) -> FramerResult<ComposedDocument> {
    let raw = load_template(template)?;
    let slot = locate_insertion_point(&raw).map_err(|e| with_template_name(e, template))?;

    let uri = image.to_data_uri();
    let mut svg = String::with_capacity(raw.len() - slot.len() + uri.len());
    svg.push_str(&raw[..slot.start]);
    svg.push_str(&uri);
    svg.push_str(&raw[slot.end..]);
    Ok(ComposedDocument { svg })
}

fn with_template_name(err: FramerError, template: &TemplateRef) -> FramerError {
    match err {
        FramerError::TemplateLoad(msg) => FramerError::template_load(format!("{template}: {msg}")),
        FramerError::PlaceholderMissing(msg) => {
            FramerError::placeholder_missing(format!("{template}: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/template.rs"]
mod tests;
