use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::error::{LaserframeError, LaserframeResult},
    params::StrokeColor,
};

const PATH_OPEN: &str = "<path";

/// Rewrite every `<path` opening tag to carry `stroke` and `fill="none"`.
///
/// Only whole `path` element names match; `<pathology` and the like are left alone.
pub fn inject_stroke(svg: &str, stroke: StrokeColor) -> String {
    let attrs = format!(r#"{PATH_OPEN} stroke="{}" fill="none""#, stroke.to_hex());
    let mut out = String::with_capacity(svg.len() + svg.len() / 8);
    let mut rest = svg;
    while let Some(pos) = rest.find(PATH_OPEN) {
        let after = &rest[pos + PATH_OPEN.len()..];
        let whole_name = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_whitespace() || c == '/' || c == '>');
        out.push_str(&rest[..pos]);
        out.push_str(if whole_name { attrs.as_str() } else { PATH_OPEN });
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Apply [`inject_stroke`] to a document on disk, in place.
pub fn colorize_file(path: &Path, stroke: StrokeColor) -> LaserframeResult<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read vector document '{}'", path.display()))?;
    std::fs::write(path, inject_stroke(&text, stroke))
        .with_context(|| format!("failed to rewrite vector document '{}'", path.display()))?;
    Ok(())
}

/// Drawing complexity of a vector document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DocumentStats {
    /// Rendered path elements.
    pub paths: u64,
    /// Move, line and curve segments across all paths (close commands excluded).
    pub segments: u64,
}

/// Parse an SVG document and count its path geometry.
pub fn inspect_document(data: &[u8]) -> LaserframeResult<DocumentStats> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| LaserframeError::vectorize(format!("unreadable vector document: {e}")))?;
    let mut stats = DocumentStats::default();
    count_group(tree.root(), &mut stats);
    Ok(stats)
}

fn count_group(group: &usvg::Group, stats: &mut DocumentStats) {
    use usvg::tiny_skia_path::PathSegment;

    for node in group.children() {
        match node {
            usvg::Node::Group(g) => count_group(g.as_ref(), stats),
            usvg::Node::Path(p) => {
                stats.paths += 1;
                stats.segments += p
                    .data()
                    .segments()
                    .filter(|s| !matches!(s, PathSegment::Close))
                    .count() as u64;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vectorize/svg.rs"]
mod tests;
