//! Depth resolution: how many levels below the caller's base path the
//! dataset directories sit, measured from the anchor segment.

use crate::errors::DepthError;
use std::path::{Component, Path};

/// Number of normal path segments after the LAST occurrence of `token`.
/// Returns `None` when the token is absent.
fn segments_after_anchor(path: &Path, token: &str) -> Option<usize> {
    let segs: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    let anchor_idx = segs.iter().rposition(|s| *s == token)?;
    Some(segs.len() - anchor_idx - 1)
}

/// Compute the traversal depth from `base` down to dataset directories.
///
/// `anchor_distance` is the fixed number of segments from the anchor token to
/// a dataset directory in the canonical tree shape. The result is used as
/// both the minimum and maximum traversal depth: datasets are found at
/// exactly this level, never shallower or deeper. Zero means `base` itself
/// is a dataset directory.
pub fn resolve_depth(base: &Path, token: &str, anchor_distance: usize) -> Result<usize, DepthError> {
    let after = segments_after_anchor(base, token).ok_or_else(|| DepthError::AnchorNotFound {
        token: token.to_string(),
        path: base.to_path_buf(),
    })?;
    if after > anchor_distance {
        return Err(DepthError::PathTooSpecific {
            token: token.to_string(),
            path: base.to_path_buf(),
            distance: anchor_distance,
            excess: after - anchor_distance,
        });
    }
    Ok(anchor_distance - after)
}
