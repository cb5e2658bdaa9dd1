//! Identifier extraction from shareable links

use crate::error::Result;
use crate::types::ResourceIdentifier;

/// Extract the record identifier from a shareable link
///
/// The identifier is everything after the final `/` of the link's path. Any
/// query string or fragment is dropped first, so `.../abc123?s=share` yields
/// `abc123`. A link without any `/` is taken whole. No scheme or host
/// validation happens here; a malformed link surfaces later as a network
/// failure.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) when the
/// extracted segment is empty (empty link, or a link ending in `/`).
///
/// # Examples
///
/// ```
/// use shortcut_extract::resolver::resolve_identifier;
///
/// let id = resolve_identifier("https://www.icloud.com/shortcuts/abc123").unwrap();
/// assert_eq!(id.as_str(), "abc123");
/// ```
pub fn resolve_identifier(link: &str) -> Result<ResourceIdentifier> {
    let path = match link.find(['?', '#']) {
        Some(idx) => &link[..idx],
        None => link,
    };
    let segment = match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    ResourceIdentifier::new(segment)
}
