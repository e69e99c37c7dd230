//! Target label derivation.

/// Character some GML consumers reject in label text.
const RESERVED: char = '&';

/// What `&` is replaced with.
const RESERVED_REPLACEMENT: &str = "+";

/// Lowercase `text` and replace the reserved `&`.
///
/// ```
/// assert_eq!(gmlfix::sanitize_label("Iron & Steel"), "iron + steel");
/// ```
pub fn sanitize_label(text: &str) -> String {
    text.to_lowercase().replace(RESERVED, RESERVED_REPLACEMENT)
}

/// Choose the label a node record should carry.
///
/// An existing label wins over the node name. Empty values do not count, so
/// a record with `label ""` falls back to its name. Returns `None` when
/// neither gives any text.
pub fn target_label(label: Option<&str>, name: Option<&str>) -> Option<String> {
    label
        .filter(|text| !text.is_empty())
        .or_else(|| name.filter(|text| !text.is_empty()))
        .map(sanitize_label)
}
