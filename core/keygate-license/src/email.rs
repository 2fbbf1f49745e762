/// Normalizes an email for use as an identity key: trims surrounding
/// whitespace and lower-cases it.
///
/// An empty result means no usable email was supplied.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
