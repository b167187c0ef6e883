//! Slug and field-key derivation
//!
//! Form slugs and field keys share one rule: lowercase the input,
//! collapse every non-alphanumeric run into a single separator, and
//! trim leading/trailing separators. Slugs use `-`, keys use `_`.

/// Maximum length enforced on derived field keys.
pub const MAX_KEY_LEN: usize = 64;

fn slugify(value: &str, sep: char) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;

    for c in value.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push(sep);
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Derive a URL-safe slug from a form name.
///
/// Returns an empty string when the name contains no alphanumeric
/// characters; the caller is responsible for falling back to a
/// generated slug in that case.
pub fn form_slug(name: &str) -> String {
    slugify(name, '-')
}

/// Derive a machine-safe answer key from a question label.
pub fn field_key(label: &str) -> String {
    let mut key = slugify(label, '_');
    key.truncate(MAX_KEY_LEN);
    // Don't leave a dangling separator after truncation.
    while key.ends_with('_') {
        key.pop();
    }
    key
}

/// Base36 render of a millisecond timestamp, used to disambiguate
/// colliding slugs and to synthesize slugs for unnameable forms.
pub fn base36_suffix(millis: i64) -> String {
    let mut n = millis.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let digits = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    while n > 0 {
        out.push(digits[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_slug_basic() {
        assert_eq!(form_slug("Customer Feedback"), "customer-feedback");
        assert_eq!(form_slug("  Hello,   World!  "), "hello-world");
    }

    #[test]
    fn test_form_slug_collapses_runs() {
        assert_eq!(form_slug("a -- b"), "a-b");
        assert_eq!(form_slug("---a---"), "a");
    }

    #[test]
    fn test_form_slug_empty_when_no_alphanumerics() {
        assert_eq!(form_slug("!!!"), "");
        assert_eq!(form_slug(""), "");
    }

    #[test]
    fn test_field_key_uses_underscores() {
        assert_eq!(field_key("Email address"), "email_address");
        assert_eq!(field_key("How old are you?"), "how_old_are_you");
    }

    #[test]
    fn test_field_key_truncates() {
        let long = "x".repeat(200);
        assert_eq!(field_key(&long).len(), MAX_KEY_LEN);

        // Truncation must not end on a separator
        let label = format!("{} tail", "a".repeat(63));
        let key = field_key(&label);
        assert!(!key.ends_with('_'));
    }

    #[test]
    fn test_base36_suffix() {
        assert_eq!(base36_suffix(0), "0");
        assert_eq!(base36_suffix(35), "z");
        assert_eq!(base36_suffix(36), "10");
    }
}
