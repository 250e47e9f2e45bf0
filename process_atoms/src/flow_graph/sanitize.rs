use std::sync::LazyLock;

use regex::Regex;

static CAMEL_PATTERN_1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static CAMEL_PATTERN_2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
static MULTI_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_ALPHANUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z]").unwrap());

/// Split camel-case words with spaces ("CheckInvoice" becomes "Check Invoice")
pub fn camel_to_white(label: &str) -> String {
    let label = CAMEL_PATTERN_1.replace_all(label, "$1 $2");
    CAMEL_PATTERN_2.replace_all(&label, "$1 $2").into_owned()
}

/// Normalize a display label for use as an activity name
///
/// Replaces ampersands, strips line breaks and quotes, splits camel case and
/// collapses repeated whitespace.
pub fn sanitize_label(label: &str) -> String {
    let label = label
        .replace('&', "and")
        .replace('\n', " ")
        .replace('\r', "")
        .replace("(s)", "s")
        .replace('\'', "");
    let label = MULTI_WHITESPACE.replace_all(&label, " ");
    let label = camel_to_white(label.trim());
    MULTI_WHITESPACE.replace_all(&label, " ").trim().to_string()
}

/// Like [`sanitize_label`], but additionally drops all non-letter characters
///
/// Used to decide whether anything meaningful remains of a label at all.
pub fn sanitize_label_full(label: &str) -> String {
    let label = sanitize_label(label);
    NON_ALPHANUM.replace_all(&label, "").into_owned()
}

/// Strip every occurrence of a useless label from the text
///
/// Combined with [`sanitize_label_full`] this decides whether a label carries
/// anything beyond placeholder words.
pub fn replace_useless_substrings(label: &str) -> String {
    let mut out = label.to_string();
    for useless in crate::event_log::constants::USELESS_LABELS {
        if !useless.trim().is_empty() {
            out = out.replace(useless, "");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(camel_to_white("CheckInvoice"), "Check Invoice");
        assert_eq!(camel_to_white("already spaced"), "already spaced");
    }

    #[test]
    fn sanitizes_labels() {
        assert_eq!(sanitize_label("Check &\nApprove"), "Check and Approve");
        assert_eq!(sanitize_label("  Order(s)   placed "), "Orders placed");
        assert_eq!(sanitize_label("ShipGoods"), "Ship Goods");
    }

    #[test]
    fn full_sanitization_keeps_letters_only() {
        assert_eq!(sanitize_label_full("Start 123 ?!"), "Start");
        assert_eq!(sanitize_label_full("123 ?!"), "");
    }
}
