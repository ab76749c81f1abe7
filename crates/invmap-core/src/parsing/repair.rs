use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,])\s*([A-Za-z0-9_]+):").expect("bare key pattern is valid")
});

/// Quote bare identifier keys: `{foo: 1, bar_2: 2}` -> `{ "foo": 1, "bar_2": 2}`.
///
/// Single pass, no awareness of string literals. A value such as
/// `"a,b:c"` is rewritten too; callers accept that.
pub fn quote_bare_keys(text: &str) -> Cow<'_, str> {
    BARE_KEY.replace_all(text, r#"${1} "${2}":"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_simple_keys() {
        assert_eq!(quote_bare_keys("{a: 1, b: 2}"), r#"{ "a": 1, "b": 2}"#);
    }

    #[test]
    fn test_leaves_quoted_keys_alone() {
        let text = r#"{"a": 1}"#;
        assert_eq!(quote_bare_keys(text), text);
    }

    #[test]
    fn test_nested_and_list_elements() {
        assert_eq!(
            quote_bare_keys("[{id: 1}, {id: 2}]"),
            r#"[{ "id": 1}, { "id": 2}]"#
        );
    }

    #[test]
    fn test_rewrites_matching_text_inside_strings() {
        assert_eq!(
            quote_bare_keys(r#"{"note": "x,y:z"}"#),
            r#"{"note": "x, "y":z"}"#
        );
    }
}
