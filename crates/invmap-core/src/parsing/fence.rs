use regex::Regex;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```(?:json)?|```$").expect("fence pattern is valid"));

/// Remove markdown code fences and fold the reply onto one line.
///
/// A fence is stripped when it opens a line (optionally tagged `json`) or
/// closes one. Newlines become single spaces and the result is trimmed.
pub fn strip_fences(raw: &str) -> String {
    let unfenced = FENCE.replace_all(raw.trim(), "");
    unfenced.replace('\n', " ").trim().to_string()
}
