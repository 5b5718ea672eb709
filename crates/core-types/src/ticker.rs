/// Exchange suffix for listings entered as a bare stock code.
pub const HONG_KONG_SUFFIX: &str = ".HK";

/// Normalizes a user-entered ticker.
///
/// An all-digit ticker is a Hong Kong stock code: it is rewritten to its four-digit,
/// zero-padded exchange symbol (`"700"` becomes `"0700.HK"`). Anything else is
/// returned as entered, minus surrounding whitespace.
pub fn format_ticker(raw: &str) -> String {
    let ticker = raw.trim();
    if ticker.is_empty() || !ticker.bytes().all(|b| b.is_ascii_digit()) {
        return ticker.to_string();
    }
    // Codes are not bounded in length, so pad the string rather than parse it.
    let code = ticker.trim_start_matches('0');
    format!("{code:0>4}{HONG_KONG_SUFFIX}")
}
