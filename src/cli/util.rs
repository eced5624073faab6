/// Parse a `key=value` argument. Only the first `=` separates; the value may
/// contain more.
///
/// # Errors
/// Returns a message suitable for clap when `=` is missing or the key is empty.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s.split_once('=').ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    let k = k.trim();
    if k.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((k.to_string(), v.to_string()))
}
