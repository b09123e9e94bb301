//! String literal helpers shared by the reader and the renderer.

/// Decode a single-quoted string literal.
///
/// A surrounding pair of matching quotes (`'` or `"`) is removed and doubled
/// quote characters inside collapse to one. Input without matching quotes is
/// returned as-is.
///
/// # Examples
/// ```
/// use motif_core::utils::unquote;
/// assert_eq!(unquote("'it''s'"), "it's");
/// assert_eq!(unquote("\"a\"\"b\""), "a\"b");
/// assert_eq!(unquote("bare"), "bare");
/// ```
pub fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return raw.to_string();
    };
    if first != last || !matches!(first, '\'' | '"') {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let doubled: String = [first, first].iter().collect();
    inner.replace(&doubled, &first.to_string())
}

/// Encode a string as a single-quoted literal, doubling embedded quotes.
///
/// # Examples
/// ```
/// use motif_core::utils::quote;
/// assert_eq!(quote("it's"), "'it''s'");
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
