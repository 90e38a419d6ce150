//! Token estimation for backends that do not report usage.

/// Rough token count: one token per four characters, never less than one.
///
/// # Examples
///
/// ```
/// use quill_core::estimate_tokens;
///
/// assert_eq!(estimate_tokens(""), 1);
/// assert_eq!(estimate_tokens("abcdefgh"), 2);
/// ```
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() / 4;
    u32::try_from(chars).unwrap_or(u32::MAX).max(1)
}
