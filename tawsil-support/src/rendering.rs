//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format requesting chains and "did you mean?"
//! suggestions in error output.

/// Renders a requesting chain as a readable string.
///
/// # Examples
/// ```
/// use tawsil_support::rendering::render_chain;
///
/// let chain = vec!["IUserService", "IUserRepo", "IDatabase"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "IUserService -> IUserRepo -> IDatabase");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Generates "did you mean?" suggestions for an unknown identifier.
///
/// Compares the requested identifier against the registered ones and
/// returns at most `max_suggestions` close matches, best first.
///
/// ```
/// use tawsil_support::rendering::suggest_similar;
///
/// let suggestions = suggest_similar("ILoger", &["ILogger", "IDatabase"], 3);
/// assert_eq!(suggestions, vec!["ILogger".to_string()]);
/// ```
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    if requested_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();

            // Case-insensitive equality or containment ranks highest
            if name_lower == requested_lower {
                return Some((name, 120));
            }
            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            let common = name_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();

            if common >= 3 {
                return Some((name, common * 10));
            }

            None
        })
        .collect();

    // Stable on ties so equal scores keep the caller's order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
