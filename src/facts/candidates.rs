//! Candidate encyclopedia titles for a place name.

/// Administrative qualifiers that encyclopedia titles usually omit.
/// Matched case-insensitively at the start of the name, on a word boundary.
const ADMIN_PREFIXES: &[&str] = &[
    "City of",
    "Capital City of",
    "Municipality of",
    "District of",
    "County of",
];

/// Titles to try, in order: the name itself, then the name without its
/// administrative prefix when that leaves something different.
pub fn candidate_titles(place_name: &str) -> Vec<String> {
    let mut titles = vec![place_name.to_string()];
    if let Some(stripped) = strip_admin_prefix(place_name) {
        if !stripped.is_empty() && stripped != place_name {
            titles.push(stripped.to_string());
        }
    }
    titles
}

/// "District of Columbia" → Some("Columbia"). "Cityscape" → None.
pub fn strip_admin_prefix(name: &str) -> Option<&str> {
    let name = name.trim_start();
    ADMIN_PREFIXES.iter().find_map(|prefix| {
        let head = name.get(..prefix.len())?;
        let rest = &name[prefix.len()..];
        let on_boundary = rest.is_empty() || rest.starts_with(char::is_whitespace);
        (head.eq_ignore_ascii_case(prefix) && on_boundary).then(|| rest.trim())
    })
}
