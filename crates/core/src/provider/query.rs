//! Query-string variants for origin searches.
//!
//! Origin sites disagree on how episodes are labelled, so a search tries a
//! small ordered set of phrasings and stops at the first one that returns a
//! non-empty listing.

/// Build the ordered query variants for one search.
///
/// Movies get the plain title only. Series add the two notations commonly
/// used on the origin listings: `S01E02` and `1x02`.
pub fn build_query_variants(
    title: &str,
    season: Option<u32>,
    episode: Option<u32>,
) -> Vec<String> {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![title.clone()];

    if let (Some(season), Some(episode)) = (season, episode) {
        variants.push(format!("{} S{:02}E{:02}", title, season, episode));
        variants.push(format!("{} {}x{:02}", title, season, episode));
    }

    // Deduplicate while preserving order.
    let mut seen = std::collections::HashSet::new();
    variants
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}
