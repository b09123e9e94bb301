//! Name suggestions for unresolved references.

/// Levenshtein distance over chars, sized for identifiers and dotted paths.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Closest candidate within `max_distance`, ties broken by candidate order.
pub fn find_similar<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, edit_distance(name, candidate)))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Suggestion threshold scaled to the name: short names tolerate fewer edits.
pub fn suggestion_distance(name: &str) -> usize {
    (name.chars().count() / 3).clamp(1, 3)
}

/// `did you mean` hint for `name`, if any candidate is close enough.
pub fn did_you_mean<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    find_similar(name, candidates, suggestion_distance(name))
        .map(|candidate| format!("did you mean `{candidate}`?"))
}
