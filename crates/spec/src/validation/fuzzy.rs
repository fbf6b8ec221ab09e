//! "Did you mean" suggestions for misspelled references.

/// Closest candidate to `input`, or `None` when nothing is within half the
/// longer string's length.
pub(crate) fn closest<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .into_iter()
        .map(|c| (c, edit_distance(&input, &c.to_lowercase())))
        .min_by_key(|&(_, dist)| dist)
        .filter(|(c, dist)| *dist <= input.len().max(c.len()) / 2)
        .map(|(c, _)| c)
}

/// Levenshtein distance over chars, one row at a time.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
