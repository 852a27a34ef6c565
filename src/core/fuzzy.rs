//! Edit-distance suggestions for mistyped command names.

use crate::config::FUZZY_MAX_DISTANCE;

/// Levenshtein distance between `a` and `b`, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev = (0..=b.len()).collect::<Vec<_>>();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest candidate within `max_distance` edits, compared case-insensitively.
///
/// Ties go to the candidate listed first.
pub fn find_closest_command<'a, S: AsRef<str>>(
    input: &str,
    candidates: &'a [S],
    max_distance: usize,
) -> Option<&'a str> {
    let input = input.to_lowercase();
    let mut best: Option<(usize, &str)> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein_distance(&input, &candidate.to_lowercase());
        if distance > max_distance {
            continue;
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, candidate)| candidate)
}

/// [`find_closest_command`] with the default threshold. Returns `None` when
/// the closest candidate is `input` itself.
pub fn suggest<'a, S: AsRef<str>>(input: &str, candidates: &'a [S]) -> Option<&'a str> {
    find_closest_command(input, candidates, FUZZY_MAX_DISTANCE)
        .filter(|candidate| candidate.to_lowercase() != input.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basics() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("ls", "sl"), 2);
        assert_eq!(levenshtein_distance("héllo", "hello"), 1);
    }

    #[test]
    fn test_suggests_nearest() {
        let commands = ["cat", "cd", "clear", "ls"];
        assert_eq!(suggest("cta", &commands), Some("cat"));
        assert_eq!(suggest("LS", &["ls"]), None);
        assert_eq!(suggest("claer", &commands), Some("clear"));
        assert_eq!(suggest("python", &commands), None);
    }

    #[test]
    fn test_exact_match_is_closest() {
        assert_eq!(find_closest_command("ls", &["ls"], 2), Some("ls"));
        assert_eq!(find_closest_command("cd", &["cp", "cd"], 2), Some("cd"));
        assert_eq!(find_closest_command("Cat", &["cat"], 0), Some("cat"));
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        assert_eq!(find_closest_command("cx", &["cd", "cp"], 2), Some("cd"));
        assert_eq!(find_closest_command("cx", &["cp", "cd"], 2), Some("cp"));
    }

    #[test]
    fn test_respects_max_distance() {
        assert_eq!(find_closest_command("mkdri", &["mkdir"], 1), None);
        assert_eq!(find_closest_command("mkdri", &["mkdir"], 2), Some("mkdir"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distance_is_symmetric(a in "\\PC{0,12}", b in "\\PC{0,12}") {
                prop_assert_eq!(levenshtein_distance(&a, &b), levenshtein_distance(&b, &a));
            }

            #[test]
            fn distance_is_zero_iff_equal(a in "[a-c]{0,6}", b in "[a-c]{0,6}") {
                prop_assert_eq!(levenshtein_distance(&a, &b) == 0, a == b);
            }
        }
    }
}
