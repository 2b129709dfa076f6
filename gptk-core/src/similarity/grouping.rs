use super::dhash::DHash;

/// Greedy single-pass clustering.
///
/// Each entry is compared against the first member of every group formed so
/// far and joins the first group it is similar enough to, or starts a new
/// one. Only the representative is compared, so membership is not
/// transitive and depends on input order. Groups with a single member are
/// dropped.
pub fn group_similar<T>(hashed: Vec<(T, DHash)>, threshold: f64) -> Vec<Vec<T>> {
    let mut groups: Vec<(DHash, Vec<T>)> = Vec::new();

    for (entry, hash) in hashed {
        let joined = groups
            .iter_mut()
            .find(|(first, _)| first.similarity(&hash) >= threshold);
        match joined {
            Some((_, members)) => members.push(entry),
            None => groups.push((hash, vec![entry])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(_, members)| members)
        .collect()
}
