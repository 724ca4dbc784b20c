use rand::seq::SliceRandom;

/// Pick one caption uniformly at random. `None` only for an empty list.
pub fn select_caption<S: AsRef<str>>(candidates: &[S]) -> Option<&str> {
    match candidates {
        [] => None,
        [only] => Some(only.as_ref()),
        _ => candidates.choose(&mut rand::thread_rng()).map(AsRef::as_ref),
    }
}
