//! Scored candidate selection.
//!
//! Every heuristic target choice (which importer to connect to, which edge to
//! drop, which exporter to blockade or release) runs through
//! [`select_scored`]: score all candidates, keep the best score, then narrow
//! the ties to the preferred partition when it is non-empty, and finally pick
//! uniformly at random among what remains.

use rand::Rng;

/// Which end of the score range wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Pick the largest score.
    Highest,
    /// Pick the smallest score.
    Lowest,
}

/// Choose one candidate by score.
///
/// `prefer` splits the tied best candidates into a preferred set and a
/// fallback set; the fallback is used only when no preferred candidate ties
/// for best. Returns `None` when `candidates` is empty. The random source is
/// consulted only when more than one candidate remains.
pub fn select_scored<T, R>(
    candidates: &[T],
    score: impl Fn(&T) -> i64,
    prefer: impl Fn(&T) -> bool,
    goal: Goal,
    rng: &mut R,
) -> Option<T>
where
    T: Copy,
    R: Rng + ?Sized,
{
    let scored: Vec<(T, i64)> = candidates.iter().map(|c| (*c, score(c))).collect();
    let best = match goal {
        Goal::Highest => scored.iter().map(|(_, s)| *s).max()?,
        Goal::Lowest => scored.iter().map(|(_, s)| *s).min()?,
    };

    let (preferred, fallback): (Vec<T>, Vec<T>) = scored
        .into_iter()
        .filter(|(_, s)| *s == best)
        .map(|(c, _)| c)
        .partition(|c| prefer(c));

    let pool = if preferred.is_empty() {
        fallback
    } else {
        preferred
    };

    match pool.len() {
        0 => None,
        1 => pool.first().copied(),
        len => pool.get(rng.random_range(0..len)).copied(),
    }
}
