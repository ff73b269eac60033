//! Ordered fallback over a list of candidates
//!
//! Release endpoints, download origins and launch candidates all follow the
//! same rule: try each candidate in declared order, stop at the first success,
//! and only give up once every alternative has been tried.

/// Outcome of a single attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// Stop here with a result.
    Done(T),
    /// Record the error and move on to the next candidate.
    Next(E),
    /// Stop immediately; remaining candidates are not tried.
    Fatal(E),
}

/// Outcome of a full fallback run.
#[derive(Debug, PartialEq, Eq)]
pub enum Fallback<T, E> {
    /// The candidate at `index` succeeded after `skipped` earlier failures.
    Found { index: usize, value: T, skipped: Vec<E> },
    /// A candidate reported a fatal error.
    Aborted { index: usize, error: E, skipped: Vec<E> },
    /// Every candidate was tried; errors in candidate order.
    Exhausted(Vec<E>),
}

impl<T, E> Fallback<T, E> {
    /// The successful value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Fallback::Found { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Fallback::Found { .. })
    }
}

/// Run `attempt` over `candidates` strictly in order.
pub fn first_success<C, T, E, I, F>(candidates: I, mut attempt: F) -> Fallback<T, E>
where
    I: IntoIterator<Item = C>,
    F: FnMut(usize, C) -> Attempt<T, E>,
{
    let mut skipped = Vec::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        match attempt(index, candidate) {
            Attempt::Done(value) => {
                return Fallback::Found {
                    index,
                    value,
                    skipped,
                };
            }
            Attempt::Fatal(error) => {
                return Fallback::Aborted {
                    index,
                    error,
                    skipped,
                };
            }
            Attempt::Next(error) => skipped.push(error),
        }
    }
    Fallback::Exhausted(skipped)
}
