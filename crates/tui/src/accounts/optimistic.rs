/// Snapshot-before-mutate guard for local list edits that a server call
/// may still reject.
///
/// ```text
/// let change = Optimistic::apply(&mut list, |l| l.retain(..));
/// match call().await {
///     Ok(_) => change.commit(),
///     Err(_) => change.rollback(&mut list),
/// }
/// ```
#[derive(Debug)]
#[must_use = "an optimistic change must be committed or rolled back"]
pub struct Optimistic<T> {
    snapshot: Vec<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn apply(list: &mut Vec<T>, mutate: impl FnOnce(&mut Vec<T>)) -> Self {
        let snapshot = list.clone();
        mutate(list);
        Self { snapshot }
    }

    pub fn commit(self) {}

    /// Restores the exact contents and order seen before `apply`.
    pub fn rollback(self, list: &mut Vec<T>) {
        *list = self.snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_restores_order() {
        let mut list = vec![3, 1, 2];
        let change = Optimistic::apply(&mut list, |l| l.retain(|x| *x != 1));
        assert_eq!(list, [3, 2]);
        change.rollback(&mut list);
        assert_eq!(list, [3, 1, 2]);
    }

    #[test]
    fn commit_keeps_mutation() {
        let mut list = vec!["a", "b"];
        Optimistic::apply(&mut list, |l| l.insert(0, "c")).commit();
        assert_eq!(list, ["c", "a", "b"]);
    }
}
