//! Deterministic enumeration of light combinations

/// Every non-empty subset of `items`, skipping those flagged always-on.
///
/// Subsets come out in depth-first pre-order over increasing indices, so
/// `[a, b, c]` yields `[a] [a,b] [a,b,c] [a,c] [b] [b,c] [c]`. Asset names
/// are derived from this order.
pub fn enumerate_combinations<T, F>(items: &[T], always_on: F) -> Vec<Vec<T>>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let controllable: Vec<T> = items.iter().filter(|i| !always_on(i)).cloned().collect();
    let mut out = Vec::with_capacity(combination_count(controllable.len()));
    let mut current = Vec::with_capacity(controllable.len());
    visit(&controllable, 0, &mut current, &mut out);
    out
}

fn visit<T: Clone>(items: &[T], index: usize, current: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
    if !current.is_empty() {
        out.push(current.clone());
    }
    for i in index..items.len() {
        current.push(items[i].clone());
        visit(items, i + 1, current, out);
        current.pop();
    }
}

/// Number of non-empty subsets of `k` controllable entities: 2^k - 1
pub fn combination_count(k: usize) -> usize {
    if k >= usize::BITS as usize {
        return usize::MAX;
    }
    (1usize << k) - 1
}
