use std::collections::HashMap;

/// Ratcliff/Obershelp similarity ratio over bytes, 0.0..=1.0: twice the
/// total matched length over the combined length, where matches are the
/// longest common substring plus matches recursively found on either side
/// of it. Same tie-breaking as Python's difflib `SequenceMatcher.ratio()`
/// (earliest match in `a`, then earliest in `b`).
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let a = a.as_bytes();
    let b = b.as_bytes();
    let matched = total_matched(a, b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Cheap upper bound on `ratio` from lengths alone; callers skip the full
/// comparison when this already falls below their threshold.
pub fn upper_bound(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    2.0 * a.len().min(b.len()) as f64 / (a.len() + b.len()) as f64
}

fn total_matched(a: &[u8], b: &[u8]) -> usize {
    let mut total = 0;
    // Explicit worklist instead of recursion; chunk contents can be long.
    let mut work = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((alo, ahi, blo, bhi)) = work.pop() {
        if alo >= ahi || blo >= bhi {
            continue;
        }
        let (i, j, k) = longest_match(&a[alo..ahi], &b[blo..bhi]);
        if k == 0 {
            continue;
        }
        total += k;
        work.push((alo, alo + i, blo, blo + j));
        work.push((alo + i + k, ahi, blo + j + k, bhi));
    }
    total
}

/// Longest common substring of `a` and `b` as (start in a, start in b, len).
fn longest_match(a: &[u8], b: &[u8]) -> (usize, usize, usize) {
    let mut b_positions: HashMap<u8, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        b_positions.entry(ch).or_default().push(j);
    }

    let (mut best_i, mut best_j, mut best_len) = (0, 0, 0);
    // run_len[j] = length of the common run ending at a[..=i], b[..=j]
    let mut run_len: HashMap<usize, usize> = HashMap::new();
    for (i, ch) in a.iter().enumerate() {
        let mut next_run: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(ch) {
            for &j in positions {
                let k = if j == 0 {
                    1
                } else {
                    run_len.get(&(j - 1)).copied().unwrap_or(0) + 1
                };
                next_run.insert(j, k);
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        run_len = next_run;
    }
    (best_i, best_j, best_len)
}

// ── Tests ──
