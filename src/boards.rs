//! A few ready-made boards, mostly so the demo binary and the integration
//! tests have something real to chew on.

/// A complete, consistent grid for any supported size, built from the shift
/// pattern value(r, c) = ((r*B + r/B + c) mod N) + 1. Every row, column, and
/// block gets each value exactly once.
pub fn complete(n: usize, block: usize) -> Vec<Vec<u32>> {
    (0..n)
        .map(|r| {
            (0..n)
                .map(|c| (((r * block + r / block + c) % n) + 1) as u32)
                .collect()
        })
        .collect()
}

/// A small 4x4 instance with all four corners given.
pub fn four() -> Vec<Vec<u32>> {
    vec![
        vec![1, 0, 0, 4],
        vec![0, 0, 1, 0],
        vec![0, 1, 0, 0],
        vec![4, 0, 0, 1],
    ]
}

/// The classic 9x9 puzzle with a unique solution.
pub fn nine() -> Vec<Vec<u32>> {
    vec![
        vec![5, 3, 0, 0, 7, 0, 0, 0, 0],
        vec![6, 0, 0, 1, 9, 5, 0, 0, 0],
        vec![0, 9, 8, 0, 0, 0, 0, 6, 0],
        vec![8, 0, 0, 0, 6, 0, 0, 0, 3],
        vec![4, 0, 0, 8, 0, 3, 0, 0, 1],
        vec![7, 0, 0, 0, 2, 0, 0, 0, 6],
        vec![0, 6, 0, 0, 0, 0, 2, 8, 0],
        vec![0, 0, 0, 4, 1, 9, 0, 0, 5],
        vec![0, 0, 0, 0, 8, 0, 0, 7, 9],
    ]
}

/// A 16x16 instance: the shift-pattern grid with a scattering of cells
/// blanked back out.
pub fn sixteen() -> Vec<Vec<u32>> {
    let mut rows = complete(16, 4);
    for r in 0..16 {
        for c in 0..16 {
            if (r * 16 + c) % 7 == 0 {
                rows[r][c] = 0;
            }
        }
    }
    rows
}
