/// Mirror an out-of-range index back into `[0, n)` without repeating the
/// edge sample (`-1 -> 1`, `n -> n - 2`).
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let i = if i < 0 { -i } else { i };
    let i = if i >= n { 2 * (n - 1) - i } else { i };
    i as usize
}

/// Discrete 4-neighbour Laplacian of an 8-bit plane:
///
/// ```text
/// 0  1  0
/// 1 -4  1
/// 0  1  0
/// ```
///
/// Borders are mirrored without repeating the edge pixel.
pub fn laplacian(plane: &[u8], width: usize, height: usize) -> Vec<f64> {
    if width == 0 || height == 0 {
        return vec![];
    }
    let at = |x: isize, y: isize| -> f64 {
        let xx = reflect101(x, width);
        let yy = reflect101(y, height);
        plane[yy * width + xx] as f64
    };

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            let v = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            out.push(v);
        }
    }
    out
}

/// Population variance. Returns 0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}
