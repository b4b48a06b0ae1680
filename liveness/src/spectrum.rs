use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Share of 2-D DFT magnitude that lies outside a central low-frequency disk.
///
/// The spectrum is considered zero-frequency-centered (as after an fftshift);
/// the disk has radius `min(height, width) / 4` around the center, boundary
/// included. Returns a value in `[0, 1]`, or 0 for an empty or all-zero
/// spectrum.
pub fn high_frequency_ratio(plane: &[u8], width: usize, height: usize) -> f64 {
    if width == 0 || height == 0 {
        return 0.0;
    }

    let spectrum = fft2(plane, width, height);

    let radius = (height.min(width) / 4) as isize;
    let r2 = radius * radius;
    let (crow, ccol) = ((height / 2) as isize, (width / 2) as isize);

    let mut total = 0.0f64;
    let mut high = 0.0f64;
    for u in 0..height {
        // Row of this frequency once the spectrum is shifted to the center.
        let dy = ((u + height / 2) % height) as isize - crow;
        for v in 0..width {
            let dx = ((v + width / 2) % width) as isize - ccol;
            let mag = spectrum[u * width + v].norm();
            total += mag;
            if dx * dx + dy * dy > r2 {
                high += mag;
            }
        }
    }

    if total <= 0.0 {
        return 0.0;
    }
    high / total
}

/// Unnormalized forward 2-D DFT of a real plane: rows first, then columns.
fn fft2(plane: &[u8], width: usize, height: usize) -> Vec<Complex<f64>> {
    let mut buf: Vec<Complex<f64>> = plane
        .iter()
        .map(|&p| Complex::new(p as f64, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();

    let row_fft = planner.plan_fft_forward(width);
    for row in buf.chunks_exact_mut(width) {
        row_fft.process(row);
    }

    let col_fft = planner.plan_fft_forward(height);
    let mut column = vec![Complex::new(0.0, 0.0); height];
    for x in 0..width {
        for (y, c) in column.iter_mut().enumerate() {
            *c = buf[y * width + x];
        }
        col_fft.process(&mut column);
        for (y, c) in column.iter().enumerate() {
            buf[y * width + x] = *c;
        }
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft2_impulse_is_flat() {
        // DFT of a single impulse at the origin is all ones.
        let mut plane = vec![0u8; 12];
        plane[0] = 1;
        for c in fft2(&plane, 4, 3) {
            assert!((c.re - 1.0).abs() < 1e-10, "real should be 1, got {}", c.re);
            assert!(c.im.abs() < 1e-10, "imag should be 0, got {}", c.im);
        }
    }

    #[test]
    fn fft2_dc_term() {
        let plane = vec![3u8; 20];
        let s = fft2(&plane, 5, 4);
        assert!((s[0].re - 60.0).abs() < 1e-9);
        assert!(s[1..].iter().all(|c| c.norm() < 1e-9));
    }

    #[test]
    fn flat_plane_has_no_high_frequency() {
        let plane = vec![200u8; 64];
        let r = high_frequency_ratio(&plane, 8, 8);
        assert!(r < 1e-12, "got {r}");
    }

    #[test]
    fn checkerboard_splits_dc_and_nyquist() {
        let plane: Vec<u8> = (0..64)
            .map(|i| if (i / 8 + i % 8) % 2 == 0 { 255 } else { 0 })
            .collect();
        let r = high_frequency_ratio(&plane, 8, 8);
        // DC (inside the disk) plus the Nyquist corner (outside) carry equal energy.
        assert!((r - 0.5).abs() < 1e-9, "got {r}");
    }

    #[test]
    fn impulse_ratio_counts_outside_disk() {
        let mut plane = vec![0u8; 64];
        plane[0] = 1;
        // Flat magnitude: ratio = cells outside the radius-2 disk / 64.
        let inside = (-4..4)
            .flat_map(|dy: i32| (-4..4).map(move |dx: i32| dx * dx + dy * dy))
            .filter(|&d2| d2 <= 4)
            .count();
        let want = (64 - inside) as f64 / 64.0;
        let r = high_frequency_ratio(&plane, 8, 8);
        assert!((r - want).abs() < 1e-9, "got {r}, want {want}");
    }

    #[test]
    fn empty_and_black() {
        assert_eq!(high_frequency_ratio(&[], 0, 0), 0.0);
        assert_eq!(high_frequency_ratio(&[0u8; 9], 3, 3), 0.0);
    }
}
