use crate::frame::Frame;

/// Number of hue bins; 8-bit hue is stored halved, in `[0, 180)`.
pub(crate) const HUE_BINS: usize = 180;
/// Number of saturation bins.
pub(crate) const SAT_BINS: usize = 256;

/// Splits a frame into its 8-bit hue (`[0, 180)`, degrees / 2) and
/// saturation (`[0, 255]`) planes.
pub fn hsv_planes(frame: &Frame) -> (Vec<u8>, Vec<u8>) {
    let n = frame.width() * frame.height();
    let mut hue = Vec::with_capacity(n);
    let mut sat = Vec::with_capacity(n);

    for px in frame.rgb().chunks_exact(3) {
        let (r, g, b) = (px[0] as f64, px[1] as f64, px[2] as f64);
        let v = r.max(g).max(b);
        let min = r.min(g).min(b);
        let diff = v - min;

        let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

        let mut h = if diff == 0.0 {
            0.0
        } else if v == r {
            60.0 * (g - b) / diff
        } else if v == g {
            120.0 + 60.0 * (b - r) / diff
        } else {
            240.0 + 60.0 * (r - g) / diff
        };
        if h < 0.0 {
            h += 360.0;
        }

        let mut h8 = (h / 2.0).round() as usize;
        if h8 >= HUE_BINS {
            h8 -= HUE_BINS;
        }
        hue.push(h8 as u8);
        sat.push(s.round().clamp(0.0, 255.0) as u8);
    }

    (hue, sat)
}

pub(crate) fn histogram(plane: &[u8], bins: usize) -> Vec<u64> {
    let mut hist = vec![0u64; bins];
    for &v in plane {
        if (v as usize) < bins {
            hist[v as usize] += 1;
        }
    }
    hist
}

/// Shannon entropy, in bits, of a histogram. An empty histogram has
/// entropy 0.
pub fn shannon_entropy(hist: &[u64]) -> f64 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    -hist
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Mean of the hue and saturation entropies, each divided by its maximum
/// `log2(bins)`. In `[0, 1]`.
pub(crate) fn color_diversity(frame: &Frame) -> f64 {
    let (hue, sat) = hsv_planes(frame);
    let h = shannon_entropy(&histogram(&hue, HUE_BINS)) / (HUE_BINS as f64).log2();
    let s = shannon_entropy(&histogram(&sat, SAT_BINS)) / (SAT_BINS as f64).log2();
    (h.clamp(0.0, 1.0) + s.clamp(0.0, 1.0)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> Frame {
        Frame::new(1, 1, vec![r, g, b]).unwrap()
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_planes(&solid(255, 0, 0)), (vec![0], vec![255]));
        assert_eq!(hsv_planes(&solid(0, 255, 0)), (vec![60], vec![255]));
        assert_eq!(hsv_planes(&solid(0, 0, 255)), (vec![120], vec![255]));
    }

    #[test]
    fn hsv_gray_has_no_hue_or_saturation() {
        assert_eq!(hsv_planes(&solid(128, 128, 128)), (vec![0], vec![0]));
        assert_eq!(hsv_planes(&solid(0, 0, 0)), (vec![0], vec![0]));
    }

    #[test]
    fn hue_wraps_below_180() {
        // Hue just under 360 degrees rounds to 180 and wraps to 0.
        let (hue, _) = hsv_planes(&solid(255, 0, 1));
        assert!(hue[0] < 180);
    }

    #[test]
    fn entropy_uniform() {
        let e = shannon_entropy(&[5, 5, 5, 5]);
        assert!((e - 2.0).abs() < 1e-12, "got {e}");
    }

    #[test]
    fn entropy_single_bin() {
        assert_eq!(shannon_entropy(&[0, 9, 0]), 0.0);
    }

    #[test]
    fn entropy_empty() {
        assert_eq!(shannon_entropy(&[0, 0]), 0.0);
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn diversity_bounds() {
        assert_eq!(color_diversity(&solid(10, 200, 30)), 0.0);

        let mut rgb = Vec::new();
        for i in 0..=255u8 {
            rgb.extend_from_slice(&[i, 255 - i, i / 2]);
        }
        let d = color_diversity(&Frame::new(256, 1, rgb).unwrap());
        assert!(d > 0.0 && d <= 1.0, "got {d}");
    }
}
