use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Resizes to `size`x`size` and lays the pixels out as a normalized NCHW batch of one
pub(crate) fn image_to_tensor(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let side = size as usize;
    Array4::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        (pixel[c] as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c]
    })
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        exps.into_iter().map(|v| v / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

/// Indices and values of the `k` highest entries, highest first
pub(crate) fn top_k(values: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed
}

fn is_wordnet_id(token: &str) -> bool {
    token.len() == 9 && token.starts_with('n') && token[1..].chars().all(|c| c.is_ascii_digit())
}

/// Reads a labels file: one label per line, blank lines skipped, a leading
/// WordNet id (`n01440764 tench, Tinca tinca`) dropped.
pub(crate) fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((head, rest)) if is_wordnet_id(head) => rest.trim().to_string(),
            _ => line.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_to_tensor_shape() {
        let image = DynamicImage::new_rgb8(10, 6);
        let tensor = image_to_tensor(&image, 8);
        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        // black pixels normalize to -mean/std
        let expected = -IMAGENET_MEAN[0] / IMAGENET_STD[0];
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_top_k_orders_descending() {
        let top = top_k(&[0.1, 0.7, 0.2], 2);
        assert_eq!(top, vec![(1, 0.7), (2, 0.2)]);
        assert!(top_k(&[], 5).is_empty());
    }

    #[test]
    fn test_parse_labels_strips_wordnet_ids() {
        let labels = parse_labels("n01440764 tench, Tinca tinca\n\nbanana\n  n07753592 banana  \n");
        assert_eq!(labels, vec!["tench, Tinca tinca", "banana", "banana"]);
    }
}
