use crate::models::BinaryImage;

/// Convert grayscale image to binary using Otsu's thresholding method
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BinaryImage {
    let threshold = calculate_otsu_threshold(gray);
    threshold_binarize(gray, width, height, threshold)
}

/// Otsu's optimal threshold from a single histogram pass
fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut below_count = 0.0f64;
    let mut below_sum = 0.0f64;
    let mut max_variance = 0.0f64;
    let mut optimal_threshold = 128u8;

    // Pixels strictly below `threshold` are dark.
    for threshold in 1..256usize {
        below_count += histogram[threshold - 1] as f64;
        below_sum += (threshold - 1) as f64 * histogram[threshold - 1] as f64;
        let above_count = total - below_count;
        if below_count == 0.0 || above_count == 0.0 {
            continue;
        }
        let mean_below = below_sum / below_count;
        let mean_above = (total_sum - below_sum) / above_count;
        let variance =
            (below_count / total) * (above_count / total) * (mean_below - mean_above).powi(2);
        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryImage {
    BinaryImage::from_fn(width, height, |x, y| gray[y * width + x] < threshold)
}

/// Local mean thresholding over a `block` x `block` window using an integral image.
///
/// A pixel is dark when it is more than 5% darker than its neighbourhood mean.
pub fn adaptive_binarize(gray: &[u8], width: usize, height: usize, block: usize) -> BinaryImage {
    if width == 0 || height == 0 {
        return BinaryImage::new(width, height);
    }
    let integral = integral_image(gray, width, height);
    let stride = width + 1;
    let radius = (block / 2).max(1);

    BinaryImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(width);
        let y1 = (y + radius + 1).min(height);
        let area = ((x1 - x0) * (y1 - y0)) as u64;
        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        (gray[y * width + x] as u64) * area * 100 < sum * 95
    })
}

/// Summed-area table with a zero row and column prepended
fn integral_image(gray: &[u8], width: usize, height: usize) -> Vec<u64> {
    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += gray[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }
    integral
}
