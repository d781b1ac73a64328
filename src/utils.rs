use statrs::statistics::Statistics;

/// `info!` that strips ANSI colour escapes unless `$colorful` is set,
/// so file logs stay readable.
#[macro_export]
macro_rules! cinfo {
    ($colorful:expr, $($arg:tt)*) => {
        if $colorful {
            log::info!($($arg)*);
        } else {
            log::info!("{}", $crate::utils::strip_ansi(&format!($($arg)*)));
        }
    };
}

/// Remove `ESC [ ... m` sequences from a string
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Quantile of already sorted data, interpolating linearly between the two
/// closest ranks (`q=0` gives the min, `q=1` the max). NaN on empty input.
pub fn quantile_linear_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let i = pos.floor() as usize;
    let j = pos.ceil() as usize;
    if i == j {
        return sorted[i];
    }
    let t = pos - i as f64;
    (1.0 - t) * sorted[i] + t * sorted[j]
}

/// Lower and upper quantiles of `values` for a two-sided `conf` interval
pub fn percentile_interval(values: &[f64], conf: f64) -> (f64, f64) {
    let (lo_q, hi_q) = interval_levels(conf);
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    (quantile_linear_sorted(&sorted, lo_q), quantile_linear_sorted(&sorted, hi_q))
}

/// `((1 - conf) / 2, 1 - (1 - conf) / 2)`
pub fn interval_levels(conf: f64) -> (f64, f64) {
    let alpha = (1.0 - conf) / 2.0;
    (alpha, 1.0 - alpha)
}

/// Mean and sample standard deviation (0 for a single value)
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.len() < 2 {
        return (values.iter().copied().mean(), 0.0);
    }
    (values.iter().copied().mean(), values.iter().copied().std_dev())
}
