use crate::error::{BinciError, Result};

fn check_pairs(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(BinciError::LengthMismatch { labels: y_true.len(), scores: y_pred.len() });
    }
    if y_true.is_empty() {
        return Err(BinciError::EmptyInput);
    }
    Ok(())
}

/// Smaller of the mean squared relative errors taken against the forecast
/// and against the truth.
pub fn turnover_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_pairs(y_true, y_pred)?;
    let n = y_true.len() as f64;
    let underforecast = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| ((t - p) / p).powi(2))
        .sum::<f64>()
        / n;
    let reforecast = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| ((t - p) / t).powi(2))
        .sum::<f64>()
        / n;
    Ok(underforecast.min(reforecast))
}

/// Root mean squared log error for lifetime value; forecasts at or above
/// the truth are penalised ten times harder.
pub fn ltv_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_pairs(y_true, y_pred)?;
    let sum_errors: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| {
            let err = (t.ln_1p() - p.ln_1p()).powi(2);
            if t > p {
                err
            } else {
                err * 10.0
            }
        })
        .sum();
    Ok((sum_errors / y_true.len() as f64).sqrt())
}
