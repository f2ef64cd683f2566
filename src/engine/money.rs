use crate::domain::MoneyMode;

/// Map a monetary amount to a contribution magnitude under `mode`.
///
/// Non-positive amounts always contribute 0.
pub fn transform(amount: f64, mode: MoneyMode) -> f64 {
    if amount.is_nan() || amount <= 0.0 {
        return 0.0;
    }
    match mode {
        MoneyMode::Sqrt => amount.sqrt(),
        MoneyMode::Log => (amount + 1.0).ln(),
        MoneyMode::Linear => amount,
    }
}
