use crate::methods::money::round2;
use crate::model::{Discount, DiscountType};

/// Returns `(discount_amount, total)`. The discount never exceeds the
/// subtotal, so the total never goes negative.
pub fn apply_discount(discount: Option<&Discount>, subtotal: f64) -> (f64, f64) {
    let discount_amount = match discount {
        Some(discount) if subtotal > 0.0 => {
            let raw = match discount.discount_type {
                DiscountType::Percentage => discount.value / 100.0 * subtotal,
                DiscountType::Flat => discount.value,
            };
            // negative catalog values clamp to zero
            round2(raw.min(subtotal).max(0.0))
        }
        _ => 0.0,
    };
    (discount_amount, round2(subtotal - discount_amount))
}
