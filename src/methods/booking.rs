use crate::helper_model::ValidationError;
use crate::methods::{charges, discount, duration, offering_ledger::OfferingLedger, timestamps, wizard};
use crate::methods::duration::BookingDuration;
use crate::methods::money::round2;
use crate::methods::timestamps::BookingZone;
use crate::model::{
    BookingDraft, BookingOfferingPayload, BookingPayload, Discount, Package, PricingBreakdown,
    PricingQuote, PricingSummary,
};

/// Everything the pricing core reads for one booking.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub draft: &'a BookingDraft,
    pub ledger: &'a OfferingLedger,
    pub quote: Option<&'a PricingQuote>,
    pub package: Option<&'a Package>,
    pub discount: Option<&'a Discount>,
    pub zone: &'a BookingZone,
}

impl PricingContext<'_> {
    pub fn duration(&self) -> BookingDuration {
        duration::draft_duration(self.draft, self.zone)
    }
}

pub fn price_booking(ctx: &PricingContext) -> PricingBreakdown {
    let booking_duration = ctx.duration();
    let charges = charges::compute_charges(&booking_duration, ctx.quote, ctx.package, ctx.ledger);
    let (discount_amount, total) = discount::apply_discount(ctx.discount, charges.subtotal);
    PricingBreakdown {
        summary: PricingSummary {
            vehicle_charge: charges.vehicle_charge,
            package_charge: charges.package_charge,
            offering_charge: charges.offering_charge,
            discount_amount,
            subtotal: charges.subtotal,
            total,
        },
        total_days: booking_duration.total_days,
        total_hours: booking_duration.total_hours,
        duration_label: duration::format_duration(booking_duration.total_hours),
        line_items: charges.line_items,
        included_offerings: charges.included_offerings,
    }
}

/// Validates the draft and assembles the booking-creation body.
pub fn build_payload(ctx: &PricingContext) -> Result<BookingPayload, ValidationError> {
    let booking_duration = ctx.duration();
    wizard::validate_submission(ctx.draft, &booking_duration, ctx.zone)?;

    let (Some(vehicle_id), Some(start), Some(end)) = (
        ctx.draft.vehicle_id,
        timestamps::parse_optional(ctx.draft.start_date.as_deref(), ctx.zone),
        timestamps::parse_optional(ctx.draft.end_date.as_deref(), ctx.zone),
    ) else {
        return Err(ValidationError::MissingDates);
    };

    let breakdown = price_booking(ctx);
    let offerings = ctx
        .ledger
        .selections()
        .map(|s| BookingOfferingPayload {
            offering_id: s.offering.id,
            quantity: s.quantity,
            price: s.unit_price(),
            total_price: round2(s.unit_price() * s.billable_quantity() as f64),
            included: s.included,
        })
        .collect();

    Ok(BookingPayload {
        vehicle_id,
        package_id: ctx.package.map(|p| p.id).or(ctx.draft.package_id),
        discount_id: ctx.discount.map(|d| d.id).or(ctx.draft.discount_id),
        start_date: start.to_rfc3339(),
        end_date: end.to_rfc3339(),
        pickup_location: ctx.draft.pickup_location.clone(),
        dropoff_location: ctx.draft.dropoff_location.clone(),
        insurance_policy: ctx.draft.insurance_policy.clone(),
        total_days: booking_duration.total_days,
        total_rental_fee: breakdown.summary.subtotal,
        final_price: breakdown.summary.total,
        balance_payment: breakdown.summary.total,
        status: ctx.draft.status,
        offerings,
        pricing_summary: breakdown.summary,
        applied_pricing: ctx.quote.cloned(),
    })
}
