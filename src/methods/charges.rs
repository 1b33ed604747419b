use crate::methods::duration::{self, BookingDuration};
use crate::methods::money::{format_amount, round2};
use crate::methods::offering_ledger::OfferingLedger;
use crate::model::{LineItem, Package, PricingQuote};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Charges {
    pub vehicle_charge: f64,
    pub package_charge: f64,
    pub offering_charge: f64,
    pub subtotal: f64,
    pub line_items: Vec<LineItem>,
    pub included_offerings: Vec<String>,
}

/// Average daily rate implied by the quote: its subtotal spread over the
/// quoted full days plus partial hours.
pub fn average_daily_rate(quote: Option<&PricingQuote>) -> f64 {
    let Some(quote) = quote else {
        return 0.0;
    };
    let quoted_days = quote.total_full_days + quote.total_partial_hours / 24.0;
    if quoted_days > 0.0 { quote.subtotal / quoted_days } else { 0.0 }
}

fn title_case(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_line_items(quote: &PricingQuote) -> Vec<LineItem> {
    if let Some(pricings) = quote.applicable_pricings.as_ref().filter(|p| !p.is_empty()) {
        return pricings
            .iter()
            .map(|p| {
                let label = match (p.category.is_empty(), p.rate_type.is_empty()) {
                    (false, false) => format!("{} ({})", title_case(&p.category), title_case(&p.rate_type)),
                    (false, true) => title_case(&p.category),
                    (true, false) => title_case(&p.rate_type),
                    (true, true) => "Vehicle rate".to_string(),
                };
                LineItem {
                    label,
                    amount: round2(p.line_total),
                    helper: format!("{} × {}", p.applicable_units, format_amount(p.rate)),
                }
            })
            .collect();
    }
    quote
        .named_summaries()
        .into_iter()
        .filter(|(_, s)| !s.is_empty())
        .map(|(label, s)| {
            let label = if s.category.is_empty() {
                label.to_string()
            } else {
                format!("{} ({})", label, title_case(&s.category))
            };
            LineItem {
                label,
                amount: round2(s.subtotal),
                helper: format!("{} × {}", s.units, format_amount(s.unit_rate)),
            }
        })
        .collect()
}

pub fn compute_charges(
    booking_duration: &BookingDuration,
    quote: Option<&PricingQuote>,
    package: Option<&Package>,
    ledger: &OfferingLedger,
) -> Charges {
    let total_days = booking_duration.total_days;
    let avg_rate = average_daily_rate(quote);
    let base_vehicle = avg_rate * total_days;
    let vehicle_charge = round2(base_vehicle);

    let package_charge = if total_days == 0.0 {
        0.0
    } else {
        match package {
            Some(package) => round2(base_vehicle * package.modifier()),
            None => round2(base_vehicle),
        }
    };

    let mut line_items: Vec<LineItem> = Vec::new();
    let mut included_offerings: Vec<String> = Vec::new();

    if let Some(quote) = quote {
        line_items.extend(quote_line_items(quote));
    }

    if let Some(package) = package {
        let modifier = package.modifier();
        if modifier != 1.0 {
            let label = if package.name.is_empty() {
                "Package adjustment".to_string()
            } else {
                format!("Package adjustment ({})", package.name)
            };
            line_items.push(LineItem {
                label,
                amount: round2(vehicle_charge * (modifier - 1.0)),
                helper: format!("{}% of vehicle rate", round2(modifier * 100.0)),
            });
        }
    }

    if quote.is_none() && package_charge > 0.0 {
        line_items.push(LineItem {
            label: "Vehicle rate".to_string(),
            amount: package_charge,
            helper: duration::format_duration(booking_duration.total_hours),
        });
    }

    let mut offering_sum = 0.0;
    for selection in ledger.selections() {
        if selection.included {
            let name = if selection.offering.name.trim().is_empty() {
                format!("Offering #{}", selection.offering.id)
            } else {
                selection.offering.name.clone()
            };
            included_offerings.push(name);
        }
        let billable = selection.billable_quantity();
        if billable == 0 {
            continue;
        }
        let unit_price = selection.unit_price();
        let amount = unit_price * billable as f64;
        offering_sum += amount;

        let mut helper = format!(
            "{} {} × {}",
            billable,
            selection.offering.offering_type.unit_label(billable),
            format_amount(unit_price)
        );
        if selection.included {
            helper.push_str(" (1 included)");
        }
        line_items.push(LineItem {
            label: selection.offering.name.clone(),
            amount: round2(amount),
            helper,
        });
    }
    let offering_charge = round2(offering_sum);

    let vehicle_side = quote.and_then(|q| q.analysis_subtotal()).unwrap_or(package_charge);
    let subtotal = round2(vehicle_side + offering_charge);

    Charges {
        vehicle_charge,
        package_charge,
        offering_charge,
        subtotal,
        line_items,
        included_offerings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApplicablePricing, Offering, PricingAnalysis, RateSummary};

    fn three_day_quote() -> PricingQuote {
        PricingQuote {
            total_full_days: 3.0,
            total_partial_hours: 0.0,
            subtotal: 300.0,
            applicable_pricings: Some(vec![ApplicablePricing {
                rate_type: "DAILY".to_string(),
                category: "WEEKDAY".to_string(),
                applicable_units: 3.0,
                rate: 100.0,
                line_total: 300.0,
            }]),
            ..Default::default()
        }
    }

    fn three_days() -> BookingDuration {
        BookingDuration { total_days: 3.0, total_hours: 72.0 }
    }

    fn package(modifier: f64) -> Package {
        Package {
            id: 1,
            name: "Premium".to_string(),
            price_modifier: Some(modifier),
            offerings: vec![],
        }
    }

    #[test]
    fn average_rate_from_quote() {
        assert_eq!(average_daily_rate(Some(&three_day_quote())), 100.0);
        let partial = PricingQuote {
            total_full_days: 1.0,
            total_partial_hours: 12.0,
            subtotal: 150.0,
            ..Default::default()
        };
        assert_eq!(average_daily_rate(Some(&partial)), 100.0);
        assert_eq!(average_daily_rate(Some(&PricingQuote::default())), 0.0);
        assert_eq!(average_daily_rate(None), 0.0);
    }

    #[test]
    fn vehicle_only_booking() {
        let charges = compute_charges(&three_days(), Some(&three_day_quote()), None, &OfferingLedger::new());
        assert_eq!(charges.vehicle_charge, 300.0);
        assert_eq!(charges.package_charge, 300.0);
        assert_eq!(charges.subtotal, 300.0);
        assert_eq!(charges.line_items.len(), 1);
        assert_eq!(charges.line_items[0].label, "Weekday (Daily)");
        assert_eq!(charges.line_items[0].amount, 300.0);
    }

    #[test]
    fn package_modifier_applies_to_base() {
        let charges = compute_charges(&three_days(), Some(&three_day_quote()), Some(&package(1.5)), &OfferingLedger::new());
        assert_eq!(charges.vehicle_charge, 300.0);
        assert_eq!(charges.package_charge, 450.0);
        assert_eq!(charges.subtotal, 450.0);
        let adjustment = charges
            .line_items
            .iter()
            .find(|l| l.label.starts_with("Package adjustment"))
            .unwrap();
        assert_eq!(adjustment.amount, 150.0);
    }

    #[test]
    fn neutral_package_has_no_adjustment_line() {
        let mut neutral = package(1.0);
        neutral.price_modifier = None;
        let charges = compute_charges(&three_days(), Some(&three_day_quote()), Some(&neutral), &OfferingLedger::new());
        assert_eq!(charges.package_charge, 300.0);
        assert!(charges.line_items.iter().all(|l| !l.label.starts_with("Package")));
    }

    #[test]
    fn zero_days_zeroes_package_charge() {
        let charges = compute_charges(&BookingDuration::default(), Some(&three_day_quote()), Some(&package(1.5)), &OfferingLedger::new());
        assert_eq!(charges.package_charge, 0.0);
        assert_eq!(charges.vehicle_charge, 0.0);
    }

    #[test]
    fn included_unit_is_free() {
        let gps = Offering {
            id: 4,
            name: "GPS".to_string(),
            price: Some(20.0),
            ..Default::default()
        };
        let mut ledger = OfferingLedger::new();
        ledger.reconcile(&[], &[gps.clone()]);
        ledger.set_quantity(4, 3);

        let charges = compute_charges(&three_days(), Some(&three_day_quote()), None, &ledger);
        assert_eq!(charges.offering_charge, 40.0);
        assert_eq!(charges.subtotal, 340.0);
        assert_eq!(charges.included_offerings, vec!["GPS".to_string()]);
        let line = charges.line_items.iter().find(|l| l.label == "GPS").unwrap();
        assert_eq!(line.amount, 40.0);
        assert!(line.helper.contains("(1 included)"));
    }

    #[test]
    fn fully_included_offering_has_no_line() {
        let mut ledger = OfferingLedger::new();
        ledger.reconcile(&[], &[Offering { id: 4, name: "GPS".to_string(), price: Some(20.0), ..Default::default() }]);
        let charges = compute_charges(&three_days(), Some(&three_day_quote()), None, &ledger);
        assert_eq!(charges.offering_charge, 0.0);
        assert!(charges.line_items.iter().all(|l| l.label != "GPS"));
        assert_eq!(charges.included_offerings.len(), 1);
    }

    #[test]
    fn unnamed_included_offering_falls_back_to_id() {
        let mut ledger = OfferingLedger::new();
        ledger.reconcile(&[], &[Offering { id: 11, ..Default::default() }]);
        let charges = compute_charges(&three_days(), Some(&three_day_quote()), None, &ledger);
        assert_eq!(charges.included_offerings, vec!["Offering #11".to_string()]);
    }

    #[test]
    fn unpriced_offering_costs_nothing() {
        let mut ledger = OfferingLedger::new();
        ledger.toggle(&Offering { id: 9, name: "Map".to_string(), ..Default::default() }, true);
        let charges = compute_charges(&three_days(), None, None, &ledger);
        assert_eq!(charges.offering_charge, 0.0);
    }

    #[test]
    fn analysis_subtotal_wins_over_package_charge() {
        let mut quote = three_day_quote();
        quote.analysis = Some(PricingAnalysis { subtotal: Some(275.5), ..Default::default() });
        let charges = compute_charges(&three_days(), Some(&quote), Some(&package(1.5)), &OfferingLedger::new());
        assert_eq!(charges.package_charge, 450.0);
        assert_eq!(charges.subtotal, 275.5);
    }

    #[test]
    fn named_summaries_when_no_rate_tiers() {
        let quote = PricingQuote {
            weekday_daily_summary: Some(RateSummary {
                category: "ECONOMY".to_string(),
                units: 2.0,
                unit_rate: 80.0,
                subtotal: 160.0,
            }),
            weekend_daily_summary: Some(RateSummary::default()),
            holiday_hourly_summary: Some(RateSummary {
                category: String::new(),
                units: 3.0,
                unit_rate: 15.0,
                subtotal: 45.0,
            }),
            ..Default::default()
        };
        let charges = compute_charges(&three_days(), Some(&quote), None, &OfferingLedger::new());
        let labels: Vec<&str> = charges.line_items.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Weekday daily (Economy)", "Holiday hourly"]);
        // no subtotal on this quote shape, so no derived rate
        assert_eq!(charges.vehicle_charge, 0.0);
    }

    #[test]
    fn no_quote_means_no_vehicle_lines() {
        let charges = compute_charges(&three_days(), None, Some(&package(1.5)), &OfferingLedger::new());
        assert_eq!(charges.package_charge, 0.0);
        assert!(charges.line_items.iter().all(|l| l.label != "Vehicle rate"));
    }
}
