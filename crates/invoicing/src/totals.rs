//! Exact monetary computation for invoice lines.
//!
//! All arithmetic is `Decimal`; nothing is rounded here. Rounding to two
//! decimals happens once, at the wire boundary in the transformer.

use rust_decimal::Decimal;

use factura_core::{FieldError, IssuanceError};

use crate::request::LineItem;

/// VAT percent applied when a line leaves `tax_percent` unspecified.
/// An explicit 0 means "no tax" and does not fall back to this.
pub const DEFAULT_TAX_PERCENT: Decimal = Decimal::from_parts(19, 0, 0, false, 0);

/// Per-line computed amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAmounts {
    /// quantity × unit price, before any adjustment.
    pub base_amount: Decimal,
    /// base − discounts + surcharges.
    pub net_amount: Decimal,
    /// Effective percent: explicit value or the default.
    pub tax_percent: Decimal,
    /// Exact, unrounded tax on the net amount.
    pub tax_amount: Decimal,
}

/// Invoice-level aggregation over all lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub lines: Vec<LineAmounts>,
    pub net_amount: Decimal,
    pub tax_amount: Decimal,
}

impl InvoiceTotals {
    /// Provider compatibility quirk: a zero-tax invoice reports a zero
    /// tax-exclusive total while the tax-inclusive total carries the net.
    pub fn tax_exclusive_amount(&self) -> Decimal {
        if self.tax_amount.is_zero() {
            Decimal::ZERO
        } else {
            self.net_amount
        }
    }

    pub fn tax_inclusive_amount(&self) -> Decimal {
        self.net_amount + self.tax_amount
    }
}

/// Compute amounts for every line and the invoice-level totals.
pub fn compute(items: &[LineItem]) -> Result<InvoiceTotals, IssuanceError> {
    let mut lines = Vec::with_capacity(items.len());
    let mut net_amount = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;

    for item in items {
        let line = compute_line(item)?;
        net_amount += line.net_amount;
        tax_amount += line.tax_amount;
        lines.push(line);
    }

    Ok(InvoiceTotals {
        lines,
        net_amount,
        tax_amount,
    })
}

/// Compute a single line.
///
/// Hard failure: an allowance/charge whose `amount` exceeds its
/// `base_amount`, reported against the owning line's description.
pub fn compute_line(item: &LineItem) -> Result<LineAmounts, IssuanceError> {
    let base_amount = item.quantity * item.unit_price;

    // Signed adjustment relative to the base: discounts subtract,
    // surcharges add.
    let mut discount = Decimal::ZERO;
    for charge in &item.allowance_charges {
        if charge.amount > charge.base_amount {
            return Err(IssuanceError::validation(vec![FieldError::new(
                "items",
                format!(
                    "allowance amount ({}) exceeds base amount ({}) on item \"{}\"",
                    charge.amount, charge.base_amount, item.description
                ),
            )]));
        }
        if charge.is_charge {
            discount -= charge.amount;
        } else {
            discount += charge.amount;
        }
    }

    let net_amount = base_amount - discount;
    let tax_percent = item.tax_percent.unwrap_or(DEFAULT_TAX_PERCENT);
    let tax_amount = if tax_percent > Decimal::ZERO {
        net_amount * tax_percent / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Ok(LineAmounts {
        base_amount,
        net_amount,
        tax_percent,
        tax_amount,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::request::AllowanceCharge;

    fn item(quantity: Decimal, unit_price: Decimal) -> LineItem {
        LineItem {
            description: "Widget".into(),
            code: None,
            quantity,
            unit_price,
            tax_percent: None,
            quantity_units_id: None,
            type_item_identifications_id: None,
            reference_price_id: None,
            allowance_charges: Vec::new(),
        }
    }

    fn discount(amount: Decimal, base_amount: Decimal) -> AllowanceCharge {
        AllowanceCharge {
            amount,
            base_amount,
            is_charge: false,
            reason: None,
        }
    }

    #[test]
    fn worked_example_with_discount_and_default_vat() {
        let mut line = item(dec!(2), dec!(100));
        line.allowance_charges.push(discount(dec!(20), dec!(200)));

        let totals = compute(std::slice::from_ref(&line)).unwrap();
        let amounts = &totals.lines[0];
        assert_eq!(amounts.base_amount, dec!(200));
        assert_eq!(amounts.net_amount, dec!(180));
        assert_eq!(amounts.tax_percent, dec!(19));
        assert_eq!(amounts.tax_amount, dec!(34.20));

        assert_eq!(totals.net_amount, dec!(180));
        assert_eq!(totals.tax_amount, dec!(34.20));
        assert_eq!(totals.tax_exclusive_amount(), dec!(180));
        assert_eq!(totals.tax_inclusive_amount(), dec!(214.20));
    }

    #[test]
    fn zero_tax_quirk_forces_exclusive_total_to_zero() {
        let mut line = item(dec!(1), dec!(100));
        line.tax_percent = Some(dec!(0));

        let totals = compute(std::slice::from_ref(&line)).unwrap();
        assert_eq!(totals.net_amount, dec!(100));
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.tax_exclusive_amount(), Decimal::ZERO);
        assert_eq!(totals.tax_inclusive_amount(), dec!(100));
    }

    #[test]
    fn explicit_zero_percent_is_distinct_from_unspecified() {
        let mut exempt = item(dec!(1), dec!(100));
        exempt.tax_percent = Some(dec!(0));
        let defaulted = item(dec!(1), dec!(100));

        assert_eq!(compute_line(&exempt).unwrap().tax_amount, Decimal::ZERO);
        assert_eq!(compute_line(&defaulted).unwrap().tax_amount, dec!(19));
    }

    #[test]
    fn surcharge_adds_to_the_net_amount() {
        let mut line = item(dec!(1), dec!(100));
        line.tax_percent = Some(dec!(0));
        line.allowance_charges.push(AllowanceCharge {
            amount: dec!(15),
            base_amount: dec!(100),
            is_charge: true,
            reason: None,
        });
        line.allowance_charges.push(discount(dec!(10), dec!(100)));

        let amounts = compute_line(&line).unwrap();
        assert_eq!(amounts.net_amount, dec!(105));
    }

    #[test]
    fn allowance_exceeding_base_names_the_offending_line() {
        let mut line = item(dec!(2), dec!(100));
        line.description = "Premium widget".into();
        line.allowance_charges.push(discount(dec!(201), dec!(200)));

        let err = compute(std::slice::from_ref(&line)).unwrap_err();
        match err {
            IssuanceError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert!(fields[0].message.contains("Premium widget"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn no_intermediate_rounding_across_lines() {
        // 3 × 0.333 at 19% leaves more than two decimals; the engine must
        // carry the exact value.
        let line = item(dec!(3), dec!(0.333));
        let totals = compute(std::slice::from_ref(&line)).unwrap();
        assert_eq!(totals.net_amount, dec!(0.999));
        assert_eq!(totals.tax_amount, dec!(0.18981));
    }

    proptest! {
        #[test]
        fn allowance_within_base_never_rejects(amount in 0u64..=1_000, base in 0u64..=1_000) {
            prop_assume!(amount <= base);
            let mut line = item(dec!(1), Decimal::from(base));
            line.allowance_charges.push(discount(Decimal::from(amount), Decimal::from(base)));
            prop_assert!(compute_line(&line).is_ok());
        }

        #[test]
        fn allowance_above_base_always_rejects(base in 0u64..1_000, excess in 1u64..=1_000) {
            let mut line = item(dec!(1), Decimal::from(base));
            line.allowance_charges.push(discount(Decimal::from(base + excess), Decimal::from(base)));
            prop_assert!(compute_line(&line).is_err());
        }
    }
}
