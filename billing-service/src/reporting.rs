//! Billing aggregation
//!
//! Every total the engine reports, live or archived, is computed here from
//! assignment lines so storage backends cannot drift apart on rounding.

use crate::error::{BillingError, BillingResult};
use crate::models::Patient;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Fractional digits carried by every monetary value
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a catalog unit price (`DECIMAL(10,2)`)
pub const MAX_UNIT_PRICE_INR: i64 = 100_000_000;

/// Largest quantity a single assignment may carry
pub const MAX_QUANTITY: i32 = 10_000;

/// Normalize an amount to exactly two fractional digits
pub fn money(amount: Decimal) -> Decimal {
    let mut normalized = amount.round_dp(MONEY_SCALE);
    normalized.rescale(MONEY_SCALE);
    normalized
}

/// Accept a catalog unit price: positive, below [`MAX_UNIT_PRICE_INR`] and
/// with no more than two fractional digits. Returns the price rescaled to money.
pub fn check_unit_price(price: Decimal) -> BillingResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(BillingError::validation("price_inr must be greater than 0"));
    }
    if price >= Decimal::from(MAX_UNIT_PRICE_INR) {
        return Err(BillingError::validation(format!(
            "price_inr must be less than {}",
            MAX_UNIT_PRICE_INR
        )));
    }
    if price.normalize().scale() > MONEY_SCALE {
        return Err(BillingError::validation(
            "price_inr must have at most 2 decimal places",
        ));
    }
    Ok(money(price))
}

/// Accept an assignment quantity in `1..=MAX_QUANTITY`
pub fn check_quantity(quantity: i32) -> BillingResult<i32> {
    if quantity < 1 {
        return Err(BillingError::validation("quantity must be at least 1"));
    }
    if quantity > MAX_QUANTITY {
        return Err(BillingError::validation(format!(
            "quantity must be at most {}",
            MAX_QUANTITY
        )));
    }
    Ok(quantity)
}

fn amount_overflow() -> BillingError {
    BillingError::Internal("billing amount out of range".to_string())
}

/// Price of one assignment line: unit price times quantity
pub fn line_total(price: Decimal, quantity: i32) -> BillingResult<Decimal> {
    price
        .checked_mul(Decimal::from(quantity))
        .map(money)
        .ok_or_else(amount_overflow)
}

/// Sum of line totals; zero (never absent) for an empty set
pub fn grand_total<I>(totals: I) -> BillingResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    totals
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, total| sum.checked_add(total))
        .map(money)
        .ok_or_else(amount_overflow)
}

/// One live assignment joined with its item's current name and price
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AssignmentLine {
    pub id: i32,
    #[serde(skip)]
    pub patient_id: i32,
    pub iv_item_id: i32,
    pub item_name: String,
    #[schema(value_type = String, example = "50.00")]
    pub price_inr: Decimal,
    pub quantity: i32,
    /// `price_inr * quantity`
    #[schema(value_type = String, example = "100.00")]
    pub total: Decimal,
    pub assigned_at: DateTime<Utc>,
}

impl AssignmentLine {
    pub fn new(
        id: i32,
        patient_id: i32,
        iv_item_id: i32,
        item_name: String,
        price_inr: Decimal,
        quantity: i32,
        assigned_at: DateTime<Utc>,
    ) -> BillingResult<Self> {
        Ok(Self {
            id,
            patient_id,
            iv_item_id,
            item_name,
            price_inr: money(price_inr),
            quantity,
            total: line_total(price_inr, quantity)?,
            assigned_at,
        })
    }
}

/// Assignment line of the ward-wide summary, carrying patient context
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SummaryLine {
    pub patient_name: String,
    pub room_number: Option<String>,
    pub item_name: String,
    #[schema(value_type = String, example = "80.00")]
    pub price_inr: Decimal,
    pub quantity: i32,
    #[schema(value_type = String, example = "80.00")]
    pub total: Decimal,
    pub assigned_at: DateTime<Utc>,
}

impl SummaryLine {
    pub fn new(
        patient_name: String,
        room_number: Option<String>,
        item_name: String,
        price_inr: Decimal,
        quantity: i32,
        assigned_at: DateTime<Utc>,
    ) -> BillingResult<Self> {
        Ok(Self {
            patient_name,
            room_number,
            item_name,
            price_inr: money(price_inr),
            quantity,
            total: line_total(price_inr, quantity)?,
            assigned_at,
        })
    }
}

/// Revenue across every live assignment
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BillingSummary {
    #[schema(value_type = String, example = "180.00")]
    pub total_revenue: Decimal,
    pub assignments: Vec<SummaryLine>,
}

impl BillingSummary {
    pub fn from_lines(mut assignments: Vec<SummaryLine>) -> BillingResult<Self> {
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        let total_revenue = grand_total(assignments.iter().map(|line| line.total))?;
        Ok(Self {
            total_revenue,
            assignments,
        })
    }
}

/// Running bill of one live patient
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatientCharge {
    pub id: i32,
    pub name: String,
    #[schema(value_type = String, example = "0.00")]
    pub total_amount: Decimal,
}

/// Itemized bill of one patient; empty when the patient is unknown
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatientBilling {
    pub patient: Option<Patient>,
    pub assignments: Vec<AssignmentLine>,
    #[schema(value_type = String, example = "180.00")]
    pub total_amount: Decimal,
}

impl PatientBilling {
    pub fn new(patient: Option<Patient>, assignments: Vec<AssignmentLine>) -> BillingResult<Self> {
        let total_amount = grand_total(assignments.iter().map(|line| line.total))?;
        Ok(Self {
            patient,
            assignments,
            total_amount,
        })
    }

    /// Result for an id with no live patient
    pub fn empty() -> Self {
        Self {
            patient: None,
            assignments: Vec::new(),
            total_amount: money(Decimal::ZERO),
        }
    }
}

/// One entry of a nurse's IV history view
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IvHistoryEntry {
    pub id: i32,
    pub item_name: String,
    pub quantity: i32,
    pub assigned_at: DateTime<Utc>,
}

impl From<AssignmentLine> for IvHistoryEntry {
    fn from(line: AssignmentLine) -> Self {
        Self {
            id: line.id,
            item_name: line.item_name,
            quantity: line.quantity,
            assigned_at: line.assigned_at,
        }
    }
}

/// IV assignments of one live patient, without prices
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IvHistory {
    pub patient: Patient,
    pub assignments: Vec<IvHistoryEntry>,
}

/// Sort charges the way billing lists them: by name, then id
pub fn sort_charges(charges: &mut [PatientCharge]) {
    charges.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_always_has_two_digits() {
        assert_eq!(money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(money(dec("180")).to_string(), "180.00");
        assert_eq!(money(dec("12.345")).to_string(), "12.34");
    }

    #[test]
    fn test_line_total_multiplies_price_by_quantity() {
        assert_eq!(line_total(dec("50.00"), 2).unwrap(), dec("100.00"));
        assert_eq!(line_total(dec("80.00"), 1).unwrap().to_string(), "80.00");
    }

    #[test]
    fn test_grand_total_of_nothing_is_zero() {
        let total = grand_total(Vec::<Decimal>::new()).unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn test_patient_billing_totals_lines() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let lines = vec![
            AssignmentLine::new(1, 1, 1, "Saline 500ml".into(), dec("50"), 2, at).unwrap(),
            AssignmentLine::new(2, 1, 2, "Dextrose".into(), dec("80"), 1, at).unwrap(),
        ];
        let billing = PatientBilling::new(None, lines).unwrap();
        assert_eq!(billing.total_amount.to_string(), "180.00");
    }

    #[test]
    fn test_summary_orders_most_recent_first() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let summary = BillingSummary::from_lines(vec![
            SummaryLine::new("Asha".into(), None, "Saline".into(), dec("50"), 1, early).unwrap(),
            SummaryLine::new("Ravi".into(), Some("12B".into()), "Dextrose".into(), dec("80"), 3, late)
                .unwrap(),
        ])
        .unwrap();
        assert_eq!(summary.assignments[0].patient_name, "Ravi");
        assert_eq!(summary.total_revenue, dec("290.00"));
    }

    #[test]
    fn test_serialized_amounts_are_strings() {
        let charge = PatientCharge {
            id: 3,
            name: "Asha".into(),
            total_amount: money(Decimal::ZERO),
        };
        let json = serde_json::to_value(&charge).unwrap();
        assert_eq!(json["total_amount"], "0.00");
    }

    #[test]
    fn test_unit_price_limits() {
        assert_eq!(check_unit_price(dec("50")).unwrap().to_string(), "50.00");
        assert_eq!(check_unit_price(dec("99999999.99")).unwrap(), dec("99999999.99"));
        assert_eq!(check_unit_price(dec("12.50")).unwrap().to_string(), "12.50");

        for rejected in ["0", "-5", "100000000", "10000000000000000000000000000", "12.345"] {
            assert!(
                matches!(check_unit_price(dec(rejected)), Err(BillingError::Validation(_))),
                "{} should be rejected",
                rejected
            );
        }
    }

    #[test]
    fn test_quantity_limits() {
        assert_eq!(check_quantity(1).unwrap(), 1);
        assert_eq!(check_quantity(MAX_QUANTITY).unwrap(), MAX_QUANTITY);
        assert!(check_quantity(0).is_err());
        assert!(check_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_overflowing_line_is_an_error_not_a_panic() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let huge = Decimal::MAX;

        assert!(matches!(line_total(huge, 8), Err(BillingError::Internal(_))));
        assert!(AssignmentLine::new(1, 1, 1, "Bulk".into(), huge, 8, at).is_err());
        assert!(matches!(grand_total([huge, huge]), Err(BillingError::Internal(_))));
    }

    #[test]
    fn test_largest_accepted_bill_fits() {
        let price = check_unit_price(dec("99999999.99")).unwrap();
        let line = line_total(price, MAX_QUANTITY).unwrap();
        assert_eq!(line.to_string(), "999999999900.00");
        assert_eq!(grand_total([line, line]).unwrap().to_string(), "1999999999800.00");
    }
}
