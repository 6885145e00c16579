//! Validation utilities for ledger inputs
//!
//! Form validators collect every violation instead of stopping at the first,
//! so a caller can report all problems with one submission.

use rust_decimal::Decimal;

use crate::models::{DistributionInput, PurchaseInput};
use crate::types::Violation;

// ============================================================================
// Field Validations
// ============================================================================

/// Validate that a required text field is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && email.len() >= 5 => {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// Validate phone number (7 to 15 digits, common separators allowed)
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')' | '.'))
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have 7 to 15 digits");
    }
    Ok(())
}

/// Validate unit cost is non-negative
pub fn validate_cost_per_item(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost per item cannot be negative");
    }
    Ok(())
}

/// Validate a quantity is a positive whole number that fits the ledger
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    if quantity > i64::from(u32::MAX) {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate that unit cost times quantity fits in a decimal
pub fn validate_total_cost(cost: Decimal, quantity: i64) -> Result<(), &'static str> {
    match cost.checked_mul(Decimal::from(quantity)) {
        Some(_) => Ok(()),
        None => Err("Total cost is too large"),
    }
}

/// Validate a budget amount is non-negative
pub fn validate_budget_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Budget amount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Form Validations
// ============================================================================

fn check(violations: &mut Vec<Violation>, field: &str, result: Result<(), &'static str>) {
    if let Err(message) = result {
        violations.push(Violation::new(field, message));
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Validate a purchase form, returning every violation found
pub fn validate_purchase(input: &PurchaseInput) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(item_id) = &input.item_id {
        check(&mut violations, "item_id", validate_required(item_id));
    }
    check(&mut violations, "item_type", validate_required(&input.item_type));
    check(&mut violations, "item_name", validate_required(&input.item_name));
    check(&mut violations, "cost_per_item", validate_cost_per_item(input.cost_per_item));
    check(&mut violations, "quantity", validate_quantity(input.quantity));
    if violations.iter().all(|v| v.field != "cost_per_item" && v.field != "quantity") {
        check(
            &mut violations,
            "cost_per_item",
            validate_total_cost(input.cost_per_item, input.quantity),
        );
    }
    check(&mut violations, "vendor_name", validate_required(&input.vendor_name));

    if let Some(email) = non_blank(&input.vendor_email) {
        check(&mut violations, "vendor_email", validate_email(email));
    }
    if let Some(phone) = non_blank(&input.vendor_phone) {
        check(&mut violations, "vendor_phone", validate_phone(phone));
    }

    violations
}

/// Validate a distribution form, returning every violation found.
///
/// Stock availability depends on the ledger and is checked there.
pub fn validate_distribution(input: &DistributionInput) -> Vec<Violation> {
    let mut violations = Vec::new();

    check(&mut violations, "item_id", validate_required(&input.item_id));
    check(&mut violations, "quantity", validate_quantity(input.quantity));
    check(&mut violations, "event_type", validate_required(&input.event_type));
    check(&mut violations, "event_name", validate_required(&input.event_name));
    check(&mut violations, "department", validate_required(&input.department));

    if let Some(request_id) = &input.request_id {
        check(&mut violations, "request_id", validate_required(request_id));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn purchase() -> PurchaseInput {
        PurchaseInput {
            item_type: "S".to_string(),
            item_name: "Tote bag".to_string(),
            cost_per_item: Decimal::from_str("4.50").unwrap(),
            quantity: 20,
            vendor_name: "Acme Supplies".to_string(),
            ..Default::default()
        }
    }

    fn distribution() -> DistributionInput {
        DistributionInput {
            item_id: "I1".to_string(),
            quantity: 2,
            event_type: "Orientation".to_string(),
            event_name: "Fall welcome".to_string(),
            department: "Admissions".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("x").is_ok());
        assert!(validate_required("").is_err());
        assert!(validate_required("   ").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("sales@acme.com").is_ok());
        assert!(validate_email("sales.acme.com").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(555) 123-4567").is_ok());
        assert!(validate_phone("+1 555 123 4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
        assert!(validate_quantity(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_validate_cost_per_item() {
        assert!(validate_cost_per_item(Decimal::ZERO).is_ok());
        assert!(validate_cost_per_item(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_total_cost() {
        assert!(validate_total_cost(Decimal::from_str("4.50").unwrap(), 20).is_ok());
        assert!(validate_total_cost(Decimal::MAX, 1).is_ok());
        assert!(validate_total_cost(Decimal::MAX, 2).is_err());
    }

    #[test]
    fn test_purchase_total_too_large_is_a_cost_violation() {
        let input = PurchaseInput {
            cost_per_item: Decimal::from_str("79228162514264337593543950335").unwrap(),
            quantity: 2,
            ..purchase()
        };

        let violations = validate_purchase(&input);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "cost_per_item");
        assert_eq!(violations[0].message, "Total cost is too large");
    }

    #[test]
    fn test_valid_purchase_has_no_violations() {
        assert!(validate_purchase(&purchase()).is_empty());
    }

    #[test]
    fn test_purchase_reports_every_violation() {
        let input = PurchaseInput {
            item_name: String::new(),
            vendor_name: " ".to_string(),
            quantity: 0,
            cost_per_item: Decimal::from(-3),
            ..purchase()
        };

        let fields: Vec<_> = validate_purchase(&input)
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, ["item_name", "cost_per_item", "quantity", "vendor_name"]);
    }

    #[test]
    fn test_purchase_optional_contact_fields() {
        let input = PurchaseInput {
            vendor_email: Some("not-an-email".to_string()),
            vendor_phone: Some(String::new()),
            ..purchase()
        };

        let violations = validate_purchase(&input);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "vendor_email");
    }

    #[test]
    fn test_supplied_item_id_must_not_be_blank() {
        let input = PurchaseInput {
            item_id: Some(String::new()),
            ..purchase()
        };
        assert_eq!(validate_purchase(&input)[0].field, "item_id");
    }

    #[test]
    fn test_valid_distribution_has_no_violations() {
        assert!(validate_distribution(&distribution()).is_empty());
    }

    #[test]
    fn test_distribution_reports_every_violation() {
        let input = DistributionInput {
            quantity: 0,
            event_name: String::new(),
            department: String::new(),
            ..distribution()
        };

        let fields: Vec<_> = validate_distribution(&input)
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(fields, ["quantity", "event_name", "department"]);
    }
}
