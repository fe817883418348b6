use super::domain::{LineItem, LineItemInput};
use super::money::Money;

/// Tax is a fixed zero in this design; totals always equal the subtotal.
pub const TAX: Money = Money::ZERO;

/// Computed invoice amounts, ready to persist. Line items are immutable
/// once drafted; only the stored balance changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub line_items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("an invoice requires at least one line item")]
    EmptyLineItems,
    #[error("line item {index} is missing a description")]
    MissingDescription { index: usize },
    #[error("line item {index} must have a quantity greater than zero")]
    NonPositiveQuantity { index: usize },
    #[error("line item {index} must have a rate greater than zero")]
    NonPositiveRate { index: usize },
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,
    #[error("payment of {amount} exceeds the remaining balance of {balance}")]
    ExceedsBalance { amount: Money, balance: Money },
}

/// Validate line items and compute per-item amounts and the invoice totals.
/// Each amount rounds to the cent at the multiplication; the subtotal is an
/// exact sum of already-rounded cents, so no fractional drift accumulates.
pub fn draft_invoice(items: &[LineItemInput]) -> Result<InvoiceDraft, LedgerError> {
    if items.is_empty() {
        return Err(LedgerError::EmptyLineItems);
    }

    let mut line_items = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(LedgerError::MissingDescription { index });
        }
        if item.quantity <= 0.0 {
            return Err(LedgerError::NonPositiveQuantity { index });
        }
        if !item.rate.is_positive() {
            return Err(LedgerError::NonPositiveRate { index });
        }
        line_items.push(LineItem {
            description: item.description.clone(),
            quantity: item.quantity,
            rate: item.rate,
            amount: item.rate.scale(item.quantity),
        });
    }

    let subtotal: Money = line_items.iter().map(|item| item.amount).sum();
    Ok(InvoiceDraft {
        line_items,
        subtotal,
        tax: TAX,
        total: subtotal,
    })
}

/// Apply a payment against the current balance, returning the new balance.
/// Exact settlement is allowed; overpayment is not.
pub fn apply_payment(balance: Money, amount: Money) -> Result<Money, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount);
    }
    if amount > balance {
        return Err(LedgerError::ExceedsBalance { amount, balance });
    }
    Ok(balance - amount)
}
