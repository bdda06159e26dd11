use pos_common::Money;
use serde::Serialize;

/// Tax applied to every bill, as a percentage of the subtotal.
pub const TAX_RATE_PCT: u32 = 10;
/// Service charge applied to every bill, as a percentage of the subtotal.
pub const SERVICE_CHARGE_PCT: u32 = 5;
/// The maximum acceptable difference between a tendered or bank-transaction amount and the amount due before it is
/// rejected as a mismatch, in minor currency units.
pub const BANK_AMOUNT_TOLERANCE: Money = Money::from_minor(5_000);

/// The decomposition of an order subtotal into the amounts printed on the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub service_charge: Money,
    /// Reserved for future promotions; always zero for now.
    pub discount: Money,
    pub total: Money,
}

/// Computes tax, service charge and total due from an order subtotal. All rounding is half-up to the minor unit.
pub fn payment_breakdown(subtotal: Money) -> PaymentBreakdown {
    let tax = subtotal.percent(TAX_RATE_PCT);
    let service_charge = subtotal.percent(SERVICE_CHARGE_PCT);
    let discount = Money::zero();
    let total = subtotal + tax + service_charge - discount;
    PaymentBreakdown { subtotal, tax, service_charge, discount, total }
}

/// Splits `total` into `share_count` near-equal shares. The last share absorbs the rounding remainder so the shares
/// always sum to exactly `total`.
pub fn split_shares(total: Money, share_count: u32) -> Vec<Money> {
    assert!(share_count >= 1, "cannot split a bill into zero shares");
    let per_share = total.divided_by(share_count);
    let mut shares = vec![per_share; share_count as usize];
    let head: Money = per_share * i64::from(share_count - 1);
    shares[share_count as usize - 1] = total - head;
    shares
}
