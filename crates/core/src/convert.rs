//! Asset → JPY conversion.

use rust_decimal::Decimal;
use tracing::warn;

use cinfo_common::traits::BalanceProvider;

/// `amount × rate(key)`, asking the provider for a fresh rate on every
/// call. An unavailable rate, or a product too large for `Decimal`,
/// converts to zero.
pub async fn to_fiat<P>(provider: &P, key: &str, amount: Decimal) -> Decimal
where
    P: BalanceProvider + ?Sized,
{
    let price = provider.get_rate(key).await.payload.price;
    amount.checked_mul(price).unwrap_or_else(|| {
        warn!(
            provider = provider.name(),
            key,
            amount = %amount,
            price = %price,
            "conversion overflows, counted as zero"
        );
        Decimal::ZERO
    })
}
