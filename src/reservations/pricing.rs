use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Flat extra-bed surcharge per night, in whole currency units
pub const EXTRA_BED_RATE_PER_NIGHT: Decimal = Decimal::ONE_HUNDRED;

/// Service for computing reservation totals
pub struct PriceCalculator;

impl PriceCalculator {
    /// Number of billable nights for a stay, clamped to at least 1
    ///
    /// A zero or negative duration is already rejected by reservation
    /// validation; the clamp only guards same-day edge cases that reach the
    /// calculator before validation runs.
    pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
        (check_out - check_in).num_days().max(1)
    }

    /// Total amount for a stay
    ///
    /// `sum(price_i * nights)` over the selected rooms, plus
    /// `nights * EXTRA_BED_RATE_PER_NIGHT` when an extra bed is requested.
    pub fn compute_total(
        room_prices: &[Decimal],
        check_in: NaiveDate,
        check_out: NaiveDate,
        extra_bed: bool,
    ) -> Decimal {
        let nights = Decimal::from(Self::nights(check_in, check_out));

        let rooms_total: Decimal = room_prices.iter().map(|price| *price * nights).sum();
        let extra_bed_fee = if extra_bed {
            nights * EXTRA_BED_RATE_PER_NIGHT
        } else {
            Decimal::ZERO
        };

        rooms_total + extra_bed_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_three_night_stay_single_room() {
        let total = PriceCalculator::compute_total(
            &[dec!(1000)],
            date(2024, 6, 1),
            date(2024, 6, 4),
            false,
        );
        assert_eq!(total, dec!(3000));
    }

    #[test]
    fn test_extra_bed_adds_per_night_fee() {
        let total = PriceCalculator::compute_total(
            &[dec!(1000)],
            date(2024, 6, 1),
            date(2024, 6, 4),
            true,
        );
        assert_eq!(total, dec!(3300));
    }

    #[test]
    fn test_multiple_rooms_summed() {
        let total = PriceCalculator::compute_total(
            &[dec!(1000), dec!(1500.50)],
            date(2024, 6, 1),
            date(2024, 6, 3),
            false,
        );
        assert_eq!(total, dec!(5001.00));
    }

    #[test]
    fn test_minimum_one_night_clamp() {
        // Same-day and inverted ranges never compute 0 or negative nights
        assert_eq!(
            PriceCalculator::nights(date(2024, 6, 1), date(2024, 6, 1)),
            1
        );
        assert_eq!(
            PriceCalculator::nights(date(2024, 6, 5), date(2024, 6, 1)),
            1
        );

        let total = PriceCalculator::compute_total(
            &[dec!(1000)],
            date(2024, 6, 1),
            date(2024, 6, 1),
            true,
        );
        assert_eq!(total, dec!(1100));
    }

    #[test]
    fn test_no_rooms_prices_only_extra_bed() {
        let total =
            PriceCalculator::compute_total(&[], date(2024, 6, 1), date(2024, 6, 3), true);
        assert_eq!(total, dec!(200));
    }
}
