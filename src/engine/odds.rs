/// Probability → American moneyline.
///
/// Favourites (p > 0.5) quote negative: the stake needed to win 100.
/// Underdogs quote positive: the profit on a 100 stake.
/// `p` is clamped to [0.001, 0.999] so the price is always finite.
pub fn to_american_odds(p: f64) -> String {
    let p = p.clamp(0.001, 0.999);
    let odds = if p > 0.5 {
        -100.0 * p / (1.0 - p)
    } else {
        100.0 * (1.0 - p) / p
    };
    format!("{:+}", odds.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(odds: &str) -> i64 {
        assert!(odds.starts_with('+') || odds.starts_with('-'), "unsigned: {odds}");
        assert!(odds[1..].chars().all(|c| c.is_ascii_digit()), "bad digits: {odds}");
        odds.parse().unwrap()
    }

    #[test]
    fn favourite_and_underdog_signs() {
        for p in [0.51, 0.6, 0.75, 0.9, 0.99] {
            assert!(parse(&to_american_odds(p)) < 0, "favourite p={p}");
            assert!(parse(&to_american_odds(1.0 - p)) > 0, "underdog p={}", 1.0 - p);
        }
    }

    #[test]
    fn known_prices() {
        assert_eq!(to_american_odds(0.6), "-150");
        assert_eq!(to_american_odds(0.75), "-300");
        assert_eq!(to_american_odds(0.25), "+300");
        assert_eq!(to_american_odds(0.4), "+150");
    }

    #[test]
    fn even_money_at_one_half() {
        assert_eq!(to_american_odds(0.5), "+100");
        // Just past even the favourite side rounds to the same magnitude
        assert_eq!(to_american_odds(0.5001), "-100");
    }

    #[test]
    fn extremes_are_clamped() {
        assert_eq!(to_american_odds(1.0), "-99900");
        assert_eq!(to_american_odds(0.0), "+99900");
        assert_eq!(to_american_odds(f64::MIN_POSITIVE), "+99900");
    }
}
