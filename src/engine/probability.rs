//! Rating differential → home win probability.
//!
//!   P(home wins) = sigmoid(k · (rating_home − rating_away))

/// Which side the model favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Home,
    Away,
    /// Exactly even; no side is picked.
    TooClose,
}

/// Home-team win probability in (0, 1).
pub fn home_win_probability(rating_home: f64, rating_away: f64, k: f64) -> f64 {
    sigmoid(k * (rating_home - rating_away))
}

pub fn verdict(p_home: f64) -> Verdict {
    let p_away = 1.0 - p_home;
    if p_home > p_away {
        Verdict::Home
    } else if p_away > p_home {
        Verdict::Away
    } else {
        Verdict::TooClose
    }
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const K: f64 = 1.25;

    #[test]
    fn equal_ratings_are_a_coin_flip() {
        for r in [-2.0, -0.4, 0.0, 0.37, 2.0] {
            assert_eq!(home_win_probability(r, r, K), 0.5);
            assert_eq!(verdict(home_win_probability(r, r, K)), Verdict::TooClose);
        }
    }

    #[test]
    fn monotonic_in_rating_gap() {
        let mut prev = 0.0;
        for step in -40..=40 {
            let diff = step as f64 / 10.0;
            let p = home_win_probability(diff, 0.0, K);
            assert!(p > prev, "p({diff}) = {p} not above {prev}");
            assert!(p > 0.0 && p < 1.0);
            prev = p;
        }
    }

    #[test]
    fn home_and_away_are_complementary() {
        let p = home_win_probability(0.9, 0.5, K);
        let q = home_win_probability(0.5, 0.9, K);
        assert_relative_eq!(p + q, 1.0, epsilon = 1e-12);
        assert_eq!(verdict(p), Verdict::Home);
        assert_eq!(verdict(q), Verdict::Away);
    }

    #[test]
    fn steepness_sharpens_the_curve() {
        let soft = home_win_probability(0.4, 0.0, 1.25);
        let sharp = home_win_probability(0.4, 0.0, 3.5);
        assert!(sharp > soft);
        assert_relative_eq!(soft, 1.0 / (1.0 + (-0.5f64).exp()), epsilon = 1e-12);
    }
}
