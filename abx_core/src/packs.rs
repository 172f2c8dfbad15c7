//! Pack-size selection and tablet rounding.
//!
//! All rounding is round-half-to-even so that identical inputs always map to
//! the same tablet counts.

/// A dispensable tablet strength of one active ingredient
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TabletStrength {
    pub code: &'static str,
    pub name: &'static str,
    pub mg: f64,
}

/// When to abandon a drug's default strength for the alternative
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SwitchPolicy {
    /// Alternative wins whenever its rounding error is strictly smaller
    ClosestWins,
    /// Alternative wins only when its error is strictly smaller AND the
    /// default's error exceeds `tolerance_mg`
    StickyDefault { tolerance_mg: f64 },
}

/// Outcome of [`choose_pack`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackChoice {
    pub strength: TabletStrength,
    pub count: u32,
}

impl PackChoice {
    /// Milligrams actually dispensed
    pub fn delivered_mg(&self) -> f64 {
        self.count as f64 * self.strength.mg
    }
}

/// Round to the nearest integer, ties to even
pub fn round_whole(x: f64) -> f64 {
    x.round_ties_even()
}

/// Round to the nearest half, ties to even in half-units
pub fn round_half(x: f64) -> f64 {
    (x * 2.0).round_ties_even() / 2.0
}

/// Round to a number of decimal places
///
/// Rounds the exact decimal value of `x`, so 0.065 (stored just above the
/// tie) goes up and an exact tie such as 0.125 goes to even.
pub fn round_places(x: f64, places: usize) -> f64 {
    format!("{:.*}", places, x).parse().unwrap_or(x)
}

/// Nearest whole tablet count for `target_mg` at a single strength
pub fn tablets_for(target_mg: f64, strength: &TabletStrength) -> u32 {
    round_whole(target_mg.max(0.0) / strength.mg) as u32
}

/// Choose the strength whose rounded tablet count delivers mg closest to
/// `target_mg`. Ties always go to `default`.
pub fn choose_pack(
    target_mg: f64,
    default: TabletStrength,
    alternative: TabletStrength,
    policy: SwitchPolicy,
) -> PackChoice {
    let default_choice = PackChoice {
        strength: default,
        count: tablets_for(target_mg, &default),
    };
    let alternative_choice = PackChoice {
        strength: alternative,
        count: tablets_for(target_mg, &alternative),
    };

    let default_error = (default_choice.delivered_mg() - target_mg).abs();
    let alternative_error = (alternative_choice.delivered_mg() - target_mg).abs();

    let switch = match policy {
        SwitchPolicy::ClosestWins => alternative_error < default_error,
        SwitchPolicy::StickyDefault { tolerance_mg } => {
            alternative_error < default_error && default_error > tolerance_mg
        }
    };

    let chosen = if switch {
        alternative_choice
    } else {
        default_choice
    };

    tracing::debug!(
        "Pack choice for {:.1} mg: {} x{} (default error {:.1} mg, alternative error {:.1} mg)",
        target_mg,
        chosen.strength.code,
        chosen.count,
        default_error,
        alternative_error
    );

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_HUNDRED: TabletStrength = TabletStrength {
        code: "AX",
        name: "Amoxicillin (500mg)",
        mg: 500.0,
    };
    const TWO_FIFTY: TabletStrength = TabletStrength {
        code: "AM",
        name: "Amoxicillin (250mg)",
        mg: 250.0,
    };
    const STICKY: SwitchPolicy = SwitchPolicy::StickyDefault {
        tolerance_mg: 100.0,
    };

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(round_whole(2.5), 2.0);
        assert_eq!(round_whole(3.5), 4.0);
        assert_eq!(round_half(0.25), 0.0);
        assert_eq!(round_half(0.75), 1.0);
        assert_eq!(round_half(1.3), 1.5);
        assert_eq!(round_places(0.456, 2), 0.46);
    }

    #[test]
    fn test_round_places_uses_exact_decimal_value() {
        // 0.065 is stored as 0.06500000000000000222...
        assert_eq!(round_places(0.065, 2), 0.07);
        assert_eq!(round_places(32.5 / 500.0, 2), 0.07);
        // 0.125 is exact in binary: a true tie
        assert_eq!(round_places(0.125, 2), 0.12);
        assert_eq!(round_places(0.375, 2), 0.38);
        assert_eq!(round_places(41.666, 1), 41.7);
    }

    #[test]
    fn test_tablets_for_never_negative() {
        assert_eq!(tablets_for(-300.0, &FIVE_HUNDRED), 0);
        assert_eq!(tablets_for(1350.0, &FIVE_HUNDRED), 3);
    }

    #[test]
    fn test_closest_wins_prefers_smaller_error() {
        // 1350 mg: 3 x 500 = 1500 (error 150), 5 x 250 = 1250 (error 100)
        let choice = choose_pack(1350.0, FIVE_HUNDRED, TWO_FIFTY, SwitchPolicy::ClosestWins);
        assert_eq!(choice.strength, TWO_FIFTY);
        assert_eq!(choice.count, 5);
    }

    #[test]
    fn test_exact_tie_keeps_default() {
        for target in [0.0, 500.0, 1000.0, 3000.0] {
            let choice = choose_pack(target, FIVE_HUNDRED, TWO_FIFTY, SwitchPolicy::ClosestWins);
            assert_eq!(choice.strength, FIVE_HUNDRED, "target {}", target);

            let sticky = choose_pack(target, FIVE_HUNDRED, TWO_FIFTY, STICKY);
            assert_eq!(sticky.strength, FIVE_HUNDRED, "target {}", target);
        }
    }

    #[test]
    fn test_equal_nonzero_errors_keep_default() {
        // 1900 mg: 4 x 500 = 2000 and 8 x 250 = 2000, both 100 mg over
        let choice = choose_pack(1900.0, FIVE_HUNDRED, TWO_FIFTY, SwitchPolicy::ClosestWins);
        assert_eq!(choice.strength, FIVE_HUNDRED);
        assert_eq!(choice.count, 4);
    }

    #[test]
    fn test_sticky_default_switches_beyond_tolerance() {
        // 350 mg: 1 x 500 (error 150) vs 1 x 250 (error 100)
        let choice = choose_pack(350.0, FIVE_HUNDRED, TWO_FIFTY, STICKY);
        assert_eq!(choice.strength, TWO_FIFTY);
        assert_eq!(choice.count, 1);
        assert_eq!(choice.delivered_mg(), 250.0);

        // 700 mg: 1 x 500 (error 200) vs 3 x 250 (error 50)
        let choice = choose_pack(700.0, FIVE_HUNDRED, TWO_FIFTY, STICKY);
        assert_eq!(choice.strength, TWO_FIFTY);
        assert_eq!(choice.count, 3);
    }

    #[test]
    fn test_sticky_default_within_tolerance() {
        let hundred = TabletStrength {
            code: "D100",
            name: "100 mg",
            mg: 100.0,
        };
        let one_fifty = TabletStrength {
            code: "D150",
            name: "150 mg",
            mg: 150.0,
        };

        // 140 mg: 1 x 100 (error 40) vs 1 x 150 (error 10)
        let sticky = choose_pack(140.0, hundred, one_fifty, STICKY);
        assert_eq!(sticky.strength, hundred);
        let closest = choose_pack(140.0, hundred, one_fifty, SwitchPolicy::ClosestWins);
        assert_eq!(closest.strength, one_fifty);

        // Default error of exactly the tolerance does not switch:
        // 400 mg with 300/150 -> 1 x 300 (error 100) vs 3 x 150 (error 50)
        let three_hundred = TabletStrength {
            code: "D300",
            name: "300 mg",
            mg: 300.0,
        };
        let choice = choose_pack(400.0, three_hundred, one_fifty, STICKY);
        assert_eq!(choice.strength, three_hundred);
        assert_eq!(choice.count, 1);

        // ...but one milligram more does
        let choice = choose_pack(401.0, three_hundred, one_fifty, STICKY);
        assert_eq!(choice.strength, one_fifty);
    }

    #[test]
    fn test_other_strength_pairs() {
        let hundred = TabletStrength {
            code: "D100",
            name: "100 mg",
            mg: 100.0,
        };
        let one_fifty = TabletStrength {
            code: "D150",
            name: "150 mg",
            mg: 150.0,
        };
        // 300 mg is exact for both -> default
        assert_eq!(
            choose_pack(300.0, hundred, one_fifty, SwitchPolicy::ClosestWins).strength,
            hundred
        );
        // 140 mg: 1 x 100 (error 40) vs 1 x 150 (error 10)
        assert_eq!(
            choose_pack(140.0, hundred, one_fifty, SwitchPolicy::ClosestWins).strength,
            one_fifty
        );
    }
}
