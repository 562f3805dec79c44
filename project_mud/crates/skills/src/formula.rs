//! Effect formulas: `NdM [+ N] [+ S[/K]]`.
//!
//! Terms are joined with `+`. A term is a dice roll (`2d6`), a flat number,
//! or a stat letter with an optional divisor (`I/2` is intelligence halved,
//! rounded down).

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::FormulaError;
use crate::stat::{Attributes, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
}

impl Dice {
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides) as i32)
            .sum()
    }
}

impl FromStr for Dice {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FormulaError::InvalidDice(s.to_string());
        let (count, sides) = s.trim().split_once(['d', 'D']).ok_or_else(bad)?;
        let count = if count.trim().is_empty() {
            1
        } else {
            count.trim().parse().map_err(|_| bad())?
        };
        let sides: u32 = sides.trim().parse().map_err(|_| bad())?;
        if sides == 0 {
            return Err(bad());
        }
        Ok(Dice { count, sides })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatTerm {
    stat: Stat,
    divisor: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Formula {
    dice: Vec<Dice>,
    flat: i32,
    stats: Vec<StatTerm>,
}

impl Formula {
    /// A formula that always yields zero ("0" in data files).
    pub fn is_zero(&self) -> bool {
        self.dice.is_empty() && self.flat == 0 && self.stats.is_empty()
    }

    /// Sum of the stat-scaling terms for the given attributes.
    pub fn stat_bonus(&self, attrs: &Attributes) -> i32 {
        self.stats
            .iter()
            .map(|t| t.stat.of(attrs) / t.divisor)
            .sum()
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R, attrs: &Attributes) -> i32 {
        let dice: i32 = self.dice.iter().map(|d| d.roll(rng)).sum();
        dice + self.flat + self.stat_bonus(attrs)
    }

    /// Smallest possible result (every die shows 1).
    pub fn min(&self, attrs: &Attributes) -> i32 {
        let dice: i64 = self.dice.iter().map(|d| i64::from(d.count)).sum();
        self.bounded(dice, attrs)
    }

    /// Largest possible result. Saturates at `i32::MAX` for huge dice.
    pub fn max(&self, attrs: &Attributes) -> i32 {
        let dice: i64 = self
            .dice
            .iter()
            .map(|d| i64::from(d.count) * i64::from(d.sides))
            .sum();
        self.bounded(dice, attrs)
    }

    fn bounded(&self, dice: i64, attrs: &Attributes) -> i32 {
        let total = dice + i64::from(self.flat) + i64::from(self.stat_bonus(attrs));
        total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut formula = Formula::default();
        for raw in s.split('+') {
            let term = raw.trim();
            if term.is_empty() {
                return Err(FormulaError::InvalidTerm(raw.to_string()));
            }

            if let Ok(n) = term.parse::<i32>() {
                formula.flat += n;
                continue;
            }

            let mut chars = term.chars();
            let first = chars.next().unwrap_or_default();
            if first.is_ascii_digit() {
                formula.dice.push(term.parse()?);
                continue;
            }

            let stat = Stat::from_formula_letter(first)
                .ok_or_else(|| FormulaError::InvalidTerm(term.to_string()))?;
            let rest = chars.as_str().trim();
            let divisor = if rest.is_empty() {
                1
            } else {
                rest.strip_prefix('/')
                    .and_then(|d| d.trim().parse::<i32>().ok())
                    .filter(|d| *d > 0)
                    .ok_or_else(|| FormulaError::InvalidTerm(term.to_string()))?
            };
            formula.stats.push(StatTerm { stat, divisor });
        }
        Ok(formula)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms: Vec<String> = self
            .dice
            .iter()
            .map(|d| format!("{}d{}", d.count, d.sides))
            .collect();
        if self.flat != 0 || (self.dice.is_empty() && self.stats.is_empty()) {
            terms.push(self.flat.to_string());
        }
        for t in &self.stats {
            if t.divisor == 1 {
                terms.push(t.stat.formula_letter().to_string());
            } else {
                terms.push(format!("{}/{}", t.stat.formula_letter(), t.divisor));
            }
        }
        f.write_str(&terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ATTRS: Attributes = [16, 14, 12, 10, 13, 8, 11];

    #[test]
    fn parses_dice_with_stat_divisor() {
        let f: Formula = "1d6 + I/2".parse().unwrap();
        assert_eq!(f.stat_bonus(&ATTRS), 7);
        assert_eq!(f.min(&ATTRS), 8);
        assert_eq!(f.max(&ATTRS), 13);
        assert_eq!(f.to_string(), "1d6 + I/2");
    }

    #[test]
    fn parses_flat_and_bare_stat() {
        let f: Formula = "2d4 + 3 + W".parse().unwrap();
        assert_eq!(f.min(&ATTRS), 2 + 3 + 12);
        assert_eq!(f.max(&ATTRS), 8 + 3 + 12);
    }

    #[test]
    fn zero_formula() {
        let f: Formula = "0".parse().unwrap();
        assert!(f.is_zero());
        assert_eq!(f.to_string(), "0");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<Formula>(), Err(FormulaError::Empty));
        assert!(matches!("1d0".parse::<Formula>(), Err(FormulaError::InvalidDice(_))));
        assert!(matches!("1d6 + Q".parse::<Formula>(), Err(FormulaError::InvalidTerm(_))));
        assert!(matches!("S/0".parse::<Formula>(), Err(FormulaError::InvalidTerm(_))));
        assert!(matches!("1d6 +".parse::<Formula>(), Err(FormulaError::InvalidTerm(_))));
    }

    #[test]
    fn bounds_saturate_for_huge_dice() {
        let f: Formula = "100000d100000 + 5".parse().unwrap();
        let attrs = [10; 7];
        assert_eq!(f.max(&attrs), i32::MAX);
        assert_eq!(f.min(&attrs), 100_005);

        let f: Formula = "4000000000d2".parse().unwrap();
        assert_eq!(f.min(&attrs), i32::MAX);
    }

    #[test]
    fn rolls_stay_in_bounds() {
        let f: Formula = "3d6 + S/2".parse().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = f.roll(&mut rng, &ATTRS);
            assert!((f.min(&ATTRS)..=f.max(&ATTRS)).contains(&v));
        }
    }
}
