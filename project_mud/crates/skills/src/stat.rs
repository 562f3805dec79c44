use std::fmt;

use serde::{Deserialize, Serialize};

/// The seven attribute scores, stored in this order.
pub type Attributes = [i32; 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Strength,
    Intelligence,
    Wisdom,
    Dexterity,
    Constitution,
    Luck,
    Charisma,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Strength,
        Stat::Intelligence,
        Stat::Wisdom,
        Stat::Dexterity,
        Stat::Constitution,
        Stat::Luck,
        Stat::Charisma,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn of(self, attrs: &Attributes) -> i32 {
        attrs[self.index()]
    }

    /// Single-letter code used in effect formulas (`S D C I W L H`).
    pub fn from_formula_letter(c: char) -> Option<Stat> {
        match c.to_ascii_uppercase() {
            'S' => Some(Stat::Strength),
            'D' => Some(Stat::Dexterity),
            'C' => Some(Stat::Constitution),
            'I' => Some(Stat::Intelligence),
            'W' => Some(Stat::Wisdom),
            'L' => Some(Stat::Luck),
            'H' => Some(Stat::Charisma),
            _ => None,
        }
    }

    pub fn formula_letter(self) -> char {
        match self {
            Stat::Strength => 'S',
            Stat::Dexterity => 'D',
            Stat::Constitution => 'C',
            Stat::Intelligence => 'I',
            Stat::Wisdom => 'W',
            Stat::Luck => 'L',
            Stat::Charisma => 'H',
        }
    }

    /// Accepts full names and three-letter abbreviations, case-insensitive.
    pub fn from_name(name: &str) -> Option<Stat> {
        match name.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" => Some(Stat::Strength),
            "intelligence" | "int" => Some(Stat::Intelligence),
            "wisdom" | "wis" => Some(Stat::Wisdom),
            "dexterity" | "dex" => Some(Stat::Dexterity),
            "constitution" | "con" => Some(Stat::Constitution),
            "luck" | "lck" => Some(Stat::Luck),
            "charisma" | "cha" => Some(Stat::Charisma),
            _ => None,
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Stat::Strength => "STR",
            Stat::Intelligence => "INT",
            Stat::Wisdom => "WIS",
            Stat::Dexterity => "DEX",
            Stat::Constitution => "CON",
            Stat::Luck => "LCK",
            Stat::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stat::Strength => "strength",
            Stat::Intelligence => "intelligence",
            Stat::Wisdom => "wisdom",
            Stat::Dexterity => "dexterity",
            Stat::Constitution => "constitution",
            Stat::Luck => "luck",
            Stat::Charisma => "charisma",
        };
        f.write_str(name)
    }
}
