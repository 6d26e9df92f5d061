//! Mana costs and mana pools

use crate::error::CostShortfall;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mana colors, plus colorless as a sixth kind of mana
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl Color {
    /// All mana kinds in WUBRG order followed by colorless
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Colorless,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Colorless => 'C',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A mana cost (e.g., "2RR" = 2 generic + 2 red)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u8,
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
    pub colorless: u8,
}

impl ManaCost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mana cost string like "2RR" or "1UB"
    ///
    /// Unknown characters are ignored; card text parsing happens upstream.
    pub fn from_string(s: &str) -> Self {
        let mut cost = ManaCost::new();
        let mut generic: u32 = 0;

        for c in s.chars() {
            match c {
                'W' => cost.white = cost.white.saturating_add(1),
                'U' => cost.blue = cost.blue.saturating_add(1),
                'B' => cost.black = cost.black.saturating_add(1),
                'R' => cost.red = cost.red.saturating_add(1),
                'G' => cost.green = cost.green.saturating_add(1),
                'C' => cost.colorless = cost.colorless.saturating_add(1),
                '0'..='9' => {
                    generic = generic.saturating_mul(10).saturating_add(c.to_digit(10).unwrap_or(0));
                }
                _ => {}
            }
        }

        cost.generic = generic.min(u8::MAX as u32) as u8;
        cost
    }

    /// Requirement for one specific mana kind
    pub fn colored(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    /// Mana value (converted mana cost)
    pub fn cmc(&self) -> u8 {
        [self.white, self.blue, self.black, self.red, self.green, self.colorless]
            .into_iter()
            .fold(self.generic, u8::saturating_add)
    }

    pub fn is_free(&self) -> bool {
        self.cmc() == 0
    }

    /// Component-wise sum of two costs
    pub fn plus(&self, other: &ManaCost) -> ManaCost {
        ManaCost {
            generic: self.generic.saturating_add(other.generic),
            white: self.white.saturating_add(other.white),
            blue: self.blue.saturating_add(other.blue),
            black: self.black.saturating_add(other.black),
            red: self.red.saturating_add(other.red),
            green: self.green.saturating_add(other.green),
            colorless: self.colorless.saturating_add(other.colorless),
        }
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic > 0 || self.cmc() == 0 {
            write!(f, "{}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored(color) {
                write!(f, "{color}")?;
            }
        }
        Ok(())
    }
}

/// Mana pool for a player
///
/// One counter per kind of mana. Pools are emptied (never decremented) at
/// every step boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
    pub colorless: u8,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, color: Color) -> &mut u8 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Colorless => &mut self.colorless,
        }
    }

    pub fn amount(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    pub fn add_color(&mut self, color: Color) {
        self.add(color, 1);
    }

    pub fn add(&mut self, color: Color, amount: u8) {
        let slot = self.slot_mut(color);
        *slot = slot.saturating_add(amount);
    }

    pub fn clear(&mut self) {
        *self = ManaPool::new();
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Check if the pool covers the given cost
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        if Color::ALL
            .iter()
            .any(|&color| self.amount(color) < cost.colored(color))
        {
            return false;
        }
        self.total() >= cost.cmc()
    }

    /// Pay a mana cost from this pool
    ///
    /// Colored and colorless requirements are paid first. Generic is then paid
    /// with colorless mana before colored mana, colored mana in WUBRG order.
    /// On failure the pool is unchanged.
    pub fn pay_cost(&mut self, cost: &ManaCost) -> Result<(), CostShortfall> {
        if !self.can_pay(cost) {
            return Err(CostShortfall::Mana {
                required: *cost,
                available: *self,
            });
        }

        for color in Color::ALL {
            *self.slot_mut(color) -= cost.colored(color);
        }

        let mut generic_remaining = cost.generic;
        let generic_order = [
            Color::Colorless,
            Color::White,
            Color::Blue,
            Color::Black,
            Color::Red,
            Color::Green,
        ];
        for color in generic_order {
            let slot = self.slot_mut(color);
            let used = generic_remaining.min(*slot);
            *slot -= used;
            generic_remaining -= used;
        }

        debug_assert_eq!(generic_remaining, 0, "Failed to pay generic cost");
        Ok(())
    }

    /// Total mana in pool
    pub fn total(&self) -> u8 {
        self.white + self.blue + self.black + self.red + self.green + self.colorless
    }
}

impl fmt::Display for ManaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "empty");
        }
        for color in Color::ALL {
            for _ in 0..self.amount(color) {
                write!(f, "{color}")?;
            }
        }
        Ok(())
    }
}
