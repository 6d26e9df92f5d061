//! Cost system for spells and activated abilities
//!
//! Represents the various costs players pay: tapping, mana, life,
//! sacrificing the source, and adding or removing counters.

use crate::core::{CounterType, ManaCost};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cost that must be paid to cast a spell or activate an ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cost {
    /// Tap the source ({T})
    Tap,

    /// Pay mana
    Mana(ManaCost),

    /// Pay life
    PayLife { amount: i32 },

    /// Sacrifice the source
    SacrificeSelf,

    /// Remove counters from the source (planeswalker minus abilities)
    RemoveCounters { counter: CounterType, amount: u8 },

    /// Put counters on the source (planeswalker plus abilities)
    AddCounters { counter: CounterType, amount: u8 },

    /// Composite cost (all parts are paid or none are)
    Composite(Vec<Cost>),
}

impl Cost {
    /// "{T}, {N}" style combination
    pub fn tap_and_mana(mana: &str) -> Self {
        Cost::Composite(vec![Cost::Tap, Cost::Mana(ManaCost::from_string(mana))])
    }

    /// Flatten composites into their leaf components
    pub fn components(&self) -> Vec<&Cost> {
        match self {
            Cost::Composite(parts) => parts.iter().flat_map(|c| c.components()).collect(),
            other => vec![other],
        }
    }

    /// Total mana in this cost
    pub fn mana(&self) -> ManaCost {
        self.components()
            .into_iter()
            .fold(ManaCost::new(), |acc, c| match c {
                Cost::Mana(m) => acc.plus(m),
                _ => acc,
            })
    }

    pub fn requires_tap(&self) -> bool {
        self.components().iter().any(|c| matches!(c, Cost::Tap))
    }

    /// Planeswalker loyalty cost (+N or -N loyalty)
    pub fn is_loyalty(&self) -> bool {
        self.components().iter().any(|c| {
            matches!(
                c,
                Cost::AddCounters { counter: CounterType::Loyalty, .. }
                    | Cost::RemoveCounters { counter: CounterType::Loyalty, .. }
            )
        })
    }

    /// Cost consisting only of {T}
    pub fn is_tap_only(&self) -> bool {
        let parts = self.components();
        !parts.is_empty() && parts.iter().all(|c| matches!(c, Cost::Tap))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Tap => write!(f, "{{T}}"),
            Cost::Mana(m) => write!(f, "{m}"),
            Cost::PayLife { amount } => write!(f, "Pay {amount} life"),
            Cost::SacrificeSelf => write!(f, "Sacrifice this"),
            Cost::RemoveCounters { counter, amount } => write!(f, "-{amount} {counter}"),
            Cost::AddCounters { counter, amount } => write!(f, "+{amount} {counter}"),
            Cost::Composite(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}
