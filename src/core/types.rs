//! Strongly-typed wrappers for game concepts
//!
//! Newtypes keep card names, player names, and subtypes from being mixed up
//! with one another or with free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

name_type!(
    /// Card subtype: "Goblin", "Aura", "Equipment", "Mountain"
    Subtype
);
name_type!(CardName);
name_type!(PlayerName);

/// Kinds of counters that can sit on a permanent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CounterType {
    PlusOne,
    MinusOne,
    Loyalty,
    Charge,
    Named(String),
}

impl fmt::Display for CounterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterType::PlusOne => write!(f, "+1/+1"),
            CounterType::MinusOne => write!(f, "-1/-1"),
            CounterType::Loyalty => write!(f, "loyalty"),
            CounterType::Charge => write!(f, "charge"),
            CounterType::Named(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_display() {
        assert_eq!(CounterType::PlusOne.to_string(), "+1/+1");
        assert_eq!(CounterType::MinusOne.to_string(), "-1/-1");
        assert_eq!(CounterType::Named("age".into()).to_string(), "age");
    }

    #[test]
    fn test_names() {
        assert_eq!(CardName::new("Lightning Bolt").as_str(), "Lightning Bolt");
        assert_eq!(PlayerName::from("Alice").to_string(), "Alice");
        assert_eq!(Subtype::from("Aura").as_str(), "Aura");
    }
}
