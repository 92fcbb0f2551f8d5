use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

id_type!(ContactId);
id_type!(UserId);

#[cfg(test)]
mod tests {
    use super::ContactId;

    #[test]
    fn parse_trims_whitespace() {
        let id: ContactId = " 42 ".parse().expect("parse id");
        assert_eq!(id, ContactId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!("abc".parse::<ContactId>().is_err());
    }
}
