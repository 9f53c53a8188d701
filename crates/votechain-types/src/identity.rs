use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty or whitespace-only input.
            pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(TypeError::EmptyIdentifier($label));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of the voter who submitted an entry.
    ActorId,
    "actor id"
);

string_id!(
    /// The election or category an entry belongs to.
    SubjectId,
    "subject id"
);

string_id!(
    /// The value recorded by an entry, e.g. a candidate.
    ChoiceId,
    "choice id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(
            ActorId::new("").unwrap_err(),
            TypeError::EmptyIdentifier("actor id")
        );
        assert_eq!(
            SubjectId::new("  \t").unwrap_err(),
            TypeError::EmptyIdentifier("subject id")
        );
    }

    #[test]
    fn keeps_value_verbatim() {
        let choice = ChoiceId::new(" c1 ").unwrap();
        assert_eq!(choice.as_str(), " c1 ");
        assert_eq!(choice.to_string(), " c1 ");
    }

    #[test]
    fn deserialize_validates() {
        let ok: SubjectId = serde_json::from_str("\"e1\"").unwrap();
        assert_eq!(ok.as_str(), "e1");
        assert!(serde_json::from_str::<SubjectId>("\"\"").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let actor: ActorId = "u1".parse().unwrap();
        assert_eq!(serde_json::to_string(&actor).unwrap(), "\"u1\"");
        assert_eq!(format!("{actor:?}"), "ActorId(u1)");
    }
}
