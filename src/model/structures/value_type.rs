use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use strum_macros::{Display, EnumIter};

/// How a score's `value` is interpreted. Encoded as an integer in the score feed.
#[derive(Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, Display)]
#[repr(u8)]
pub enum ValueType {
    /// Higher score is better
    #[default]
    Standard = 0,
    /// Negated completion time, so a higher value is still better
    Speedrun = 1
}

impl TryFrom<i32> for ValueType {
    type Error = ();

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ValueType::Standard),
            1 => Ok(ValueType::Speedrun),
            _ => Err(())
        }
    }
}
