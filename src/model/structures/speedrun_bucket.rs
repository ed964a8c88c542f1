use strum_macros::{Display, EnumIter};

/// The four independent speedrun point pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum SpeedrunBucket {
    SoloOfficial,
    CoopOfficial,
    SoloCommunity,
    CoopCommunity
}

impl SpeedrunBucket {
    pub fn classify(official: bool, coop: bool) -> SpeedrunBucket {
        match (official, coop) {
            (true, false) => SpeedrunBucket::SoloOfficial,
            (true, true) => SpeedrunBucket::CoopOfficial,
            (false, false) => SpeedrunBucket::SoloCommunity,
            (false, true) => SpeedrunBucket::CoopCommunity
        }
    }
}
