use serde::{Deserialize, Serialize};

/// Which leg of the pair is held long while a spread position is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadDirection {
    /// Long the first ticker, short the second. Entered when the spread z-score is deeply negative.
    LongFirstShortSecond,
    /// Short the first ticker, long the second. Entered when the spread z-score is deeply positive.
    ShortFirstLongSecond,
}

impl SpreadDirection {
    /// Short label used in exports and table output.
    pub fn label(&self) -> &'static str {
        match self {
            SpreadDirection::LongFirstShortSecond => "long1/short2",
            SpreadDirection::ShortFirstLongSecond => "short1/long2",
        }
    }
}

/// The two states of the pairs strategy's state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    LongShort(SpreadDirection),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionState::Flat => "flat",
            PositionState::LongShort(direction) => direction.label(),
        }
    }
}
