use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

/// Mini-games offered by the arcade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GameMode {
    Mines = 0,
    Towers = 1,
    Hilo = 2,
    Keno = 3,
    Plinko = 4,
}

impl GameMode {
    pub const COUNT: usize = 5;

    pub const ALL: [GameMode; Self::COUNT] = [
        GameMode::Mines,
        GameMode::Towers,
        GameMode::Hilo,
        GameMode::Keno,
        GameMode::Plinko,
    ];

    /// Position of the mode in per-mode arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GameMode::Mines => "mines",
            GameMode::Towers => "towers",
            GameMode::Hilo => "hilo",
            GameMode::Keno => "keno",
            GameMode::Plinko => "plinko",
        }
    }
}

impl Write for GameMode {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameMode {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::Mines),
            1 => Ok(Self::Towers),
            2 => Ok(Self::Hilo),
            3 => Ok(Self::Keno),
            4 => Ok(Self::Plinko),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for GameMode {
    const SIZE: usize = 1;
}

/// How a resolved round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// Lifecycle of a single round.
///
/// `Resolved` is the settling window: the round has been paid out but no move
/// is accepted until the engine is returned to `Betting`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Betting,
    Active,
    Resolved(Outcome),
}

impl Phase {
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Active)
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, Phase::Resolved(_))
    }
}

/// Towers risk tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Tiles per row.
    pub fn columns(self) -> u8 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Bombs hidden in every row.
    pub fn bombs(self) -> u8 {
        match self {
            Difficulty::Easy | Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

/// Plinko payout table selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Hilo guess direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guess {
    Higher,
    Lower,
}
