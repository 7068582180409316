//! Position operator tables.
//!
//! Each dialect spells its position operators differently. A [`FrameTable`]
//! maps the spelling to the ordered frame list of the canonical position group.

use crate::vocab::Frame;

use Frame::*;

#[derive(Debug, Clone, Copy)]
pub struct FrameTable {
    entries: &'static [(&'static str, &'static [Frame])],
}

pub const POLIQARP_FRAMES: FrameTable = FrameTable {
    entries: &[
        ("contains", &[IsAround]),
        ("matches", &[Matches]),
        ("startswith", &[StartsWith, Matches]),
        ("endswith", &[EndsWith, Matches]),
        ("overlaps", &[OverlapsLeft, OverlapsRight]),
    ],
};

pub const ANNIS_FRAMES: FrameTable = FrameTable {
    entries: &[
        ("_=_", &[Matches]),
        ("_l_", &[StartsWith, Matches]),
        ("_r_", &[EndsWith, Matches]),
        ("_i_", &[IsAround]),
        ("_o_", &[OverlapsLeft, OverlapsRight]),
        ("_ol_", &[OverlapsLeft]),
        ("_or_", &[OverlapsRight]),
    ],
};

/// COSMAS II `#IN(pos)`. The empty key is the operator without a position.
pub const COSMAS_IN_FRAMES: FrameTable = FrameTable {
    entries: &[
        ("", &[IsAround]),
        ("L", &[StartsWith]),
        ("R", &[EndsWith]),
        ("F", &[Matches]),
        ("FE", &[Matches]),
        ("FI", &[Matches]),
        ("N", &[IsAround]),
    ],
};

/// COSMAS II `#OV(pos)`. The empty key is the operator without a position.
pub const COSMAS_OV_FRAMES: FrameTable = FrameTable {
    entries: &[
        ("", &[OverlapsLeft, OverlapsRight]),
        ("L", &[StartsWith, OverlapsLeft]),
        ("R", &[EndsWith, OverlapsRight]),
        ("F", &[Matches]),
        ("FE", &[Matches]),
        ("FI", &[Matches]),
        ("X", &[IsAround]),
    ],
};

impl FrameTable {
    pub fn lookup(&self, operator: &str) -> Option<&'static [Frame]> {
        self.entries
            .iter()
            .find(|(name, _)| *name == operator)
            .map(|(_, frames)| *frames)
    }

    pub fn operators(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// COSMAS II positions that also demand identical (`FE`) or distinct (`FI`)
/// operands. The identity part has no canonical frame.
pub fn is_identity_position(position: &str) -> bool {
    matches!(position, "FE" | "FI")
}
