//! Lead identifiers.
//!
//! The name table is a process-wide constant; parsing and display both go through it.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recorded or derived ECG lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lead {
    /// Limb lead I.
    I,
    /// Limb lead II.
    II,
    /// Limb lead III.
    III,
    /// Augmented lead aVR.
    #[serde(rename = "aVR")]
    AvR,
    /// Augmented lead aVL.
    #[serde(rename = "aVL")]
    AvL,
    /// Augmented lead aVF.
    #[serde(rename = "aVF")]
    AvF,
    /// Precordial lead V1.
    V1,
    /// Precordial lead V2.
    V2,
    /// Precordial lead V3.
    V3,
    /// Precordial lead V4.
    V4,
    /// Precordial lead V5.
    V5,
    /// Precordial lead V6.
    V6,
    /// Vector magnitude of the X/Y/Z leads.
    #[serde(rename = "VCGMAG")]
    VcgMag,
    /// Frank lead X.
    X,
    /// Frank lead Y.
    Y,
    /// Frank lead Z.
    Z,
}

const LEAD_NAMES: [(Lead, &str); 16] = [
    (Lead::I, "I"),
    (Lead::II, "II"),
    (Lead::III, "III"),
    (Lead::AvR, "aVR"),
    (Lead::AvL, "aVL"),
    (Lead::AvF, "aVF"),
    (Lead::V1, "V1"),
    (Lead::V2, "V2"),
    (Lead::V3, "V3"),
    (Lead::V4, "V4"),
    (Lead::V5, "V5"),
    (Lead::V6, "V6"),
    (Lead::VcgMag, "VCGMAG"),
    (Lead::X, "X"),
    (Lead::Y, "Y"),
    (Lead::Z, "Z"),
];

impl Lead {
    /// Every lead, in table order.
    pub const ALL: [Lead; 16] = [
        Lead::I,
        Lead::II,
        Lead::III,
        Lead::AvR,
        Lead::AvL,
        Lead::AvF,
        Lead::V1,
        Lead::V2,
        Lead::V3,
        Lead::V4,
        Lead::V5,
        Lead::V6,
        Lead::VcgMag,
        Lead::X,
        Lead::Y,
        Lead::Z,
    ];

    /// Conventional display name (`"aVR"`, `"VCGMAG"`, ...).
    pub fn name(self) -> &'static str {
        LEAD_NAMES
            .iter()
            .find(|(lead, _)| *lead == self)
            .map_or("?", |(_, name)| name)
    }

    /// Looks a lead up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        LEAD_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(lead, _)| *lead)
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lead {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownLead(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for lead in Lead::ALL {
            assert_eq!(Lead::from_name(lead.name()), Some(lead));
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("vcgmag".parse::<Lead>().unwrap(), Lead::VcgMag);
        assert_eq!("AVF".parse::<Lead>().unwrap(), Lead::AvF);
    }

    #[test]
    fn unknown_name_is_error() {
        let err = "V7".parse::<Lead>().unwrap_err();
        assert!(err.to_string().contains("V7"));
    }
}
