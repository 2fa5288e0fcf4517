//! Cell identity types.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value reported by the radio layer when a field is unavailable.
///
/// The radio layer reports `i32::MAX` for any identifier it cannot read, so
/// an observation carrying it does not name a real cell.
pub const UNAVAILABLE: i64 = i32::MAX as i64;

/// Largest valid mobile country code (three decimal digits).
pub const MAX_MCC: u16 = 999;

/// Largest valid mobile network code (up to three decimal digits).
pub const MAX_MNC: u16 = 999;

/// Errors raised while validating a raw observation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CellError {
    /// The radio layer reported the field as unavailable.
    #[error("{field} is unavailable")]
    Unavailable { field: &'static str },

    /// The field is outside its valid range.
    #[error("invalid {field}: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Raw, unvalidated observation as delivered by an observation provider.
///
/// Field names follow the wire format of the radio bridge (`cellId`,
/// `signalStrength`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellObservation {
    pub cell_id: i64,
    pub lac: i64,
    pub mcc: i64,
    pub mnc: i64,
    #[serde(default)]
    pub signal_strength: i32,
}

impl CellObservation {
    /// Creates a raw observation.
    pub fn new(cell_id: i64, lac: i64, mcc: i64, mnc: i64, signal_strength: i32) -> Self {
        Self {
            cell_id,
            lac,
            mcc,
            mnc,
            signal_strength,
        }
    }
}

/// The four-field lookup key naming one cell sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub cell_id: u32,
    pub lac: u32,
    pub mcc: u16,
    pub mnc: u16,
}

impl CellKey {
    /// Creates a key from already-validated parts.
    pub fn new(cell_id: u32, lac: u32, mcc: u16, mnc: u16) -> Self {
        Self {
            cell_id,
            lac,
            mcc,
            mnc,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03}-{}/{}/{}",
            self.mcc, self.mnc, self.lac, self.cell_id
        )
    }
}

/// A validated observation of the serving cell.
///
/// Equality and hashing consider only the [`CellKey`]; the signal strength is
/// informational.
#[derive(Debug, Clone, Copy)]
pub struct CellIdentity {
    key: CellKey,
    signal_strength: i32,
}

impl CellIdentity {
    /// Creates an identity from a key and a signal reading (dBm).
    pub fn new(key: CellKey, signal_strength: i32) -> Self {
        Self {
            key,
            signal_strength,
        }
    }

    /// The lookup key.
    pub fn key(&self) -> CellKey {
        self.key
    }

    pub fn cell_id(&self) -> u32 {
        self.key.cell_id
    }

    pub fn lac(&self) -> u32 {
        self.key.lac
    }

    pub fn mcc(&self) -> u16 {
        self.key.mcc
    }

    pub fn mnc(&self) -> u16 {
        self.key.mnc
    }

    /// Signal strength in dBm at observation time.
    pub fn signal_strength(&self) -> i32 {
        self.signal_strength
    }
}

impl PartialEq for CellIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CellIdentity {}

impl Hash for CellIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CellIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} dBm)", self.key, self.signal_strength)
    }
}

impl TryFrom<CellObservation> for CellIdentity {
    type Error = CellError;

    fn try_from(raw: CellObservation) -> Result<Self, Self::Error> {
        let cell_id = identifier("cellId", raw.cell_id, u32::MAX as i64)?;
        let lac = identifier("lac", raw.lac, u32::MAX as i64)?;
        let mcc = identifier("mcc", raw.mcc, MAX_MCC as i64)?;
        let mnc = identifier("mnc", raw.mnc, MAX_MNC as i64)?;

        Ok(Self {
            key: CellKey {
                cell_id: cell_id as u32,
                lac: lac as u32,
                mcc: mcc as u16,
                mnc: mnc as u16,
            },
            signal_strength: raw.signal_strength,
        })
    }
}

/// Checks one identifier field against the sentinel and its range.
fn identifier(field: &'static str, value: i64, max: i64) -> Result<i64, CellError> {
    if value == UNAVAILABLE {
        return Err(CellError::Unavailable { field });
    }
    if !(0..=max).contains(&value) {
        return Err(CellError::OutOfRange { field, value });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reference() -> CellObservation {
        CellObservation::new(100, 200, 310, 410, -70)
    }

    #[test]
    fn test_valid_observation_converts() {
        let identity = CellIdentity::try_from(reference()).unwrap();
        assert_eq!(identity.key(), CellKey::new(100, 200, 310, 410));
        assert_eq!(identity.signal_strength(), -70);
    }

    #[test]
    fn test_signal_strength_ignored_by_equality() {
        let a = CellIdentity::new(CellKey::new(1, 2, 310, 260), -60);
        let b = CellIdentity::new(CellKey::new(1, 2, 310, 260), -110);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_negative_cell_id_rejected() {
        let mut raw = reference();
        raw.cell_id = -1;
        assert_eq!(
            CellIdentity::try_from(raw),
            Err(CellError::OutOfRange {
                field: "cellId",
                value: -1
            })
        );
    }

    #[test]
    fn test_unavailable_sentinel_rejected() {
        let mut raw = reference();
        raw.lac = UNAVAILABLE;
        assert_eq!(
            CellIdentity::try_from(raw),
            Err(CellError::Unavailable { field: "lac" })
        );
    }

    #[test]
    fn test_four_digit_mcc_rejected() {
        let mut raw = reference();
        raw.mcc = 1000;
        assert!(matches!(
            CellIdentity::try_from(raw),
            Err(CellError::OutOfRange { field: "mcc", .. })
        ));
    }

    #[test]
    fn test_single_digit_mnc_accepted() {
        let mut raw = reference();
        raw.mnc = 1;
        assert_eq!(CellIdentity::try_from(raw).unwrap().mnc(), 1);
    }

    #[test]
    fn test_observation_deserializes_camel_case() {
        let json = r#"{"cellId":100,"lac":200,"mcc":310,"mnc":410,"signalStrength":-70}"#;
        let raw: CellObservation = serde_json::from_str(json).unwrap();
        assert_eq!(raw, reference());
    }

    #[test]
    fn test_key_display_pads_mcc() {
        assert_eq!(CellKey::new(7, 8, 1, 2).to_string(), "001-2/8/7");
    }
}
