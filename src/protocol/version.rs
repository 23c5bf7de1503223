//! Protocol version definitions
//!
//! A version fits in one byte: the 3 bits above the low nibble hold the
//! MAJOR part and the low 4 bits hold the MINOR part, so the largest
//! representable version is 7.15 (`0b0111_1111`).

use std::fmt;

use crate::error::{CacheError, CodeKind, Result};

/// Supported protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V0_0,
    V1_0,
}

impl Version {
    /// All known versions, in lookup order
    pub const ALL: [Version; 2] = [Version::V0_0, Version::V1_0];

    /// The only version this build reads and writes
    pub const CURRENT: Version = Version::V1_0;

    /// MAJOR part (3 bits)
    pub const fn major(self) -> u8 {
        let major = match self {
            Version::V0_0 => 0,
            Version::V1_0 => 1,
        };
        major & 0x7
    }

    /// MINOR part (4 bits)
    pub const fn minor(self) -> u8 {
        let minor = match self {
            Version::V0_0 => 0,
            Version::V1_0 => 0,
        };
        minor & 0xF
    }

    /// Wire byte for this version
    pub const fn to_byte(self) -> u8 {
        self.minor() + (self.major() << 4)
    }

    /// Look up the version with the given wire byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|version| version.to_byte() == byte)
            .ok_or(CacheError::UnsupportedCode {
                kind: CodeKind::Version,
                byte,
            })
    }
}

impl TryFrom<u8> for Version {
    type Error = CacheError;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_byte(byte)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}
