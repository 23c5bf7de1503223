//! Command definitions
//!
//! Operations a client can ask the cache to perform.

use std::fmt;

use crate::error::{CacheError, CodeKind, Result};

/// Request commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Clear = 0x00,
    Put = 0x01,
    Get = 0x02,
    Remove = 0x03,
}

impl Command {
    /// All commands, in lookup order
    pub const ALL: [Command; 4] = [
        Command::Clear,
        Command::Put,
        Command::Get,
        Command::Remove,
    ];

    /// Wire byte for this command
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Look up the command with the given wire byte
    pub fn from_byte(byte: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|command| command.to_byte() == byte)
            .ok_or(CacheError::UnsupportedCode {
                kind: CodeKind::Command,
                byte,
            })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Command::Clear => "CLEAR",
            Command::Put => "PUT",
            Command::Get => "GET",
            Command::Remove => "REMOVE",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = CacheError;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_byte(byte)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
