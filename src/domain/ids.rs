//! Identifiers for assets, accounts, pools and stake positions.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Block height reported by the [`Clock`](crate::traits::Clock).
pub type BlockNumber = u64;

/// Wall-clock time in milliseconds reported by the [`Clock`](crate::traits::Clock).
pub type Moment = u64;

/// Identifier of a fungible asset, including LP tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssetId(u128);

impl AssetId {
    /// Creates an asset id from its raw value.
    #[must_use]
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns the next id in sequence, or `None` on overflow.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// A 32-byte account identifier.
///
/// Serialized as a 64-character hex string.  Escrow accounts owned by the
/// ledger itself are derived with [`AccountId::derive`].
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::AccountId;
///
/// let pool = AccountId::derive(*b"ammp", 7);
/// assert_ne!(pool, AccountId::derive(*b"ammp", 8));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Wraps raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derives a ledger-owned sub-account from a four byte tag and an index.
    #[must_use]
    pub fn derive(tag: [u8; 4], index: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&tag);
        bytes[4..12].copy_from_slice(&index.to_be_bytes());
        bytes[31] = 0xff;
        Self(bytes)
    }

    fn to_hex(self) -> String {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            out.push(char::from(DIGITS[usize::from(byte >> 4)]));
            out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
        }
        out
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl TryFrom<String> for AccountId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let raw = value.strip_prefix("0x").unwrap_or(value.as_str()).as_bytes();
        if raw.len() != 64 {
            return Err(LedgerError::ConfigFormat(format!(
                "account id must be 64 hex characters, got {}",
                raw.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (slot, pair) in bytes.iter_mut().zip(raw.chunks_exact(2)) {
            let (Some(hi), Some(lo)) = (hex_nibble(pair[0]), hex_nibble(pair[1])) else {
                return Err(LedgerError::ConfigFormat(format!(
                    "account id is not hex: {value}"
                )));
            };
            *slot = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "AccountId(0x{}..{})", &hex[..8], &hex[56..])
    }
}

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// First id handed out by a fresh ledger.
            pub const FIRST: Self = Self(1);

            /// Creates an id from its raw value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn get(&self) -> u64 {
                self.0
            }

            /// Returns the next id in sequence, or `None` on overflow.
            #[must_use]
            pub const fn next(&self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(v) => Some(Self(v)),
                    None => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

sequence_id!(
    /// Identifier of an AMM pool or a staking reward pool.
    PoolId,
    "pool"
);

sequence_id!(
    /// Identifier of a stake position.
    PositionId,
    "position"
);
