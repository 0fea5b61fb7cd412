//! Character alphabets and sizing constants for the 77-bit message codec.

pub use crate::constants::{MAX22, MAXGRID4, NTOKENS};

/// Callsign position 0: space + digits + letters (37 chars).
pub const CHARSET_A1: &str = " 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Callsign position 1: digits + letters, no space (36 chars).
pub const CHARSET_A2: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Callsign position 2: digits only (10 chars).
pub const CHARSET_A3: &str = "0123456789";
/// Callsign positions 3-5: space + letters (27 chars).
pub const CHARSET_A4: &str = " ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Base-38 alphabet used for callsign hashing: space + digits + letters + '/'.
pub const CHARSET_BASE38: &[u8] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ/";
/// Base-42 alphabet used for free text and telemetry.
pub const CHARSET_BASE42: &[u8] = b" 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ+-./?";
