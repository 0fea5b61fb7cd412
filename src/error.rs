//! Error kinds for the codec. Encode errors are returned synchronously;
//! decode errors are per-candidate and never abort a whole decode pass.

use alloc::string::String;
use snafu::Snafu;

#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("invalid input: {message}"))]
    InvalidInput { message: String },

    #[snafu(display("invalid callsign: {callsign}"))]
    InvalidCallsign { callsign: String },

    #[snafu(display("invalid locator: {locator}"))]
    InvalidLocator { locator: String },

    #[snafu(display("invalid character in message text"))]
    InvalidCharacter,

    #[snafu(display("message text too long ({len} characters)"))]
    MessageTooLong { len: usize },

    #[snafu(display("CRC mismatch"))]
    CrcMismatch,

    #[snafu(display("LDPC decode failed to converge after {iterations} iterations"))]
    LdpcFailure { iterations: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
