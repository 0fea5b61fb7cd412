//! FT8/FT4 message, channel, and waveform codec.
//!
//! - [`message`] — human-readable text ⇄ 77-bit payload.
//! - [`crc`] — CRC-14 append/check over the payload.
//! - [`ldpc`] — (174,91) LDPC encode and belief-propagation decode.
//! - [`symbol`] — codeword ⇄ tone sequence (Costas sync + Gray-coded data).
//! - [`pulse`] — tone sequence ⇒ GFSK baseband waveform.
//! - [`sync`] — spectrogram construction and Costas-sync candidate search.
//! - [`decoder`] — end-to-end candidate decode pipeline.

extern crate alloc;

pub mod constants;
pub mod crc;
pub mod decoder;
pub mod error;
pub mod ldpc;
pub mod message;
pub mod pulse;
pub mod symbol;
pub mod sync;
pub mod tracing_init;

pub use constants::Mode;
pub use decoder::{decode_ft4, decode_ft8, DecodedMessage, DecoderConfig};
pub use error::Error;
pub use message::{message_encode, message_pack, message_unpack, parse_message, CallsignHashCache, Message};
