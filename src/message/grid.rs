//! Maidenhead grid locator and signal report encoding, packed into the
//! 15-bit `igrid4` field shared by standard messages.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::Error;
use crate::message::constants::MAXGRID4;

const BLANK_CODE: u16 = 1;
const RRR_CODE: u16 = 2;
const RR73_CODE: u16 = 3;
const CODE_73: u16 = 4;

/// Encode a 4-character grid square, a signal report (`+NN`/`-NN`/`RNN`),
/// or a special code (`RRR`, `RR73`, `73`, blank) into 15 bits.
pub fn encode_grid(grid_or_report: &str) -> Result<u16, Error> {
    let trimmed = grid_or_report.trim();

    if trimmed.is_empty() {
        return Ok(MAXGRID4 + BLANK_CODE);
    }

    if trimmed.starts_with('+') || trimmed.starts_with('-') {
        return encode_signal_report(trimmed);
    }

    // RR73 is a disjoint acknowledgement token, not the grid square it
    // happens to shadow (R1=17, R2=17 is out of range anyway, but the
    // digits alone would otherwise pass the grid-shape check below).
    // Must be matched before the length-4 grid check, not after.
    match trimmed {
        "RRR" => return Ok(MAXGRID4 + RRR_CODE),
        "RR73" => return Ok(MAXGRID4 + RR73_CODE),
        "73" => return Ok(MAXGRID4 + CODE_73),
        _ => {}
    }

    if trimmed.len() == 4 {
        let chars: Vec<char> = trimmed.chars().collect();
        if chars[0].is_ascii_alphabetic() && chars[1].is_ascii_alphabetic() && chars[2].is_ascii_digit() && chars[3].is_ascii_digit() {
            return encode_grid_square(trimmed);
        }
    }

    Err(Error::InvalidLocator { locator: trimmed.into() })
}

fn encode_grid_square(grid: &str) -> Result<u16, Error> {
    let upper = grid.to_uppercase();
    let chars: Vec<char> = upper.chars().collect();

    let c1 = (chars[0] as u32 - 'A' as u32) as u16;
    let c2 = (chars[1] as u32 - 'A' as u32) as u16;
    let c3 = chars[2].to_digit(10).ok_or_else(|| Error::InvalidLocator { locator: grid.into() })? as u16;
    let c4 = chars[3].to_digit(10).ok_or_else(|| Error::InvalidLocator { locator: grid.into() })? as u16;

    if c1 > 17 || c2 > 17 {
        return Err(Error::InvalidLocator { locator: grid.into() });
    }

    Ok(c1 * 1800 + c2 * 100 + c3 * 10 + c4)
}

fn encode_signal_report(report: &str) -> Result<u16, Error> {
    let report_str = report.strip_prefix('R').unwrap_or(report);

    let irpt: i16 = report_str.parse().map_err(|_| Error::InvalidLocator { locator: report.into() })?;
    if !(-50..=49).contains(&irpt) {
        return Err(Error::InvalidLocator { locator: report.into() });
    }

    let mut encoded = irpt;
    if (-50..=-31).contains(&encoded) {
        encoded += 101;
    }
    encoded += 35;

    Ok(MAXGRID4 + encoded as u16)
}

/// Inverse of [`encode_grid`].
pub fn decode_grid(igrid4: u16) -> Result<String, Error> {
    if igrid4 <= MAXGRID4 {
        return decode_grid_square(igrid4);
    }

    let irpt = igrid4 - MAXGRID4;
    match irpt {
        BLANK_CODE => Ok(String::new()),
        RRR_CODE => Ok("RRR".to_string()),
        RR73_CODE => Ok("RR73".to_string()),
        CODE_73 => Ok("73".to_string()),
        _ => decode_signal_report(irpt),
    }
}

fn decode_grid_square(igrid4: u16) -> Result<String, Error> {
    let mut value = igrid4;
    let c4 = (value % 10) as u8;
    value /= 10;
    let c3 = (value % 10) as u8;
    value /= 10;
    let c2 = (value % 18) as u8;
    value /= 18;
    let c1 = value as u8;

    if c1 > 17 || c2 > 17 {
        return Err(Error::InvalidLocator { locator: format!("igrid4={igrid4}") });
    }

    Ok(format!("{}{}{}{}", (b'A' + c1) as char, (b'A' + c2) as char, (b'0' + c3) as char, (b'0' + c4) as char))
}

fn decode_signal_report(irpt: u16) -> Result<String, Error> {
    let mut report = irpt as i16 - 35;
    if (51..=70).contains(&report) {
        report -= 101;
    }
    if !(-50..=49).contains(&report) {
        return Err(Error::InvalidLocator { locator: format!("irpt={irpt}") });
    }

    if report >= 0 {
        Ok(format!("+{report:02}"))
    } else {
        Ok(format!("-{:02}", -report))
    }
}
