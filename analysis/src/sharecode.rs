//! Match sharing codes, e.g. `CSGO-U6MWi-hYFWJ-opPwD-JciHm-qOijD`.
//!
//! A code is a base-57 number over [`DICTIONARY`], least significant digit
//! first, holding 18 big-endian bytes: match id (8, LE), outcome id (8, LE)
//! and token id (2, LE).

use common::SharingCode;

pub const DICTIONARY: &[u8; 57] = b"ABCDEFGHJKLMNOPQRSTUVWXYZabcdefhijkmnopqrstuvwxyz23456789";

const PREFIX: &str = "CSGO-";
const DIGITS: usize = 25;
const BYTES: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SharecodeError {
    #[error("Expected 25 characters but got {0}")]
    Length(usize),
    #[error("Invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("Value does not fit into a sharing code")]
    Overflow,
}

pub fn decode(code: &str) -> Result<SharingCode, SharecodeError> {
    let trimmed = code.trim();
    let stripped = trimmed.strip_prefix(PREFIX).unwrap_or(trimmed);
    let digits: Vec<char> = stripped.chars().filter(|c| *c != '-').collect();

    if digits.len() != DIGITS {
        return Err(SharecodeError::Length(digits.len()));
    }

    let mut bytes = [0u8; BYTES];
    for c in digits.into_iter().rev() {
        let digit = DICTIONARY
            .iter()
            .position(|d| char::from(*d) == c)
            .ok_or(SharecodeError::InvalidCharacter(c))? as u32;

        // bytes = bytes * 57 + digit
        let mut carry = digit;
        for byte in bytes.iter_mut().rev() {
            let value = (*byte as u32) * DICTIONARY.len() as u32 + carry;
            *byte = (value & 0xff) as u8;
            carry = value >> 8;
        }

        if carry != 0 {
            return Err(SharecodeError::Overflow);
        }
    }

    let mut match_id = [0u8; 8];
    match_id.copy_from_slice(&bytes[0..8]);
    let mut outcome_id = [0u8; 8];
    outcome_id.copy_from_slice(&bytes[8..16]);
    let token_id = [bytes[16], bytes[17]];

    Ok(SharingCode {
        match_id: u64::from_le_bytes(match_id),
        outcome_id: u64::from_le_bytes(outcome_id),
        token_id: u16::from_le_bytes(token_id),
    })
}

pub fn encode(code: &SharingCode) -> String {
    let mut bytes = [0u8; BYTES];
    bytes[0..8].copy_from_slice(&code.match_id.to_le_bytes());
    bytes[8..16].copy_from_slice(&code.outcome_id.to_le_bytes());
    bytes[16..18].copy_from_slice(&code.token_id.to_le_bytes());

    let mut digits = String::with_capacity(DIGITS);
    for _ in 0..DIGITS {
        // bytes, remainder = divmod(bytes, 57)
        let mut remainder = 0u32;
        for byte in bytes.iter_mut() {
            let value = (remainder << 8) | *byte as u32;
            *byte = (value / DICTIONARY.len() as u32) as u8;
            remainder = value % DICTIONARY.len() as u32;
        }
        digits.push(char::from(DICTIONARY[remainder as usize]));
    }

    let groups: Vec<&str> = (0..DIGITS)
        .step_by(5)
        .map(|start| &digits[start..start + 5])
        .collect();

    format!("{}{}", PREFIX, groups.join("-"))
}
