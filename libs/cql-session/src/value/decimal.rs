use std::fmt;
use std::str::FromStr;

// Beyond this many implied zeros, Display switches to exponent form
const MAX_PLAIN_SCALE: u32 = 100;

/// Arbitrary-precision decimal as CQL stores it: an unscaled integer and a
/// scale, value = unscaled × 10^-scale.
///
/// The unscaled part is kept as big-endian two's-complement bytes, so values
/// wider than any native integer survive a round trip untouched. Bytes are
/// normalised to their shortest form; `(125, 2)` and `(1250, 3)` are different
/// decimals and compare unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: Vec<u8>,
    scale: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal literal '{0}'")]
pub struct ParseDecimalError(String);

impl Decimal {
    pub fn new(unscaled: i128, scale: i32) -> Self {
        Self::from_signed_be_bytes(unscaled.to_be_bytes().to_vec(), scale)
    }

    /// Build from big-endian two's-complement bytes, as found on the wire
    pub fn from_signed_be_bytes(bytes: Vec<u8>, scale: i32) -> Self {
        Self {
            unscaled: shortest_twos_complement(bytes),
            scale,
        }
    }

    pub fn unscaled_be_bytes(&self) -> &[u8] {
        &self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Unscaled part, when it fits in an i128
    pub fn unscaled_i128(&self) -> Option<i128> {
        if self.unscaled.len() > 16 {
            return None;
        }
        let seed: i128 = if self.is_negative() { -1 } else { 0 };
        Some(
            self.unscaled
                .iter()
                .fold(seed, |acc, &b| (acc << 8) | i128::from(b)),
        )
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.first().is_some_and(|b| b & 0x80 != 0)
    }

    /// Absolute value of the unscaled part in base 10
    fn magnitude_digits(&self) -> String {
        let mut magnitude = self.unscaled.clone();
        if self.is_negative() {
            negate(&mut magnitude);
        }

        let mut digits = Vec::new();
        while magnitude.iter().any(|&b| b != 0) {
            let mut rem: u32 = 0;
            for b in magnitude.iter_mut() {
                let cur = (rem << 8) | u32::from(*b);
                *b = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(char::from(b'0' + rem as u8));
        }
        if digits.is_empty() {
            digits.push('0');
        }
        digits.iter().rev().collect()
    }
}

/// Two's-complement negation in place
fn negate(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b = !*b;
    }
    for b in bytes.iter_mut().rev() {
        let (sum, carry) = b.overflowing_add(1);
        *b = sum;
        if !carry {
            break;
        }
    }
}

/// Signed big-endian bytes for a run of ASCII decimal digits
fn digits_to_signed_bytes(digits: &str, negative: bool) -> Vec<u8> {
    let mut bytes = vec![0u8];
    for d in digits.bytes() {
        let mut carry = u32::from(d - b'0');
        for b in bytes.iter_mut().rev() {
            let cur = u32::from(*b) * 10 + carry;
            *b = cur as u8;
            carry = cur >> 8;
        }
        while carry > 0 {
            bytes.insert(0, carry as u8);
            carry >>= 8;
        }
    }
    // Sign byte, so the magnitude never reads as negative
    bytes.insert(0, 0);
    if negative {
        negate(&mut bytes);
    }
    bytes
}

fn shortest_twos_complement(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.is_empty() {
        return vec![0];
    }
    let redundant = bytes
        .windows(2)
        .take_while(|w| (w[0] == 0x00 && w[1] & 0x80 == 0) || (w[0] == 0xFF && w[1] & 0x80 != 0))
        .count();
    bytes.drain(..redundant);
    bytes
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.magnitude_digits();
        let sign = if self.is_negative() { "-" } else { "" };

        if self.scale.unsigned_abs() > MAX_PLAIN_SCALE {
            // Same shape as Java's BigDecimal: d.dddE+n
            let exponent = (digits.len() as i64 - 1) - i64::from(self.scale);
            let (head, tail) = digits.split_at(1);
            let point = if tail.is_empty() { "" } else { "." };
            let exponent_sign = if exponent >= 0 { "+" } else { "" };
            return write!(f, "{sign}{head}{point}{tail}E{exponent_sign}{exponent}");
        }

        if self.scale <= 0 {
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            let zeros = if digits == "0" { "" } else { zeros.as_str() };
            return write!(f, "{sign}{digits}{zeros}");
        }

        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parses plain decimal literals such as `1.25`, `-0.5` or `42`.
    /// The scale is the number of fractional digits written.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDecimalError(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let scale = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
        Ok(Decimal::from_signed_be_bytes(
            digits_to_signed_bytes(&digits, negative),
            scale,
        ))
    }
}
