//! MANA amounts: display-unit strings and smallest-unit (wei) integers.
//!
//! Prices travel as wei (`u128`, 18 decimals) and are shown to the user as
//! grouped decimals with at most three fractional digits, e.g. `1,234.5`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Currency glyph shown next to amounts
pub const MANA_SYMBOL: &str = "⏣";

/// Decimals between MANA and wei
pub const MANA_DECIMALS: u32 = 18;

/// Wei in one MANA
pub const WEI_PER_MANA: u128 = 10u128.pow(MANA_DECIMALS);

/// Fractional digits kept when formatting for display
pub const DISPLAY_DECIMALS: u32 = 3;

/// An exact MANA amount stored in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Mana(u128);

impl Mana {
    pub const ZERO: Mana = Mana(0);

    pub fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    pub fn wei(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whole MANA part
    pub fn whole(self) -> u128 {
        self.0 / WEI_PER_MANA
    }

    /// Fractional part in wei
    pub fn fraction(self) -> u128 {
        self.0 % WEI_PER_MANA
    }
}

impl fmt::Display for Mana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_mana(*self))
    }
}

/// Parse a human-entered amount.
///
/// Thousands separators and whitespace are ignored. Anything that is not a
/// non-negative decimal with at most 18 fractional digits parses as zero,
/// which every caller treats as "no price".
pub fn from_mana(input: &str) -> Mana {
    parse_exact(input).unwrap_or(Mana::ZERO)
}

/// Whether the input is a well-formed amount that fits in wei
pub fn is_amount(input: &str) -> bool {
    parse_exact(input).is_some()
}

fn parse_exact(input: &str) -> Option<Mana> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match cleaned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (cleaned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
        || frac_part.len() > MANA_DECIMALS as usize
    {
        return None;
    }

    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let mut fraction: u128 = 0;
    if !frac_part.is_empty() {
        let scale = 10u128.pow(MANA_DECIMALS - frac_part.len() as u32);
        fraction = frac_part.parse::<u128>().ok()? * scale;
    }

    whole
        .checked_mul(WEI_PER_MANA)
        .and_then(|w| w.checked_add(fraction))
        .map(Mana)
}

/// Convert a wei integer into an amount
pub fn from_wei(wei: u128) -> Mana {
    Mana::from_wei(wei)
}

/// Format an amount for display: grouped integer part, fraction rounded to
/// [`DISPLAY_DECIMALS`] digits with trailing zeros removed.
pub fn to_mana(amount: Mana) -> String {
    let unit = 10u128.pow(MANA_DECIMALS - DISPLAY_DECIMALS);
    let mut whole = amount.whole();
    let mut shown = amount.fraction() / unit;
    if amount.fraction() % unit >= unit / 2 {
        shown += 1;
    }
    let limit = 10u128.pow(DISPLAY_DECIMALS);
    if shown >= limit {
        whole += 1;
        shown -= limit;
    }

    let mut out = group_thousands(whole);
    if shown > 0 {
        let digits = format!("{:0width$}", shown, width = DISPLAY_DECIMALS as usize);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

/// Insert `,` between groups of three digits
pub fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Re-normalise a price field after an edit.
///
/// Positive amounts take their display form and non-positive ones clear the
/// field. A decimal still being typed (`"12."`, `"12.50"`, `"0.0"`) keeps the
/// user's fractional digits as long as they fit the display precision.
pub fn normalize_input(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let amount = from_mana(&cleaned);

    if let Some((int_part, frac_part)) = cleaned.split_once('.') {
        let typing = frac_part.len() <= DISPLAY_DECIMALS as usize
            && frac_part.chars().all(|c| c.is_ascii_digit())
            && int_part.chars().all(|c| c.is_ascii_digit());
        if typing && (!amount.is_zero() || frac_part.chars().all(|c| c == '0')) {
            return format!("{}.{}", group_thousands(amount.whole()), frac_part);
        }
    }

    if amount.is_zero() {
        String::new()
    } else {
        to_mana(amount)
    }
}

/// Serde adapter for wei amounts carried as decimal strings (numbers are
/// accepted on input too).
pub mod wei_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u128),
    }

    pub fn serialize<S: Serializer>(wei: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&wei.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid wei amount: {s}"))),
            Raw::Number(n) => Ok(n),
        }
    }
}

impl Serialize for Mana {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        wei_string::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Mana {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        wei_string::deserialize(deserializer).map(Mana)
    }
}
