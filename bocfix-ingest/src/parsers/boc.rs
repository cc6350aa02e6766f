//! Bank of Cyprus transaction description parser
//!
//! Example description as it arrives from the bank feed:
//!   Card 5***3824 2024-10-10 71.41 EUR Auth 318622 Trace 357830 PURCHASE LU WWW.ALIEXPRESS.COM
//!
//! Fields are carved out one pass at a time in a fixed order. Every pass
//! searches what the earlier passes left behind, and whatever survives all
//! passes is the merchant description.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::types::{ExtractedFields, PurchaseType};

/// Compiled patterns for the BoC description grammar.
///
/// Build once and share: parsing holds no mutable state.
#[derive(Debug, Clone)]
pub struct DescriptionParser {
    amount_re: Regex,
    card_re: Regex,
    auth_re: Regex,
    trace_re: Regex,
    date_re: Regex,
    type_re: Regex,
    country_re: Regex,
}

impl DescriptionParser {
    pub fn new() -> Result<Self> {
        // ASCII classes only: `\d` would also accept non-ASCII digits.
        Ok(Self {
            amount_re: Regex::new(r"[0-9]+\.+[0-9]{2} [A-Z]{3}")?,
            card_re: Regex::new(r"Card ?[0-9]\*{3}[0-9]{4}")?,
            auth_re: Regex::new(r"Auth ?[0-9]+")?,
            trace_re: Regex::new(r"Trace ?[0-9]+")?,
            date_re: Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}")?,
            type_re: Regex::new(r"PURCHASE|INWARD")?,
            // Only at either edge, so two capitals inside a merchant name survive.
            country_re: Regex::new(r"^[A-Z]{2} | [A-Z]{2}$")?,
        })
    }

    /// Parse a description into its fields. Never fails: a pattern that does
    /// not match simply leaves its field empty.
    pub fn parse(&self, description: &str) -> ExtractedFields {
        let mut carver = Carver::new(description);

        let amount = carver.take("amount", &self.amount_re, "");
        let card = carver.take("card", &self.card_re, "Card");
        let auth = carver.take("auth", &self.auth_re, "Auth");
        let trace = carver.take("trace", &self.trace_re, "Trace");

        let date = carver
            .take("date", &self.date_re, "")
            .and_then(|raw| match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(err) => {
                    debug!(%err, date = %raw, description, "invalid date in BoC description");
                    None
                }
            });

        let purchase_type = carver
            .take("type", &self.type_re, "")
            .and_then(|raw| raw.parse::<PurchaseType>().ok());

        let country = carver.take("country", &self.country_re, "");

        ExtractedFields {
            card,
            auth,
            trace,
            purchase_type,
            amount,
            date,
            country,
            description: carver.into_remainder(),
        }
    }
}

/// Working copy of a description that shrinks as fields are taken out of it.
struct Carver<'a> {
    original: &'a str,
    text: String,
}

impl<'a> Carver<'a> {
    fn new(original: &'a str) -> Self {
        Self {
            original,
            text: original.to_string(),
        }
    }

    /// Find `re` in the current text, strip `prefix` from the match and trim it,
    /// then remove the matched span from the text.
    fn take(&mut self, field: &str, re: &Regex, prefix: &str) -> Option<String> {
        let Some(m) = re.find(&self.text) else {
            debug!(field, description = self.original, "field not found in BoC description");
            return None;
        };

        let matched = m.as_str();
        let value = matched.strip_prefix(prefix).unwrap_or(matched).trim().to_string();
        self.text = cut_respect_space(&self.text, m.start(), m.end());
        Some(value)
    }

    fn into_remainder(self) -> String {
        self.text
    }
}

/// Remove `[l, r)` from `text`, absorbing one neighbouring space.
///
/// A space right before the span wins; the space right after is only taken
/// when there is none before. With neither, exactly the span goes.
pub fn cut_respect_space(text: &str, l: usize, r: usize) -> String {
    let bytes = text.as_bytes();
    let (mut l, mut r) = (l, r);

    if l > 0 && bytes[l - 1] == b' ' {
        l -= 1;
    } else if r < bytes.len() && bytes[r] == b' ' {
        r += 1;
    }

    let mut out = String::with_capacity(text.len() - (r - l));
    out.push_str(&text[..l]);
    out.push_str(&text[r..]);
    out
}
