//! Token sets and naming helpers shared by the classifier and the exploder
//!
//! Font styles arrive as loose words ("Semibold", "It", "Condensed") and
//! leave as terse Berry codes. In between they live in two small value types:
//! [`AxisSet`], the canonical sorted form used as a classification key, and
//! [`TokenList`], the first-seen ordered form used while building codes.
//!
//! Made with curiosity at FontLab https://www.fontlab.com/
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used when token lists are rendered as keys and font names.
pub const SEP: &str = "-";

/// The token standing in for "nothing special on this axis".
pub const REGULAR: &str = "regular";

/// Canonical token set for one style axis (weight, width, or variant).
///
/// Sorted and deduplicated on construction; an empty set becomes `regular`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisSet(Vec<String>);

impl AxisSet {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        tokens.retain(|t| !t.is_empty());
        tokens.sort_unstable();
        tokens.dedup();
        if tokens.is_empty() {
            tokens.push(REGULAR.to_string());
        }
        Self(tokens)
    }

    pub fn regular() -> Self {
        Self(vec![REGULAR.to_string()])
    }

    /// Parse the hyphen-joined form back into a set.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(SEP))
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn is_regular(&self) -> bool {
        self.0.len() == 1 && self.0[0] == REGULAR
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(SEP))
    }
}

/// Ordered token list that drops repeats, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenList(Vec<String>);

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` unless it is empty or already present.
    pub fn push(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() && !self.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            self.push(token);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    pub fn remove(&mut self, token: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != token);
        self.0.len() != before
    }

    /// True when empty or exactly `{regular}`.
    pub fn is_regular(&self) -> bool {
        self.0.is_empty() || (self.0.len() == 1 && self.0[0] == REGULAR)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&AxisSet> for TokenList {
    fn from(set: &AxisSet) -> Self {
        let mut list = TokenList::new();
        list.extend(set.tokens().iter().cloned());
        list
    }
}

impl<S: Into<String>> FromIterator<S> for TokenList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = TokenList::new();
        list.extend(iter);
        list
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(SEP))
    }
}

/// Numeral-style feature tags (`lnum`, `onum`, `pnum`, `tnum`, ...).
pub fn is_numeral_tag(tag: &str) -> bool {
    tag.len() == 4 && tag.get(1..) == Some("num")
}

/// Spell out digits so a Berry ID can be used inside a TeX control sequence.
pub fn letterize(raw: &str) -> String {
    const DIGITS: [&str; 10] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
    ];

    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch.to_digit(10) {
            Some(d) => out.push_str(DIGITS[d as usize]),
            None => out.push(ch),
        }
    }
    out
}

/// Package-friendly family name: lowercase, no " pro"/" std", no spaces.
pub fn nice_font_name(family: &str) -> String {
    family
        .to_lowercase()
        .replace(" pro", "")
        .replace(" std", "")
        .replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_set_sorts_dedups_and_defaults_to_regular() {
        let set = AxisSet::new(["italic", "bold", "italic"]);
        assert_eq!(set.to_string(), "bold-italic");

        let empty = AxisSet::new(Vec::<String>::new());
        assert!(empty.is_regular());
        assert_eq!(empty.to_string(), "regular");
    }

    #[test]
    fn axis_set_parse_matches_constructor() {
        assert_eq!(AxisSet::parse("semibold-condensed"), AxisSet::new(["condensed", "semibold"]));
        assert_eq!(AxisSet::parse(""), AxisSet::regular());
    }

    #[test]
    fn token_list_keeps_first_seen_order() {
        let list: TokenList = ["bold", "extended", "bold", ""].into_iter().collect();
        assert_eq!(list.to_string(), "bold-extended");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn token_list_regular_detection() {
        assert!(TokenList::new().is_regular());
        assert!(TokenList::from(&AxisSet::regular()).is_regular());
        let mut list = TokenList::from(&AxisSet::regular());
        list.push("smcp");
        assert!(!list.is_regular());
    }

    #[test]
    fn numeral_tags() {
        assert!(is_numeral_tag("onum"));
        assert!(is_numeral_tag("tnum"));
        assert!(!is_numeral_tag("numr"));
        assert!(!is_numeral_tag("fakenum"));
    }

    #[test]
    fn letterize_spells_digits() {
        assert_eq!(letterize("0m2"), "zeromtwo");
        assert_eq!(letterize("9ca"), "ninica");
        assert_eq!(letterize("pmn"), "pmn");
    }

    #[test]
    fn nice_font_name_strips_suffixes() {
        assert_eq!(nice_font_name("Minion Pro"), "minion");
        assert_eq!(nice_font_name("Utopia Std"), "utopia");
        assert_eq!(nice_font_name("TeX Gyre Heros"), "texgyreheros");
    }
}
