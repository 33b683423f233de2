//! Option grammar and lazy enumeration of option combinations (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeSet;

/// Ordered option groups; one choice is picked from each group.
///
/// The empty string is the "skip this group" choice. A group holding a single
/// non-empty choice is therefore mandatory whenever the font supports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionGrammar {
    groups: Vec<Vec<String>>,
}

impl OptionGrammar {
    pub fn new<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|g| g.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    /// Narrow every group to the choices `features` supports.
    ///
    /// Declared empty choices survive; groups left with nothing are dropped.
    pub fn supported_by(&self, features: &BTreeSet<String>) -> Vec<Vec<String>> {
        self.groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .filter(|choice| choice.is_empty() || features.contains(choice.as_str()))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// Every valid combination for a font with the given features.
    pub fn combinations_for(&self, features: &BTreeSet<String>) -> Breakout {
        Breakout::new(self.supported_by(features))
    }
}

/// Lazy cross-product over option groups.
///
/// Yields one combination per pick of one choice from every group, in group
/// order, with the first group varying slowest. Empty choices and repeated
/// tokens are left out of each combination. Combinations that end up empty,
/// or equal to one already yielded, are skipped. Clone it before iterating to
/// restart.
#[derive(Debug, Clone)]
pub struct Breakout {
    groups: Vec<Vec<String>>,
    cursor: Vec<usize>,
    yielded: BTreeSet<Vec<String>>,
    exhausted: bool,
}

impl Breakout {
    pub fn new(groups: Vec<Vec<String>>) -> Self {
        let groups: Vec<Vec<String>> = groups.into_iter().filter(|g| !g.is_empty()).collect();
        Self {
            cursor: vec![0; groups.len()],
            yielded: BTreeSet::new(),
            exhausted: groups.is_empty(),
            groups,
        }
    }

    /// Upper bound on the number of combinations: the product of group sizes.
    pub fn upper_bound(&self) -> usize {
        if self.groups.is_empty() {
            return 0;
        }
        self.groups.iter().map(Vec::len).product()
    }

    fn current(&self) -> Vec<String> {
        let mut combo: Vec<String> = Vec::with_capacity(self.groups.len());
        for (group, &idx) in self.groups.iter().zip(&self.cursor) {
            let choice = &group[idx];
            if !choice.is_empty() && !combo.contains(choice) {
                combo.push(choice.clone());
            }
        }
        combo
    }

    fn advance(&mut self) {
        for pos in (0..self.groups.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.groups[pos].len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for Breakout {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let combo = self.current();
            self.advance();
            if !combo.is_empty() && self.yielded.insert(combo.clone()) {
                return Some(combo);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            (0, Some(0))
        } else {
            (0, Some(self.upper_bound()))
        }
    }
}
