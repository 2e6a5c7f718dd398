use serde::{Deserialize, Serialize};

/// Per-slot validity flags kept parallel to a series' entries.
///
/// The flags are reconciled lazily: the owner may change its entry count
/// without touching the overlay, and [`Validity::reconcile`] pads with
/// `false` or trims to bring the two back in line. Lookups take the entry
/// count so they see the reconciled view without mutating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    flags: Vec<bool>,
}

impl Validity {
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    pub fn from_flags(flags: Vec<bool>) -> Self {
        Self { flags }
    }

    /// Raw flag count, which may disagree with the owner's entry count until reconciled.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Pad with `false` or truncate to exactly `len` flags.
    /// Returns whether anything changed.
    pub fn reconcile(&mut self, len: usize) -> bool {
        if self.flags.len() == len {
            return false;
        }
        self.flags.resize(len, false);
        true
    }

    /// Flag at `index` as seen after reconciling to `len`.
    pub fn get(&self, index: usize, len: usize) -> bool {
        index < len && self.flags.get(index).copied().unwrap_or(false)
    }

    /// Overwrite an existing flag. Returns whether it changed.
    ///
    /// Callers reconcile first; an index past the end is ignored.
    pub fn set(&mut self, index: usize, valid: bool) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if *flag != valid => {
                *flag = valid;
                true
            }
            _ => false,
        }
    }

    pub fn push(&mut self, valid: bool) {
        self.flags.push(valid);
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    /// Number of valid slots among the first `len`.
    pub fn count_valid(&self, len: usize) -> usize {
        self.flags.iter().take(len).filter(|&&f| f).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}
