//! Quoting state shared by the line assembler and the word tokenizer.

/// Which kind of quoted region, if any, the scanner is currently in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QuoteState {
    /// Outside of any quoted region.
    #[default]
    Unquoted,

    /// Inside a region opened by `'`.
    SingleQuoted,

    /// Inside a region opened by `"`.
    DoubleQuoted,
}

impl QuoteState {
    /// Evaluate if a quoted region is open.
    #[inline(always)]
    pub fn is_quoted(self) -> bool {
        self != QuoteState::Unquoted
    }

    /// Compute the state after reading the unescaped character `c`.
    ///
    /// Returns `None` when `c` is not structural in the current state, that is when it is not a
    /// quote character, or when it is a quote character of the other kind inside a quoted
    /// region.
    pub fn transition(self, c: char) -> Option<QuoteState> {
        match (self, c) {
            (QuoteState::Unquoted, '\'') => Some(QuoteState::SingleQuoted),
            (QuoteState::Unquoted, '"') => Some(QuoteState::DoubleQuoted),
            (QuoteState::SingleQuoted, '\'') | (QuoteState::DoubleQuoted, '"') => {
                Some(QuoteState::Unquoted)
            }
            _ => None,
        }
    }
}
