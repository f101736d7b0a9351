/// A single allele call at one site.
/// Gaps carry no information and are never compared against other alleles.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::FromRepr)]
pub enum Allele {
    Zero=0,
    One=1,
    Gap=2
}

impl Allele {
    /// The character used for gaps in every text format
    pub const GAP_CHAR: char = '-';

    /// Parses a single allele character, returns None for anything outside of `0`, `1`, or `-`
    pub fn from_char(c: char) -> Option<Allele> {
        match c {
            '0' => Some(Allele::Zero),
            '1' => Some(Allele::One),
            Self::GAP_CHAR => Some(Allele::Gap),
            _ => None
        }
    }

    /// Converts a bit into the equivalent called allele
    pub fn from_bit(bit: bool) -> Allele {
        if bit { Allele::One } else { Allele::Zero }
    }

    pub fn to_char(self) -> char {
        match self {
            Allele::Zero => '0',
            Allele::One => '1',
            Allele::Gap => Self::GAP_CHAR
        }
    }

    /// Returns true if this is a 0 or 1 call
    pub fn is_called(self) -> bool {
        self < Allele::Gap
    }

    /// Flips 0 <--> 1, gaps stay gaps
    pub fn complement(self) -> Allele {
        match self {
            Allele::Zero => Allele::One,
            Allele::One => Allele::Zero,
            Allele::Gap => Allele::Gap
        }
    }

    /// Returns true only if both alleles are called and they differ.
    /// Any gap on either side is never a mismatch.
    pub fn mismatches(self, other: Allele) -> bool {
        self.is_called() && other.is_called() && self != other
    }
}

impl std::fmt::Display for Allele {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses a full allele string, returning the index of the first bad character on failure
/// # Arguments
/// * `value` - the string of `0`, `1`, and `-` characters to convert
pub fn parse_alleles(value: &str) -> Result<Vec<Allele>, (usize, char)> {
    value.chars().enumerate()
        .map(|(i, c)| Allele::from_char(c).ok_or((i, c)))
        .collect()
}

/// Renders alleles back into their string form
pub fn alleles_to_string(alleles: &[Allele]) -> String {
    alleles.iter().map(|a| a.to_char()).collect()
}
