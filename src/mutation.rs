//! Mutation records and base-level transforms.
//!
//! # Overview
//! A mutation is a single base substitution on a tree edge: a 1-based
//! genomic position plus the reference, parent and mutant bases. Its
//! canonical string form `<ref><position><alt>` (e.g. `A123T`) is the
//! identity key used for diffing and counting throughout the crate.
//!
//! # Base encoding
//! Each base is a one-hot code in the low nibble of a `u8`:
//! A = `0b0001`, C = `0b0010`, G = `0b0100`, T = `0b1000`.
//! One bit per base means complementation is a table lookup, and codes with
//! several bits set remain available for ambiguity placeholders.

use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// A nucleotide stored as a one-hot code.
///
/// The four valid bases have exactly one bit set. Any other code (ambiguity
/// or gap placeholders) is carried through the transforms unchanged rather
/// than rejected.
///
/// # Example
/// ```
/// # use mutation_tree_stats::mutation::Base;
/// assert_eq!(Base::A.complement(), Base::T);
/// assert_eq!(Base::from_char('g'), Some(Base::G));
/// assert_eq!(Base::C.to_char(), 'C');
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Base(pub u8);

impl Base {
    /// Adenine, `0b0001`.
    pub const A: Base = Base(0b0001);
    /// Cytosine, `0b0010`.
    pub const C: Base = Base(0b0010);
    /// Guanine, `0b0100`.
    pub const G: Base = Base(0b0100);
    /// Thymine, `0b1000`.
    pub const T: Base = Base(0b1000);

    /// Decode a base from its letter, case-insensitively.
    ///
    /// Returns `None` for anything outside `ACGT`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'T' => Some(Base::T),
            _ => None,
        }
    }

    /// Letter for this code; `N` for anything that is not a valid base.
    pub fn to_char(self) -> char {
        match self.0 {
            0b0001 => 'A',
            0b0010 => 'C',
            0b0100 => 'G',
            0b1000 => 'T',
            _ => 'N',
        }
    }

    /// Watson–Crick complement: A↔T, C↔G.
    ///
    /// Codes outside the four valid symbols are returned unchanged, so
    /// ambiguity placeholders survive a strand flip as-is. The transform is
    /// an involution for every code:
    ///
    /// ```
    /// # use mutation_tree_stats::mutation::Base;
    /// for b in [Base::A, Base::C, Base::G, Base::T, Base(0b0101)] {
    ///     assert_eq!(b.complement().complement(), b);
    /// }
    /// ```
    #[inline]
    pub fn complement(self) -> Self {
        match self.0 {
            0b0001 => Base::T,
            0b1000 => Base::A,
            0b0010 => Base::G,
            0b0100 => Base::C,
            _ => self,
        }
    }

    /// True iff exactly one of the four base bits is set.
    pub fn is_valid(self) -> bool {
        matches!(self.0, 0b0001 | 0b0010 | 0b0100 | 0b1000)
    }
}

/// Reflect a 1-based genomic position onto the reverse strand.
///
/// The whole crate speaks 1-based coordinates, so the map is
/// `genome_length - position + 1`; on 0-based coordinates the same map
/// reads `genome_length - position - 1`. Applying it twice with the same
/// length restores the input. `position` must lie in
/// `1..=genome_length`; [`crate::strand::reverse_strand`] checks that for
/// a whole tree before relabeling anything.
///
/// # Example
/// ```
/// # use mutation_tree_stats::mutation::reverse_position;
/// assert_eq!(reverse_position(1, 29_903), 29_903);
/// assert_eq!(reverse_position(reverse_position(266, 29_903), 29_903), 266);
/// ```
#[inline]
pub fn reverse_position(position: u32, genome_length: u32) -> u32 {
    genome_length - position + 1
}

/// A single substitution on the edge from a node's parent to the node.
///
/// Immutable value object; the node owns its mutations and they are never
/// shared across nodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Mutation {
    /// 1-based genomic position.
    pub position: u32,
    /// Base being replaced along this edge.
    pub ref_base: Base,
    /// Base carried by the parent genome at this position.
    pub par_base: Base,
    /// Base after the substitution.
    pub mut_base: Base,
}

impl Mutation {
    /// Construct a mutation record.
    pub fn new(position: u32, ref_base: Base, par_base: Base, mut_base: Base) -> Self {
        Self {
            position,
            ref_base,
            par_base,
            mut_base,
        }
    }

    /// Canonical string form `<ref><position><alt>`, the identity key for
    /// diffing and haplotype counting.
    ///
    /// ```
    /// # use mutation_tree_stats::mutation::{Base, Mutation};
    /// let m = Mutation::new(123, Base::A, Base::A, Base::T);
    /// assert_eq!(m.canonical(), "A123T");
    /// ```
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Canonical form of the reverting substitution: same position,
    /// reference and mutant symbols swapped (`A123T` → `T123A`).
    ///
    /// If a path already carries the reciprocal of a mutation, the two
    /// cancel: the genome is back at reference for that position.
    pub fn reciprocal(&self) -> String {
        format!(
            "{}{}{}",
            self.mut_base.to_char(),
            self.position,
            self.ref_base.to_char()
        )
    }

    /// The same substitution expressed in the reverse-strand coordinate
    /// frame: all three bases complemented, position reflected.
    ///
    /// ```
    /// # use mutation_tree_stats::mutation::{Base, Mutation};
    /// let m = Mutation::new(1, Base::A, Base::A, Base::G);
    /// let flipped = m.to_reverse_strand(100);
    /// assert_eq!(flipped.canonical(), "T100C");
    /// assert_eq!(flipped.to_reverse_strand(100), m);
    /// ```
    pub fn to_reverse_strand(self, genome_length: u32) -> Mutation {
        Mutation {
            position: reverse_position(self.position, genome_length),
            ref_base: self.ref_base.complement(),
            par_base: self.par_base.complement(),
            mut_base: self.mut_base.complement(),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.ref_base.to_char(),
            self.position,
            self.mut_base.to_char()
        )
    }
}

impl FromStr for Mutation {
    type Err = AnalysisError;

    /// Decode the canonical form `<ref><position><alt>`.
    ///
    /// The canonical form does not carry the parent base, which therefore
    /// defaults to the reference base.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalysisError::InvalidMutation {
            token: s.to_string(),
        };

        let ref_base = s
            .chars()
            .next()
            .and_then(Base::from_char)
            .ok_or_else(invalid)?;
        let rest = &s[1..];
        if rest.len() < 2 {
            return Err(invalid());
        }
        let mut_base = rest
            .chars()
            .next_back()
            .and_then(Base::from_char)
            .ok_or_else(invalid)?;
        let digits = &rest[..rest.len() - 1];
        let position: u32 = digits.parse().map_err(|_| invalid())?;
        if position == 0 {
            return Err(invalid());
        }

        Ok(Mutation::new(position, ref_base, ref_base, mut_base))
    }
}
