//! A small RDKit-flavored chemistry toolkit: enough SMILES parsing and
//! sanitization to build molecular graphs, plus Morgan fingerprints over them.

use bitflags::bitflags;
use log::trace;
use thiserror::Error;

use self::bitvector::BitVector;

mod aromaticity;
pub mod bitvector;
pub mod elements;
pub mod fingerprint;
mod rings;
mod smiles;

#[derive(Debug, Error, PartialEq)]
pub enum SmilesError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unexpected end of input inside a bracket atom")]
    UnexpectedEnd,

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error("bond without a following atom at position {0}")]
    DanglingBond(usize),

    #[error("unclosed branch")]
    UnclosedBranch,

    #[error("unclosed ring bond {0}")]
    UnclosedRing(u16),

    #[error("invalid ring bond {0}")]
    InvalidRingBond(u16),

    #[error("explicit valence {valence} for atom {atom} ({symbol}) is greater than permitted")]
    Valence {
        atom: usize,
        symbol: &'static str,
        valence: u32,
    },

    #[error("non-ring atom {0} marked aromatic")]
    NonRingAromatic(usize),
}

bitflags! {
    /// sanitization steps applied after the SMILES string is read
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SanitizeFlags: u32 {
        /// assign implicit hydrogens and reject impossible valences
        const PROPERTIES = 0x1;
        /// perceive ring membership of atoms and bonds
        const SYMMRINGS = 0x2;
        /// reject aromatic atoms and bonds outside of rings, then mark rings
        /// obeying Hückel's rule as aromatic. implies SYMMRINGS
        const AROMATICITY = 0x4;
        /// fold plain explicit hydrogen atoms into their neighbors
        const REMOVEHS = 0x8;
        const ALL = Self::PROPERTIES.bits()
            | Self::SYMMRINGS.bits()
            | Self::AROMATICITY.bits()
            | Self::REMOVEHS.bits();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BondType {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondType {
    /// numeric code matching RDKit's `Bond::BondType` enum
    pub fn code(&self) -> u32 {
        match self {
            BondType::Single => 1,
            BondType::Double => 2,
            BondType::Triple => 3,
            BondType::Quadruple => 4,
            BondType::Aromatic => 12,
        }
    }

    /// contribution to the explicit valence of either end. aromatic bonds
    /// count once here, the extra pi electron is added per atom
    fn valence(&self) -> u32 {
        match self {
            BondType::Single | BondType::Aromatic => 1,
            BondType::Double => 2,
            BondType::Triple => 3,
            BondType::Quadruple => 4,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Atom {
    atomic_num: u8,
    isotope: u16,
    formal_charge: i8,
    aromatic: bool,
    /// written in brackets, so the hydrogen count is fixed by the input
    bracket: bool,
    num_hs: u8,
    in_ring: bool,
}

impl Atom {
    pub fn atomic_num(&self) -> u8 {
        self.atomic_num
    }

    pub fn symbol(&self) -> &'static str {
        elements::symbol(self.atomic_num)
    }

    /// 0 when no isotope was given
    pub fn isotope(&self) -> u16 {
        self.isotope
    }

    pub fn formal_charge(&self) -> i8 {
        self.formal_charge
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }

    /// explicit plus implicit hydrogens
    pub fn total_num_hs(&self) -> u8 {
        self.num_hs
    }

    pub fn is_in_ring(&self) -> bool {
        self.in_ring
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bond {
    begin: usize,
    end: usize,
    bond_type: BondType,
    in_ring: bool,
}

impl Bond {
    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn bond_type(&self) -> BondType {
        self.bond_type
    }

    pub fn is_in_ring(&self) -> bool {
        self.in_ring
    }
}

/// a sanitized molecular graph. hydrogens are stored as counts on their heavy
/// atoms unless they could not be removed
#[derive(Clone, Debug, PartialEq)]
pub struct ROMol {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// (neighbor atom, bond index) for every atom
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl ROMol {
    pub fn from_smiles(smiles: &str) -> Result<Self, SmilesError> {
        Self::from_smiles_with(smiles, SanitizeFlags::ALL)
    }

    pub fn from_smiles_with(
        smiles: &str,
        ops: SanitizeFlags,
    ) -> Result<Self, SmilesError> {
        let (atoms, bonds) = smiles::parse(smiles)?;
        let mut mol = Self::new(atoms, bonds);
        if ops.contains(SanitizeFlags::PROPERTIES) {
            mol.assign_hydrogens()?;
        }
        if ops.contains(SanitizeFlags::REMOVEHS) {
            mol.remove_hs();
        }
        if ops.intersects(SanitizeFlags::SYMMRINGS | SanitizeFlags::AROMATICITY)
        {
            mol.assign_rings();
        }
        if ops.contains(SanitizeFlags::AROMATICITY) {
            mol.check_aromaticity()?;
            aromaticity::perceive(&mut mol);
        }
        Ok(mol)
    }

    fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, idx));
            adjacency[bond.end].push((bond.begin, idx));
        }
        Self {
            atoms,
            bonds,
            adjacency,
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// (neighbor atom, bond index) pairs for atom `idx`
    pub fn neighbors(&self, idx: usize) -> &[(usize, usize)] {
        &self.adjacency[idx]
    }

    /// number of explicit neighbors, not counting hydrogens stored as counts
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    pub fn morgan_fingerprint_bit_vec<const N: usize>(
        &self,
        radius: u32,
    ) -> BitVector {
        fingerprint::morgan_fingerprint(self, radius, N)
    }

    fn explicit_valence(&self, idx: usize) -> u32 {
        self.adjacency[idx]
            .iter()
            .map(|&(_, b)| self.bonds[b].bond_type.valence())
            .sum()
    }

    /// fill in implicit hydrogens for organic subset atoms from their default
    /// valences, and reject uncharged atoms with too many bonds
    fn assign_hydrogens(&mut self) -> Result<(), SmilesError> {
        for idx in 0..self.atoms.len() {
            let valence = self.explicit_valence(idx);
            let has_aromatic_bond = self.adjacency[idx].iter().any(|&(_, b)| {
                self.bonds[b].bond_type == BondType::Aromatic
            });
            let atom = &mut self.atoms[idx];
            let allowed = elements::default_valences(atom.atomic_num);
            if atom.bracket {
                let total = valence + u32::from(atom.num_hs);
                if atom.formal_charge == 0
                    && !atom.aromatic
                    && allowed.last().is_some_and(|&max| total > u32::from(max))
                {
                    return Err(SmilesError::Valence {
                        atom: idx,
                        symbol: atom.symbol(),
                        valence: total,
                    });
                }
                continue;
            }
            let Some(&lowest) = allowed.first() else {
                // wildcard
                continue;
            };
            if atom.aromatic {
                // aromatic atoms carry one extra bond order from the pi system
                let used = valence + u32::from(has_aromatic_bond);
                atom.num_hs = u32::from(lowest).saturating_sub(used) as u8;
                continue;
            }
            match allowed.iter().find(|&&v| u32::from(v) >= valence) {
                Some(&v) => atom.num_hs = v - valence as u8,
                None => {
                    return Err(SmilesError::Valence {
                        atom: idx,
                        symbol: atom.symbol(),
                        valence,
                    })
                }
            }
        }
        Ok(())
    }

    /// drop hydrogen atoms that are plain (no isotope or charge) and bonded to
    /// exactly one heavy atom, adding them to that atom's hydrogen count
    fn remove_hs(&mut self) {
        let removable: Vec<bool> = (0..self.atoms.len())
            .map(|idx| {
                let atom = &self.atoms[idx];
                atom.atomic_num == 1
                    && atom.isotope == 0
                    && atom.formal_charge == 0
                    && atom.num_hs == 0
                    && matches!(
                        self.adjacency[idx].as_slice(),
                        [(nbr, b)] if self.atoms[*nbr].atomic_num != 1
                            && self.bonds[*b].bond_type == BondType::Single
                    )
            })
            .collect();
        if !removable.iter().any(|&r| r) {
            return;
        }

        let mut atoms = std::mem::take(&mut self.atoms);
        for idx in (0..removable.len()).filter(|&i| removable[i]) {
            let (nbr, _) = self.adjacency[idx][0];
            atoms[nbr].num_hs = atoms[nbr].num_hs.saturating_add(1);
        }

        let mut new_index = vec![usize::MAX; atoms.len()];
        let mut kept = Vec::with_capacity(atoms.len());
        for (idx, atom) in atoms.into_iter().enumerate() {
            if !removable[idx] {
                new_index[idx] = kept.len();
                kept.push(atom);
            }
        }
        let bonds = std::mem::take(&mut self.bonds)
            .into_iter()
            .filter(|b| !removable[b.begin] && !removable[b.end])
            .map(|b| Bond {
                begin: new_index[b.begin],
                end: new_index[b.end],
                ..b
            })
            .collect();
        *self = Self::new(kept, bonds);
    }

    fn assign_rings(&mut self) {
        let ring_bonds = rings::ring_bonds(&self.adjacency, self.bonds.len());
        for (bond, in_ring) in self.bonds.iter_mut().zip(ring_bonds) {
            bond.in_ring = in_ring;
        }
        for (idx, atom) in self.atoms.iter_mut().enumerate() {
            atom.in_ring = self.adjacency[idx]
                .iter()
                .any(|&(_, b)| self.bonds[b].in_ring);
        }
    }

    fn check_aromaticity(&self) -> Result<(), SmilesError> {
        if let Some(idx) =
            self.atoms.iter().position(|a| a.aromatic && !a.in_ring)
        {
            return Err(SmilesError::NonRingAromatic(idx));
        }
        if let Some(bond) = self
            .bonds
            .iter()
            .find(|b| b.bond_type == BondType::Aromatic && !b.in_ring)
        {
            return Err(SmilesError::NonRingAromatic(bond.begin));
        }
        Ok(())
    }
}

/// The chemistry capabilities the conversion pipeline needs: turning a
/// structure string into a molecule and a molecule into a fixed-length bit
/// vector.
pub trait Toolkit {
    type Mol;

    /// returns `None` when `smiles` is not an acceptable structure
    fn parse(&self, smiles: &str) -> Option<Self::Mol>;

    fn fingerprint(&self, mol: &Self::Mol, radius: u32, nbits: usize)
        -> BitVector;
}

/// the in-crate SMILES parser and Morgan implementation
#[derive(Clone, Copy, Debug, Default)]
pub struct Builtin;

impl Toolkit for Builtin {
    type Mol = ROMol;

    fn parse(&self, smiles: &str) -> Option<ROMol> {
        ROMol::from_smiles(smiles)
            .map_err(|e| trace!("rejected {smiles}: {e}"))
            .ok()
    }

    fn fingerprint(&self, mol: &ROMol, radius: u32, nbits: usize) -> BitVector {
        fingerprint::morgan_fingerprint(mol, radius, nbits)
    }
}
