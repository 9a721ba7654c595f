//! OpenSMILES reader producing an unsanitized atom and bond list

use std::collections::BTreeMap;

use super::{elements, Atom, Bond, BondType, SmilesError};

/// a ring bond opened at `atom`, with the bond symbol written at the opening
/// digit, if any
struct OpenRing {
    atom: usize,
    bond: Option<BondType>,
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    prev: Option<usize>,
    branches: Vec<usize>,
    /// the bond symbol read since the last atom, with its position
    pending: Option<(BondType, usize)>,
    rings: BTreeMap<u16, OpenRing>,
}

pub(super) fn parse(smiles: &str) -> Result<(Vec<Atom>, Vec<Bond>), SmilesError> {
    let mut p = Parser {
        src: smiles,
        bytes: smiles.as_bytes(),
        pos: 0,
        atoms: Vec::new(),
        bonds: Vec::new(),
        prev: None,
        branches: Vec::new(),
        pending: None,
        rings: BTreeMap::new(),
    };
    p.run()?;
    Ok((p.atoms, p.bonds))
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn unexpected(&self) -> SmilesError {
        match self.src[self.pos..].chars().next() {
            Some(ch) => SmilesError::UnexpectedChar { ch, pos: self.pos },
            None => SmilesError::UnexpectedEnd,
        }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(c) = self.peek() {
            match c {
                b'(' => {
                    let Some(prev) = self.prev else {
                        return Err(self.unexpected());
                    };
                    if self.pending.is_some()
                        || self.bytes.get(self.pos + 1) == Some(&b')')
                    {
                        return Err(self.unexpected());
                    }
                    self.branches.push(prev);
                    self.pos += 1;
                }
                b')' => {
                    if let Some((_, at)) = self.pending {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    let Some(prev) = self.branches.pop() else {
                        return Err(self.unexpected());
                    };
                    self.prev = Some(prev);
                    self.pos += 1;
                }
                b'.' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    let bond = match c {
                        b'=' => BondType::Double,
                        b'#' => BondType::Triple,
                        b'$' => BondType::Quadruple,
                        b':' => BondType::Aromatic,
                        // directional bonds only matter for stereo
                        _ => BondType::Single,
                    };
                    self.pending = Some((bond, self.pos));
                    self.pos += 1;
                }
                b'0'..=b'9' | b'%' => self.ring_bond()?,
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom);
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom);
                }
            }
        }

        if let Some((_, at)) = self.pending {
            return Err(SmilesError::DanglingBond(at));
        }
        if !self.branches.is_empty() {
            return Err(SmilesError::UnclosedBranch);
        }
        if let Some((&n, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing(n));
        }
        Ok(())
    }

    /// the bond order used when none is written
    fn implicit_bond(&self, a: usize, b: usize) -> BondType {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondType::Aromatic
        } else {
            BondType::Single
        }
    }

    fn add_atom(&mut self, atom: Atom) {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev {
            let bond_type = match self.pending.take() {
                Some((bond, _)) => bond,
                None => self.implicit_bond(prev, idx),
            };
            self.bonds.push(Bond {
                begin: prev,
                end: idx,
                bond_type,
                in_ring: false,
            });
        }
        self.prev = Some(idx);
    }

    fn ring_bond(&mut self) -> Result<(), SmilesError> {
        let Some(cur) = self.prev else {
            return Err(self.unexpected());
        };
        let n = if self.peek() == Some(b'%') {
            match self.bytes.get(self.pos + 1..self.pos + 3) {
                Some(&[a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
                    self.pos += 3;
                    u16::from(a - b'0') * 10 + u16::from(b - b'0')
                }
                _ => {
                    self.pos += 1;
                    return Err(self.unexpected());
                }
            }
        } else {
            let d = self.bytes[self.pos] - b'0';
            self.pos += 1;
            u16::from(d)
        };
        let here = self.pending.take().map(|(bond, _)| bond);

        let Some(open) = self.rings.remove(&n) else {
            self.rings.insert(n, OpenRing { atom: cur, bond: here });
            return Ok(());
        };

        let duplicate = self.bonds.iter().any(|b| {
            (b.begin, b.end) == (open.atom, cur)
                || (b.begin, b.end) == (cur, open.atom)
        });
        if open.atom == cur || duplicate {
            return Err(SmilesError::InvalidRingBond(n));
        }
        let bond_type = match (open.bond, here) {
            (Some(a), Some(b)) if a != b => {
                return Err(SmilesError::InvalidRingBond(n))
            }
            (Some(a), _) | (None, Some(a)) => a,
            (None, None) => self.implicit_bond(open.atom, cur),
        };
        self.bonds.push(Bond {
            begin: open.atom,
            end: cur,
            bond_type,
            in_ring: false,
        });
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let c = self.bytes[self.pos];
        let next = self.bytes.get(self.pos + 1).copied();
        let (atomic_num, aromatic, len) = match (c, next) {
            (b'B', Some(b'r')) => (35, false, 2),
            (b'C', Some(b'l')) => (17, false, 2),
            (b'B', _) => (5, false, 1),
            (b'C', _) => (6, false, 1),
            (b'N', _) => (7, false, 1),
            (b'O', _) => (8, false, 1),
            (b'P', _) => (15, false, 1),
            (b'S', _) => (16, false, 1),
            (b'F', _) => (9, false, 1),
            (b'I', _) => (53, false, 1),
            (b'b', _) => (5, true, 1),
            (b'c', _) => (6, true, 1),
            (b'n', _) => (7, true, 1),
            (b'o', _) => (8, true, 1),
            (b'p', _) => (15, true, 1),
            (b's', _) => (16, true, 1),
            (b'*', _) => (0, false, 1),
            _ => return Err(self.unexpected()),
        };
        self.pos += len;
        Ok(Atom {
            atomic_num,
            aromatic,
            ..Default::default()
        })
    }

    fn digits(&mut self, max: usize) -> Option<u16> {
        let start = self.pos;
        while self.pos - start < max
            && self.peek().is_some_and(|c| c.is_ascii_digit())
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.src[start..self.pos].parse().ok()
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        // skip '['
        self.pos += 1;
        let isotope = self.digits(3).unwrap_or(0);
        let (atomic_num, aromatic) = self.bracket_symbol()?;
        self.chirality();

        let mut num_hs = 0;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            num_hs = self.digits(1).unwrap_or(1) as u8;
        }

        let formal_charge = self.charge()?;

        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.digits(5).is_none() {
                return Err(self.unexpected());
            }
        }
        match self.peek() {
            Some(b']') => self.pos += 1,
            _ => return Err(self.unexpected()),
        }
        Ok(Atom {
            atomic_num,
            isotope,
            formal_charge,
            aromatic,
            bracket: true,
            num_hs,
            in_ring: false,
        })
    }

    fn bracket_symbol(&mut self) -> Result<(u8, bool), SmilesError> {
        let Some(c) = self.peek() else {
            return Err(SmilesError::UnexpectedEnd);
        };
        if c == b'*' {
            self.pos += 1;
            return Ok((0, false));
        }
        if c.is_ascii_lowercase() {
            for len in [2, 1] {
                let Some(sym) = self.src.get(self.pos..self.pos + len) else {
                    continue;
                };
                if let Some(n) = elements::aromatic_symbol(sym) {
                    self.pos += len;
                    return Ok((n, true));
                }
            }
            return Err(self.unexpected());
        }
        if !c.is_ascii_uppercase() {
            return Err(self.unexpected());
        }
        let two = self
            .src
            .get(self.pos..self.pos + 2)
            .filter(|s| s.as_bytes()[1].is_ascii_lowercase());
        if let Some(n) = two.and_then(elements::atomic_number) {
            self.pos += 2;
            return Ok((n, false));
        }
        let one = &self.src[self.pos..self.pos + 1];
        match elements::atomic_number(one) {
            Some(n) => {
                self.pos += 1;
                Ok((n, false))
            }
            None => {
                let sym = two.unwrap_or(one).to_owned();
                Err(SmilesError::UnknownElement(sym))
            }
        }
    }

    /// chirality is read and discarded: `@`, `@@`, or a named class like
    /// `@TH1` or `@OH12`
    fn chirality(&mut self) {
        if self.peek() != Some(b'@') {
            return;
        }
        self.pos += 1;
        if self.peek() == Some(b'@') {
            self.pos += 1;
            return;
        }
        let class = self.src.get(self.pos..self.pos + 2);
        if matches!(class, Some("TH" | "AL" | "SP" | "TB" | "OH")) {
            self.pos += 2;
            self.digits(2);
        }
    }

    fn charge(&mut self) -> Result<i8, SmilesError> {
        let sign = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.bytes[self.pos];
        self.pos += 1;
        if let Some(n) = self.digits(2) {
            return Ok(sign * n as i8);
        }
        let mut count = 1;
        while self.peek() == Some(symbol) {
            self.pos += 1;
            count += 1;
        }
        if count > 15 {
            return Err(self.unexpected());
        }
        Ok(sign * count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom_nums(smiles: &str) -> Vec<u8> {
        parse(smiles).unwrap().0.iter().map(|a| a.atomic_num).collect()
    }

    fn bond_list(smiles: &str) -> Vec<(usize, usize, BondType)> {
        parse(smiles)
            .unwrap()
            .1
            .iter()
            .map(|b| (b.begin, b.end, b.bond_type))
            .collect()
    }

    #[test]
    fn chains_and_branches() {
        assert_eq!(atom_nums("CCO"), vec![6, 6, 8]);
        assert_eq!(atom_nums("ClCBr"), vec![17, 6, 35]);
        use BondType::*;
        assert_eq!(
            bond_list("CC(=O)N"),
            vec![(0, 1, Single), (1, 2, Double), (1, 3, Single)]
        );
        assert_eq!(
            bond_list("C(C)(C)C#N"),
            vec![(0, 1, Single), (0, 2, Single), (0, 3, Single), (3, 4, Triple)]
        );
        assert_eq!(bond_list("C.C"), vec![]);
        assert_eq!(bond_list("F/C=C/F").len(), 3);
    }

    #[test]
    fn ring_closures() {
        use BondType::*;
        assert_eq!(
            bond_list("C1CC1"),
            vec![(0, 1, Single), (1, 2, Single), (0, 2, Single)]
        );
        assert_eq!(
            bond_list("c1ccccc1"),
            vec![
                (0, 1, Aromatic),
                (1, 2, Aromatic),
                (2, 3, Aromatic),
                (3, 4, Aromatic),
                (4, 5, Aromatic),
                (0, 5, Aromatic)
            ]
        );
        assert_eq!(bond_list("C=1CC1")[2], (0, 2, Double));
        assert_eq!(bond_list("C%12CC%12")[2], (0, 2, Single));
        // ring numbers can be reused once closed
        assert_eq!(bond_list("C1CC1C1CC1").len(), 7);
    }

    #[test]
    fn bracket_atoms() {
        let (atoms, _) = parse("[13CH3:7][N+](C)(C)[O-]").unwrap();
        assert_eq!(atoms[0].atomic_num, 6);
        assert_eq!(atoms[0].isotope, 13);
        assert_eq!(atoms[0].num_hs, 3);
        assert!(atoms[0].bracket);
        assert_eq!(atoms[1].formal_charge, 1);
        assert_eq!(atoms[4].formal_charge, -1);

        let (atoms, _) = parse("[C@@H](F)(Cl)Br").unwrap();
        assert_eq!(atoms[0].num_hs, 1);

        let (atoms, _) = parse("[Fe++].[Cl-].[Cl-]").unwrap();
        assert_eq!(atoms[0].atomic_num, 26);
        assert_eq!(atoms[0].formal_charge, 2);

        let (atoms, _) = parse("c1cc[nH]c1").unwrap();
        assert!(atoms[3].aromatic);
        assert_eq!(atoms[3].num_hs, 1);

        let (atoms, _) = parse("[se]1cccc1").unwrap();
        assert_eq!(atoms[0].atomic_num, 34);

        let (atoms, _) = parse("[Sc]").unwrap();
        assert_eq!(atoms[0].atomic_num, 21);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(
            parse("notasmiles").unwrap_err(),
            SmilesError::UnexpectedChar { ch: 't', pos: 2 }
        );
        assert_eq!(parse("C1CC").unwrap_err(), SmilesError::UnclosedRing(1));
        assert_eq!(parse("C(C").unwrap_err(), SmilesError::UnclosedBranch);
        assert_eq!(parse("CC=").unwrap_err(), SmilesError::DanglingBond(2));
        assert_eq!(parse("C=)").unwrap_err(), SmilesError::DanglingBond(1));
        assert_eq!(parse("C11").unwrap_err(), SmilesError::InvalidRingBond(1));
        assert_eq!(
            parse("C=1CC-1").unwrap_err(),
            SmilesError::InvalidRingBond(1)
        );
        assert_eq!(
            parse("[Xx]").unwrap_err(),
            SmilesError::UnknownElement("Xx".to_owned())
        );
        assert_eq!(parse("[CH4").unwrap_err(), SmilesError::UnexpectedEnd);
        for bad in ["=C", "C)", "()", "C()", "C..C", ".C", "1C", "C%1", "CéC"] {
            assert!(parse(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn empty() {
        let (atoms, bonds) = parse("").unwrap();
        assert!(atoms.is_empty());
        assert!(bonds.is_empty());
    }
}
