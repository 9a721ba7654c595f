//! Morgan (circular) fingerprints, following the layout of RDKit's
//! `MorganFingerprints::getFingerprint` with connectivity invariants

use std::collections::HashSet;

use super::{bitvector::BitVector, ROMol};

/// boost's `hash_combine` on 32-bit values
fn hash_combine(seed: &mut u32, value: u32) {
    *seed ^= value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}

/// the initial identifier of each atom: atomic number, total degree, total
/// hydrogen count, formal charge, isotope, and ring membership
pub fn atom_invariants(mol: &ROMol) -> Vec<u32> {
    mol.atoms()
        .iter()
        .enumerate()
        .map(|(idx, atom)| {
            let num_hs = u32::from(atom.total_num_hs());
            let mut components = vec![
                u32::from(atom.atomic_num()),
                mol.degree(idx) as u32 + num_hs,
                num_hs,
                i32::from(atom.formal_charge()) as u32,
                u32::from(atom.isotope()),
            ];
            if atom.is_in_ring() {
                components.push(1);
            }
            let mut seed = 0;
            for c in components {
                hash_combine(&mut seed, c);
            }
            seed
        })
        .collect()
}

/// compute the `nbits`-long Morgan fingerprint of `mol` out to `radius`
/// bonds. panics if `nbits` is zero
pub fn morgan_fingerprint(mol: &ROMol, radius: u32, nbits: usize) -> BitVector {
    assert!(nbits > 0, "fingerprint length must be positive");
    let natoms = mol.num_atoms();
    let mut fp = BitVector::new(nbits);

    let mut invariants = atom_invariants(mol);
    for &inv in &invariants {
        fp.set(inv as usize % nbits);
    }

    // the set of bonds covered by each atom's environment so far
    let mut neighborhoods = vec![BitVector::new(mol.num_bonds()); natoms];
    let mut seen: HashSet<BitVector> = HashSet::new();
    let mut dead = vec![false; natoms];

    for layer in 0..radius {
        let mut next = invariants.clone();
        let mut round = Vec::with_capacity(natoms);
        for idx in 0..natoms {
            if dead[idx] {
                continue;
            }
            let nbrs = mol.neighbors(idx);
            if nbrs.is_empty() {
                dead[idx] = true;
                continue;
            }
            let mut env = neighborhoods[idx].clone();
            let mut pairs: Vec<(u32, u32)> = nbrs
                .iter()
                .map(|&(nbr, bond)| {
                    env.set(bond);
                    env |= &neighborhoods[nbr];
                    (mol.bonds()[bond].bond_type().code(), invariants[nbr])
                })
                .collect();
            pairs.sort_unstable();

            let mut inv = layer;
            hash_combine(&mut inv, invariants[idx]);
            for (bond_type, nbr_inv) in pairs {
                hash_combine(&mut inv, bond_type);
                hash_combine(&mut inv, nbr_inv);
            }
            next[idx] = inv;
            round.push((env, inv, idx));
        }

        // an environment covering the same bonds as an earlier one adds no
        // information, and its atom stops growing
        round.sort();
        for (env, inv, idx) in round {
            if seen.contains(&env) {
                dead[idx] = true;
            } else {
                fp.set(inv as usize % nbits);
                seen.insert(env.clone());
            }
            neighborhoods[idx] = env;
        }
        invariants = next;
    }
    fp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(smiles: &str) -> BitVector {
        let mol = ROMol::from_smiles(smiles).unwrap();
        morgan_fingerprint(&mol, 3, 1024)
    }

    #[test]
    fn deterministic() {
        assert_eq!(fp("CC(=O)Oc1ccccc1C(=O)O"), fp("CC(=O)Oc1ccccc1C(=O)O"));
    }

    #[test]
    fn same_molecule_different_smiles() {
        let want = fp("CCO");
        for s in ["OCC", "C(O)C", "C(C)O", "[CH3][CH2][OH]", "[H]OCC"] {
            assert_eq!(fp(s), want, "{s}");
        }

        let want = fp("c1ccccc1O");
        for s in ["Oc1ccccc1", "c1cc(O)ccc1", "c1ccc(cc1)O"] {
            assert_eq!(fp(s), want, "{s}");
        }

        assert_eq!(fp("C1CCCCC1C(=O)N"), fp("NC(=O)C1CCCCC1"));

        for (aromatic, kekule) in [
            ("c1ccccc1", "C1=CC=CC=C1"),
            ("Cc1ccccc1", "CC1=CC=CC=C1"),
            ("c1ccncc1", "C1=CC=NC=C1"),
            ("c1cc[nH]c1", "C1=CNC=C1"),
            ("c1ccc2ccccc2c1", "C1=CC=C2C=CC=CC2=C1"),
            ("O=c1cccc[nH]1", "O=C1C=CC=CN1"),
            ("CC(=O)Oc1ccccc1C(=O)O", "CC(=O)OC1=CC=CC=C1C(=O)O"),
        ] {
            assert_eq!(fp(kekule), fp(aromatic), "{kekule}");
        }
        // partly Kekulé naphthalene
        assert_eq!(fp("c1ccc2C=CC=Cc2c1"), fp("c1ccc2ccccc2c1"));
    }

    #[test]
    fn different_molecules() {
        assert_ne!(fp("CCO"), fp("CC"));
        assert_ne!(fp("CCO"), fp("CCN"));
        assert_ne!(fp("C1CCCCC1"), fp("CCCCCC"));
        assert_ne!(fp("C1=CCCCC1"), fp("c1ccccc1"));
    }

    #[test]
    fn radius_zero() {
        // three distinct atom environments: CH3, CH2 and OH
        let mol = ROMol::from_smiles("CCO").unwrap();
        assert_eq!(morgan_fingerprint(&mol, 0, 1 << 20).count_ones(), 3);
        // methyl groups of ethane are identical
        let mol = ROMol::from_smiles("CC").unwrap();
        assert_eq!(morgan_fingerprint(&mol, 0, 1 << 20).count_ones(), 1);
    }

    #[test]
    fn ethane_stops_growing() {
        // both atoms reach the same one-bond environment, and nothing beyond
        // it exists
        let mol = ROMol::from_smiles("CC").unwrap();
        let r1 = morgan_fingerprint(&mol, 1, 1 << 20);
        let r3 = morgan_fingerprint(&mol, 3, 1 << 20);
        assert_eq!(r1.count_ones(), 2);
        assert_eq!(r1, r3);
    }

    #[test]
    fn larger_radius_is_superset() {
        let mol = ROMol::from_smiles("CC(C)Cc1ccc(cc1)C(C)C(=O)O").unwrap();
        let r2 = morgan_fingerprint(&mol, 2, 2048);
        let r3 = morgan_fingerprint(&mol, 3, 2048);
        assert!(r2.ones().all(|i| r3.get(i)));
        assert!(r3.count_ones() > r2.count_ones());
    }

    #[test]
    fn isolated_atoms() {
        let mol = ROMol::from_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(morgan_fingerprint(&mol, 3, 1 << 20).count_ones(), 2);
        let mol = ROMol::from_smiles("").unwrap();
        assert_eq!(morgan_fingerprint(&mol, 3, 1024).count_ones(), 0);
    }
}
