//! Hückel aromaticity over the smallest rings and over pairs of fused rings,
//! so that Kekulé and aromatic spellings of a molecule sanitize to the same
//! graph

use std::collections::BTreeSet;

use super::{rings, BondType, ROMol};

/// the number of electrons atom `idx` gives to a ring's pi system, or `None`
/// when it cannot be part of one
fn pi_electrons(mol: &ROMol, idx: usize) -> Option<u32> {
    let atom = &mol.atoms[idx];
    let mut ring_double = 0;
    let mut exo_double = false;
    for &(nbr, b) in &mol.adjacency[idx] {
        let bond = &mol.bonds[b];
        match bond.bond_type {
            BondType::Double if bond.in_ring => ring_double += 1,
            BondType::Double => {
                // only a polarized exocyclic bond, as in pyridone
                if !matches!(mol.atoms[nbr].atomic_num, 7 | 8 | 16) {
                    return None;
                }
                exo_double = true;
            }
            BondType::Triple | BondType::Quadruple => return None,
            BondType::Single | BondType::Aromatic => {}
        }
    }
    match (ring_double, exo_double) {
        (0, true) => return Some(0),
        (0, false) => {}
        (1, false) => return Some(1),
        _ => return None,
    }

    let connections = mol.degree(idx) + usize::from(atom.num_hs);
    match (atom.atomic_num, atom.formal_charge) {
        (6, -1) => Some(2),
        (6, 1) => Some(0),
        (6, 0) if atom.aromatic => Some(1),
        (7 | 15 | 33, 0) if connections == 3 => Some(2),
        (7 | 15 | 33, 0) if atom.aromatic && connections == 2 => Some(1),
        (7 | 15 | 33, 1) if atom.aromatic => Some(1),
        (8 | 16 | 34 | 52, 0) if connections == 2 => Some(2),
        (8 | 16 | 34 | 52, 1) if atom.aromatic => Some(1),
        (5, 0) if connections == 3 => Some(0),
        _ => None,
    }
}

fn cycle_atoms(mol: &ROMol, cycle: &[usize]) -> BTreeSet<usize> {
    cycle
        .iter()
        .flat_map(|&b| [mol.bonds[b].begin, mol.bonds[b].end])
        .collect()
}

/// whether every atom of `cycle` can join a pi system and together they hold
/// 4n + 2 electrons
fn is_huckel(mol: &ROMol, electrons: &[Option<u32>], cycle: &[usize]) -> bool {
    let mut total = 0;
    for atom in cycle_atoms(mol, cycle) {
        match electrons[atom] {
            Some(e) => total += e,
            None => return false,
        }
    }
    total % 4 == 2
}

/// the outer cycle of two rings sharing one unbroken run of bonds
fn envelope(mol: &ROMol, a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let shared = a.iter().filter(|bond| b.contains(bond)).count();
    if shared == 0 {
        return None;
    }
    let common = cycle_atoms(mol, a)
        .intersection(&cycle_atoms(mol, b))
        .count();
    if common != shared + 1 {
        return None;
    }
    Some(
        a.iter()
            .filter(|bond| !b.contains(bond))
            .chain(b.iter().filter(|bond| !a.contains(bond)))
            .copied()
            .collect(),
    )
}

/// mark the atoms and bonds of aromatic rings. needs ring membership and
/// hydrogen counts to be assigned already
pub(super) fn perceive(mol: &mut ROMol) {
    let ends: Vec<(usize, usize)> =
        mol.bonds.iter().map(|b| (b.begin, b.end)).collect();
    let in_ring: Vec<bool> = mol.bonds.iter().map(|b| b.in_ring).collect();
    let cycles = rings::smallest_cycles(&mol.adjacency, &ends, &in_ring);
    if cycles.is_empty() {
        return;
    }
    let electrons: Vec<Option<u32>> =
        (0..mol.atoms.len()).map(|idx| pi_electrons(mol, idx)).collect();

    let mut aromatic = vec![false; mol.bonds.len()];
    for cycle in &cycles {
        if is_huckel(mol, &electrons, cycle) {
            for &b in cycle {
                aromatic[b] = true;
            }
        }
    }
    for (i, a) in cycles.iter().enumerate() {
        for b in &cycles[i + 1..] {
            let Some(outer) = envelope(mol, a, b) else {
                continue;
            };
            if is_huckel(mol, &electrons, &outer) {
                for &bond in a.iter().chain(b) {
                    aromatic[bond] = true;
                }
            }
        }
    }

    for (bond, aromatic) in mol.bonds.iter_mut().zip(aromatic) {
        if aromatic {
            bond.bond_type = BondType::Aromatic;
            mol.atoms[bond.begin].aromatic = true;
            mol.atoms[bond.end].aromatic = true;
        }
    }
}
