//! periodic table lookups needed by the SMILES parser

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al",
    "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe",
    "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr",
    "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm",
    "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W",
    "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf",
    "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// returns the atomic number for an element symbol such as "C" or "Cl"
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .map(|i| i as u8 + 1)
}

pub fn symbol(atomic_num: u8) -> &'static str {
    match atomic_num {
        0 => "*",
        n => SYMBOLS.get(n as usize - 1).copied().unwrap_or("?"),
    }
}

/// the allowed valences for uncharged atoms, lowest first. elements missing
/// here are not valence checked
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],
        5 => &[3],
        6 => &[4],
        7 => &[3, 5],
        8 => &[2],
        9 => &[1],
        14 => &[4],
        15 => &[3, 5],
        16 => &[2, 4, 6],
        17 => &[1],
        33 => &[3, 5],
        34 => &[2, 4, 6],
        35 => &[1],
        52 => &[2, 4, 6],
        53 => &[1, 3, 5],
        _ => &[],
    }
}

/// the elements with a lowercase aromatic form inside brackets
pub fn aromatic_symbol(symbol: &str) -> Option<u8> {
    match symbol {
        "b" => Some(5),
        "c" => Some(6),
        "n" => Some(7),
        "o" => Some(8),
        "p" => Some(15),
        "s" => Some(16),
        "se" => Some(34),
        "as" => Some(33),
        "te" => Some(52),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("Cl"), Some(17));
        assert_eq!(atomic_number("Og"), Some(118));
        assert_eq!(atomic_number("Xx"), None);
        assert_eq!(symbol(8), "O");
        assert_eq!(symbol(0), "*");
    }
}
