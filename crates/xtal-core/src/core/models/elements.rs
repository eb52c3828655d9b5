use phf::{Map, phf_map};

pub const HYDROGEN: u8 = 1;
pub const CARBON: u8 = 6;
pub const NITROGEN: u8 = 7;
pub const OXYGEN: u8 = 8;
pub const FLUORINE: u8 = 9;
pub const PHOSPHORUS: u8 = 15;
pub const SULFUR: u8 = 16;
pub const CHLORINE: u8 = 17;
pub const BROMINE: u8 = 35;
pub const IODINE: u8 = 53;
pub const ASTATINE: u8 = 85;

/// Static per-element data used by the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub number: u8,
    pub symbol: &'static str,
    /// Covalent radius in Angstroms, the default bond-distance criterion of an atom.
    pub covalent_radius: f64,
}

/// Element table indexed by atomic number; index 0 is the dummy element `X`.
pub static ELEMENTS: [ElementData; 87] = [
    ElementData { number: 0, symbol: "X", covalent_radius: 0.0 },
    ElementData { number: 1, symbol: "H", covalent_radius: 0.31 },
    ElementData { number: 2, symbol: "He", covalent_radius: 0.28 },
    ElementData { number: 3, symbol: "Li", covalent_radius: 1.28 },
    ElementData { number: 4, symbol: "Be", covalent_radius: 0.96 },
    ElementData { number: 5, symbol: "B", covalent_radius: 0.84 },
    ElementData { number: 6, symbol: "C", covalent_radius: 0.77 },
    ElementData { number: 7, symbol: "N", covalent_radius: 0.71 },
    ElementData { number: 8, symbol: "O", covalent_radius: 0.66 },
    ElementData { number: 9, symbol: "F", covalent_radius: 0.57 },
    ElementData { number: 10, symbol: "Ne", covalent_radius: 0.58 },
    ElementData { number: 11, symbol: "Na", covalent_radius: 1.66 },
    ElementData { number: 12, symbol: "Mg", covalent_radius: 1.41 },
    ElementData { number: 13, symbol: "Al", covalent_radius: 1.21 },
    ElementData { number: 14, symbol: "Si", covalent_radius: 1.11 },
    ElementData { number: 15, symbol: "P", covalent_radius: 1.07 },
    ElementData { number: 16, symbol: "S", covalent_radius: 1.05 },
    ElementData { number: 17, symbol: "Cl", covalent_radius: 1.02 },
    ElementData { number: 18, symbol: "Ar", covalent_radius: 1.06 },
    ElementData { number: 19, symbol: "K", covalent_radius: 2.03 },
    ElementData { number: 20, symbol: "Ca", covalent_radius: 1.76 },
    ElementData { number: 21, symbol: "Sc", covalent_radius: 1.70 },
    ElementData { number: 22, symbol: "Ti", covalent_radius: 1.60 },
    ElementData { number: 23, symbol: "V", covalent_radius: 1.53 },
    ElementData { number: 24, symbol: "Cr", covalent_radius: 1.39 },
    ElementData { number: 25, symbol: "Mn", covalent_radius: 1.39 },
    ElementData { number: 26, symbol: "Fe", covalent_radius: 1.32 },
    ElementData { number: 27, symbol: "Co", covalent_radius: 1.26 },
    ElementData { number: 28, symbol: "Ni", covalent_radius: 1.24 },
    ElementData { number: 29, symbol: "Cu", covalent_radius: 1.32 },
    ElementData { number: 30, symbol: "Zn", covalent_radius: 1.22 },
    ElementData { number: 31, symbol: "Ga", covalent_radius: 1.22 },
    ElementData { number: 32, symbol: "Ge", covalent_radius: 1.20 },
    ElementData { number: 33, symbol: "As", covalent_radius: 1.19 },
    ElementData { number: 34, symbol: "Se", covalent_radius: 1.20 },
    ElementData { number: 35, symbol: "Br", covalent_radius: 1.20 },
    ElementData { number: 36, symbol: "Kr", covalent_radius: 1.16 },
    ElementData { number: 37, symbol: "Rb", covalent_radius: 2.20 },
    ElementData { number: 38, symbol: "Sr", covalent_radius: 1.95 },
    ElementData { number: 39, symbol: "Y", covalent_radius: 1.90 },
    ElementData { number: 40, symbol: "Zr", covalent_radius: 1.75 },
    ElementData { number: 41, symbol: "Nb", covalent_radius: 1.64 },
    ElementData { number: 42, symbol: "Mo", covalent_radius: 1.54 },
    ElementData { number: 43, symbol: "Tc", covalent_radius: 1.47 },
    ElementData { number: 44, symbol: "Ru", covalent_radius: 1.46 },
    ElementData { number: 45, symbol: "Rh", covalent_radius: 1.42 },
    ElementData { number: 46, symbol: "Pd", covalent_radius: 1.39 },
    ElementData { number: 47, symbol: "Ag", covalent_radius: 1.45 },
    ElementData { number: 48, symbol: "Cd", covalent_radius: 1.44 },
    ElementData { number: 49, symbol: "In", covalent_radius: 1.42 },
    ElementData { number: 50, symbol: "Sn", covalent_radius: 1.39 },
    ElementData { number: 51, symbol: "Sb", covalent_radius: 1.39 },
    ElementData { number: 52, symbol: "Te", covalent_radius: 1.38 },
    ElementData { number: 53, symbol: "I", covalent_radius: 1.39 },
    ElementData { number: 54, symbol: "Xe", covalent_radius: 1.40 },
    ElementData { number: 55, symbol: "Cs", covalent_radius: 2.44 },
    ElementData { number: 56, symbol: "Ba", covalent_radius: 2.15 },
    ElementData { number: 57, symbol: "La", covalent_radius: 2.07 },
    ElementData { number: 58, symbol: "Ce", covalent_radius: 2.04 },
    ElementData { number: 59, symbol: "Pr", covalent_radius: 2.03 },
    ElementData { number: 60, symbol: "Nd", covalent_radius: 2.01 },
    ElementData { number: 61, symbol: "Pm", covalent_radius: 1.99 },
    ElementData { number: 62, symbol: "Sm", covalent_radius: 1.98 },
    ElementData { number: 63, symbol: "Eu", covalent_radius: 1.98 },
    ElementData { number: 64, symbol: "Gd", covalent_radius: 1.96 },
    ElementData { number: 65, symbol: "Tb", covalent_radius: 1.94 },
    ElementData { number: 66, symbol: "Dy", covalent_radius: 1.92 },
    ElementData { number: 67, symbol: "Ho", covalent_radius: 1.92 },
    ElementData { number: 68, symbol: "Er", covalent_radius: 1.89 },
    ElementData { number: 69, symbol: "Tm", covalent_radius: 1.90 },
    ElementData { number: 70, symbol: "Yb", covalent_radius: 1.87 },
    ElementData { number: 71, symbol: "Lu", covalent_radius: 1.87 },
    ElementData { number: 72, symbol: "Hf", covalent_radius: 1.75 },
    ElementData { number: 73, symbol: "Ta", covalent_radius: 1.70 },
    ElementData { number: 74, symbol: "W", covalent_radius: 1.62 },
    ElementData { number: 75, symbol: "Re", covalent_radius: 1.51 },
    ElementData { number: 76, symbol: "Os", covalent_radius: 1.44 },
    ElementData { number: 77, symbol: "Ir", covalent_radius: 1.41 },
    ElementData { number: 78, symbol: "Pt", covalent_radius: 1.36 },
    ElementData { number: 79, symbol: "Au", covalent_radius: 1.36 },
    ElementData { number: 80, symbol: "Hg", covalent_radius: 1.32 },
    ElementData { number: 81, symbol: "Tl", covalent_radius: 1.45 },
    ElementData { number: 82, symbol: "Pb", covalent_radius: 1.46 },
    ElementData { number: 83, symbol: "Bi", covalent_radius: 1.48 },
    ElementData { number: 84, symbol: "Po", covalent_radius: 1.40 },
    ElementData { number: 85, symbol: "At", covalent_radius: 1.50 },
    ElementData { number: 86, symbol: "Rn", covalent_radius: 1.50 },
];

static SYMBOL_TO_NUMBER: Map<&'static str, u8> = phf_map! {
    "X" => 0,
    "H" => 1,
    "HE" => 2,
    "LI" => 3,
    "BE" => 4,
    "B" => 5,
    "C" => 6,
    "N" => 7,
    "O" => 8,
    "F" => 9,
    "NE" => 10,
    "NA" => 11,
    "MG" => 12,
    "AL" => 13,
    "SI" => 14,
    "P" => 15,
    "S" => 16,
    "CL" => 17,
    "AR" => 18,
    "K" => 19,
    "CA" => 20,
    "SC" => 21,
    "TI" => 22,
    "V" => 23,
    "CR" => 24,
    "MN" => 25,
    "FE" => 26,
    "CO" => 27,
    "NI" => 28,
    "CU" => 29,
    "ZN" => 30,
    "GA" => 31,
    "GE" => 32,
    "AS" => 33,
    "SE" => 34,
    "BR" => 35,
    "KR" => 36,
    "RB" => 37,
    "SR" => 38,
    "Y" => 39,
    "ZR" => 40,
    "NB" => 41,
    "MO" => 42,
    "TC" => 43,
    "RU" => 44,
    "RH" => 45,
    "PD" => 46,
    "AG" => 47,
    "CD" => 48,
    "IN" => 49,
    "SN" => 50,
    "SB" => 51,
    "TE" => 52,
    "I" => 53,
    "XE" => 54,
    "CS" => 55,
    "BA" => 56,
    "LA" => 57,
    "CE" => 58,
    "PR" => 59,
    "ND" => 60,
    "PM" => 61,
    "SM" => 62,
    "EU" => 63,
    "GD" => 64,
    "TB" => 65,
    "DY" => 66,
    "HO" => 67,
    "ER" => 68,
    "TM" => 69,
    "YB" => 70,
    "LU" => 71,
    "HF" => 72,
    "TA" => 73,
    "W" => 74,
    "RE" => 75,
    "OS" => 76,
    "IR" => 77,
    "PT" => 78,
    "AU" => 79,
    "HG" => 80,
    "TL" => 81,
    "PB" => 82,
    "BI" => 83,
    "PO" => 84,
    "AT" => 85,
    "RN" => 86,
};

/// Looks up the element data for an atomic number.
pub fn element(number: u8) -> Option<&'static ElementData> {
    ELEMENTS.get(number as usize)
}

/// Resolves an element symbol (case-insensitive) to its atomic number.
pub fn atomic_number(symbol: &str) -> Option<u8> {
    SYMBOL_TO_NUMBER
        .get(symbol.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Returns the element symbol, or `"X"` for unknown atomic numbers.
pub fn symbol(number: u8) -> &'static str {
    element(number).map_or("X", |e| e.symbol)
}

/// Returns the covalent radius, or `0.0` for unknown atomic numbers.
pub fn covalent_radius(number: u8) -> f64 {
    element(number).map_or(0.0, |e| e.covalent_radius)
}

pub fn is_halogen(number: u8) -> bool {
    matches!(number, FLUORINE | CHLORINE | BROMINE | IODINE | ASTATINE)
}
