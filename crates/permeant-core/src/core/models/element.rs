use phf::phf_map;

/// Static chemical data for a single element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// Standard symbol with conventional capitalization (e.g., "Cl").
    pub symbol: &'static str,
    /// Atomic number (number of protons).
    pub atomic_number: u8,
    /// Standard atomic weight in g/mol.
    pub average_mass: f64,
    /// Mass of the most abundant isotope in Da.
    pub monoisotopic_mass: f64,
    /// Allowed neutral valences in ascending order; empty for elements without defaults.
    pub default_valences: &'static [u8],
}

impl Element {
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self.atomic_number,
            5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53
        )
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self.atomic_number, 9 | 17 | 35 | 53)
    }

    pub fn max_default_valence(&self) -> Option<u8> {
        self.default_valences.last().copied()
    }
}

macro_rules! element {
    ($sym:literal, $z:literal, $avg:literal, $mono:literal, [$($v:literal),*]) => {
        Element {
            symbol: $sym,
            atomic_number: $z,
            average_mass: $avg,
            monoisotopic_mass: $mono,
            default_valences: &[$($v),*],
        }
    };
}

pub const WILDCARD: u8 = 0;

static ELEMENTS: phf::Map<u8, Element> = phf_map! {
    0u8 => element!("*", 0, 0.0, 0.0, []),
    1u8 => element!("H", 1, 1.008, 1.007825032, [1]),
    2u8 => element!("He", 2, 4.003, 4.002603254, []),
    3u8 => element!("Li", 3, 6.941, 7.016004548, [1]),
    4u8 => element!("Be", 4, 9.012, 9.012182201, [2]),
    5u8 => element!("B", 5, 10.812, 11.009305406, [3]),
    6u8 => element!("C", 6, 12.011, 12.0, [4]),
    7u8 => element!("N", 7, 14.007, 14.003074004, [3, 5]),
    8u8 => element!("O", 8, 15.999, 15.994914620, [2]),
    9u8 => element!("F", 9, 18.998, 18.998403224, [1]),
    10u8 => element!("Ne", 10, 20.180, 19.992440176, []),
    11u8 => element!("Na", 11, 22.990, 22.989769281, [1]),
    12u8 => element!("Mg", 12, 24.305, 23.985041699, [2]),
    13u8 => element!("Al", 13, 26.982, 26.981538627, [3]),
    14u8 => element!("Si", 14, 28.086, 27.976926532, [4]),
    15u8 => element!("P", 15, 30.974, 30.973761629, [3, 5]),
    16u8 => element!("S", 16, 32.067, 31.972071001, [2, 4, 6]),
    17u8 => element!("Cl", 17, 35.453, 34.968852682, [1]),
    18u8 => element!("Ar", 18, 39.948, 39.962383123, []),
    19u8 => element!("K", 19, 39.098, 38.963706679, [1]),
    20u8 => element!("Ca", 20, 40.078, 39.962590983, [2]),
    22u8 => element!("Ti", 22, 47.867, 47.947946281, []),
    24u8 => element!("Cr", 24, 51.996, 51.940507472, []),
    25u8 => element!("Mn", 25, 54.938, 54.938045141, []),
    26u8 => element!("Fe", 26, 55.845, 55.934937475, []),
    27u8 => element!("Co", 27, 58.933, 58.933195048, []),
    28u8 => element!("Ni", 28, 58.693, 57.935342907, []),
    29u8 => element!("Cu", 29, 63.546, 62.929597474, []),
    30u8 => element!("Zn", 30, 65.39, 63.929142222, []),
    31u8 => element!("Ga", 31, 69.723, 68.925573587, []),
    32u8 => element!("Ge", 32, 72.61, 73.921177767, [4]),
    33u8 => element!("As", 33, 74.922, 74.921596478, [3, 5]),
    34u8 => element!("Se", 34, 78.96, 79.916521271, [2, 4, 6]),
    35u8 => element!("Br", 35, 79.904, 78.918337087, [1]),
    36u8 => element!("Kr", 36, 83.80, 83.911506687, []),
    37u8 => element!("Rb", 37, 85.468, 84.911789738, [1]),
    38u8 => element!("Sr", 38, 87.62, 87.905612124, [2]),
    42u8 => element!("Mo", 42, 95.94, 97.905408169, []),
    44u8 => element!("Ru", 44, 101.07, 101.904349312, []),
    45u8 => element!("Rh", 45, 102.906, 102.905504292, []),
    46u8 => element!("Pd", 46, 106.42, 105.903485715, []),
    47u8 => element!("Ag", 47, 107.868, 106.905096820, []),
    48u8 => element!("Cd", 48, 112.411, 113.903358540, []),
    50u8 => element!("Sn", 50, 118.71, 119.902194676, []),
    51u8 => element!("Sb", 51, 121.76, 120.903815686, [3, 5]),
    52u8 => element!("Te", 52, 127.6, 129.906224399, [2, 4, 6]),
    53u8 => element!("I", 53, 126.904, 126.904472681, [1]),
    54u8 => element!("Xe", 54, 131.29, 131.904153457, []),
    55u8 => element!("Cs", 55, 132.905, 132.905451932, [1]),
    56u8 => element!("Ba", 56, 137.327, 137.905247237, [2]),
    78u8 => element!("Pt", 78, 195.078, 194.964791134, []),
    79u8 => element!("Au", 79, 196.967, 196.966568662, []),
    80u8 => element!("Hg", 80, 200.59, 201.970643011, []),
    81u8 => element!("Tl", 81, 204.383, 204.974427541, []),
    82u8 => element!("Pb", 82, 207.2, 207.976652071, []),
    83u8 => element!("Bi", 83, 208.980, 208.980398734, []),
};

static SYMBOLS: phf::Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Ti" => 22, "Cr" => 24,
    "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30, "Ga" => 31,
    "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36, "Rb" => 37, "Sr" => 38,
    "Mo" => 42, "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "Sn" => 50,
    "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83,
};

/// Looks up element data by atomic number.
pub fn by_number(atomic_number: u8) -> Option<&'static Element> {
    ELEMENTS.get(&atomic_number)
}

/// Looks up element data by its case-sensitive symbol.
pub fn by_symbol(symbol: &str) -> Option<&'static Element> {
    SYMBOLS.get(symbol).copied().and_then(by_number)
}

/// Allowed valences of a possibly charged atom.
///
/// Charged main-group atoms take the valences of their isoelectronic neutral
/// neighbor in the periodic table (N+ behaves like C, O- like F, C- like N).
pub fn allowed_valences(atomic_number: u8, charge: i8) -> &'static [u8] {
    let shifted = if charge != 0 && matches!(atomic_number, 5..=9 | 14..=17 | 33..=35) {
        let z = atomic_number as i16 - charge as i16;
        u8::try_from(z).ok()
    } else {
        Some(atomic_number)
    };
    shifted
        .and_then(by_number)
        .map(|e| e.default_valences)
        .unwrap_or(&[])
}

/// Maps an aromatic (lowercase) SMILES symbol to its atomic number.
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
