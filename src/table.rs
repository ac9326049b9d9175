// 🔤 Character Value Table - Chaldean letter → number correspondence
// Static, process-wide, never mutated. No letter is ever assigned 9.

// ============================================================================
// TABLE
// ============================================================================

/// Letter → value mapping, indexed by `letter - 'A'`.
///
/// | Value | Letters   |
/// |-------|-----------|
/// | 1     | A I J Q Y |
/// | 2     | B K R     |
/// | 3     | C G L S   |
/// | 4     | D M T     |
/// | 5     | E H N X   |
/// | 6     | U V W     |
/// | 7     | O Z       |
/// | 8     | F P       |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterValueTable {
    values: [u32; 26],
}

/// The one table every calculator uses
pub const CHALDEAN: CharacterValueTable = CharacterValueTable {
    values: [
        1, 2, 3, 4, 5, 8, 3, 5, 1, // A B C D E F G H I
        1, 2, 3, 4, 5, 7, 8, 1, 2, // J K L M N O P Q R
        3, 4, 6, 6, 6, 5, 1, 7, // S T U V W X Y Z
    ],
};

const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

impl CharacterValueTable {
    /// Value for the upper-cased character, or 0 when it has no entry
    /// (whitespace, punctuation, digits, non-ASCII letters)
    pub fn value_of(&self, c: char) -> u32 {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            self.values[(upper as u8 - b'A') as usize]
        } else {
            0
        }
    }

    /// True when the character has a non-zero entry in this table
    pub fn has_entry(&self, c: char) -> bool {
        self.value_of(c) > 0
    }
}

impl Default for CharacterValueTable {
    fn default() -> Self {
        CHALDEAN
    }
}

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

/// `CHALDEAN.value_of(c)`
pub fn value_of(c: char) -> u32 {
    CHALDEAN.value_of(c)
}

/// Keep only letters and whitespace, upper-cased. Everything else is dropped.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A, E, I, O, U (Y is treated as a consonant)
pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c.to_ascii_uppercase())
}

// ============================================================================
// TESTS
// ============================================================================
