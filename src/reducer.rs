// ➗ Reducer - collapse a number to a single digit, keeping master numbers
//
// Known quirk, kept on purpose for parity with existing reports:
// the loop stops on 11/22/33 even when `preserve_masters` is false.
// A chain such as 29 → 11 therefore returns 11 for a "single digit" request.

/// Master values are never reduced further once reached
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

pub fn is_master(n: u32) -> bool {
    MASTER_NUMBERS.contains(&n)
}

/// Sum of decimal digits
pub fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }
    total
}

/// Reduce `n` by repeated digit-summing.
///
/// With `preserve_masters`, a master input is returned untouched. In both modes
/// the loop runs only while `n > 9` and `n` is not a master value.
pub fn reduce(n: u32, preserve_masters: bool) -> u32 {
    if preserve_masters && is_master(n) {
        return n;
    }

    let mut current = n;
    while current > 9 && !is_master(current) {
        current = digit_sum(current);
    }
    current
}

// ============================================================================
// TESTS
// ============================================================================
