//! GG32: the legacy 32-bit rolling fold hash used by hash family `GG32`.

/// Fold `password` and `seed` into the legacy 32-bit challenge response.
///
/// Ported field-for-field from the reference fold: each password byte is
/// mixed into an accumulator via XOR/add/subtract at three byte-shifted
/// positions, then the accumulator is rotated left by the low 5 bits of
/// its own value. Operates byte-by-byte so it is agnostic to password
/// encoding.
#[must_use]
pub fn gg32_hash(password: &[u8], seed: u32) -> u32 {
    let mut x: u32 = 0;
    let mut y: u32 = seed;

    for &byte in password {
        x = (x & 0xffff_ff00) | u32::from(byte);
        y ^= x;
        y = y.wrapping_add(x);
        x <<= 8;
        y ^= x;
        x <<= 8;
        y = y.wrapping_sub(x);
        x <<= 8;
        y ^= x;

        let rot = y & 0x1f;
        y = y.rotate_left(rot);
    }

    y
}
