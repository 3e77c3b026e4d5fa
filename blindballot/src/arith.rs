use crate::ArithmeticError;
use digest::Digest;
use num_bigint_dig::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use sha2::Sha256;

/// Modular exponentiation by repeated squaring.
///
/// Runs in time proportional to the bit length of `exponent`, not its
/// numeric value. An exponent of zero yields `1 mod modulus`.
pub fn mod_pow(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint, ArithmeticError> {
    if *modulus <= BigUint::one() {
        return Err(ArithmeticError::InvalidModulus);
    }

    let mut result = BigUint::one();
    let mut base = base % modulus;
    let mut exponent = exponent.clone();

    while !exponent.is_zero() {
        if exponent.is_odd() {
            result = result * &base % modulus;
        }
        exponent = exponent >> 1;
        base = &base * &base % modulus;
    }

    Ok(result)
}

/// Modular inverse via the extended Euclidean algorithm.
///
/// Returns `None` when no inverse exists (`gcd(a, modulus) != 1`, or a
/// modulus below two). A missing inverse is a legitimate outcome that the
/// caller must handle, not an error. The result is normalized into
/// `[0, modulus)`.
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Option<BigUint> {
    if *modulus < BigUint::from(2u32) {
        return None;
    }

    let mut old_r = BigInt::from(a % modulus);
    let mut r = BigInt::from(modulus.clone());
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }

    let modulus = BigInt::from(modulus.clone());
    ((old_s % &modulus + &modulus) % &modulus).to_biguint()
}

/// Greatest common divisor, standard Euclidean algorithm.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let remainder = &a % &b;
        a = std::mem::replace(&mut b, remainder);
    }
    a
}

/// Canonical integer encoding of a ballot text: the UTF-8 bytes read as a
/// base-256 big-endian integer. Deterministic; distinct texts map to
/// distinct integers as long as no candidate label starts with a NUL byte.
pub fn encode_to_integer(text: &str) -> BigUint {
    BigUint::from_bytes_be(text.as_bytes())
}

/// SHA-256 digest of `message` reduced into `[1, upper - 1]`.
///
/// The modulo reduction is biased for uppers that do not divide 2^256
/// evenly. With a 256-bit digest and the small group orders this scheme
/// targets the bias is an accepted limitation of the protocol, left as-is
/// rather than rejection-sampled away.
pub fn hash_to_range(message: &[u8], upper: &BigUint) -> Result<BigUint, ArithmeticError> {
    if *upper < BigUint::from(2u32) {
        return Err(ArithmeticError::InvalidModulus);
    }

    let digest = Sha256::digest(message);
    let value = BigUint::from_bytes_be(&digest[..]);
    Ok(value % (upper - 1u32) + 1u32)
}
