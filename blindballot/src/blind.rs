use crate::arith;
use crate::*;

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::{One, Zero};

/// The secret blinding material for one session.
///
/// Used exactly twice (once to blind, once to unblind), never serialized,
/// never sent to the authority, and discarded on session reset.
#[derive(Debug, Clone)]
pub enum BlindingFactor {
    /// Multiplicative factor `r`, coprime to the RSA modulus.
    Rsa { r: BigUint },

    /// Exponent `r` in `[1, p-2]`.
    DiscreteLog { r: BigUint },

    /// Diffie-Hellman exchange secret `a`; `shared_key` holds
    /// `K = B^a mod p` once the exchange with the authority has completed.
    DhShared {
        secret: BigUint,
        shared_key: Option<BigUint>,
    },
}

/// A blinding scheme together with the parameters it operates under.
///
/// The variant is selected from whichever parameters the authority
/// publishes: RSA parameters select multiplicative RSA blinding,
/// discrete-log parameters select the hash-based scheme when the
/// authority's public value `y` is present (unblinding divides by `y^r`)
/// and the Diffie-Hellman shared-key scheme when it is not.
#[derive(Debug, Clone)]
pub enum BlindingScheme {
    Rsa { n: BigUint, e: BigUint },
    DiscreteLogHash { p: BigUint, g: BigUint, y: BigUint },
    DiffieHellman { p: BigUint, g: BigUint },
}

impl BlindingScheme {
    pub fn select(params: PublicParameters) -> Self {
        match params {
            PublicParameters::Rsa(rsa) => BlindingScheme::Rsa { n: rsa.n, e: rsa.e },
            PublicParameters::DiscreteLog(dl) => match dl.y {
                Some(y) => BlindingScheme::DiscreteLogHash { p: dl.p, g: dl.g, y },
                None => BlindingScheme::DiffieHellman { p: dl.p, g: dl.g },
            },
        }
    }

    /// The parameters this scheme was selected from.
    pub fn parameters(&self) -> PublicParameters {
        match self {
            BlindingScheme::Rsa { n, e } => PublicParameters::Rsa(RsaParameters {
                n: n.clone(),
                e: e.clone(),
            }),
            BlindingScheme::DiscreteLogHash { p, g, y } => {
                PublicParameters::DiscreteLog(DiscreteLogParameters {
                    p: p.clone(),
                    g: g.clone(),
                    y: Some(y.clone()),
                })
            }
            BlindingScheme::DiffieHellman { p, g } => {
                PublicParameters::DiscreteLog(DiscreteLogParameters {
                    p: p.clone(),
                    g: g.clone(),
                    y: None,
                })
            }
        }
    }

    /// Draw a fresh blinding factor from the OS generator, sized to the
    /// modulus. RSA factors are redrawn until coprime with `n`.
    pub fn generate_factor(&self) -> Result<BlindingFactor, ArithmeticError> {
        let mut csprng = rand::rngs::OsRng {};
        match self {
            BlindingScheme::Rsa { n, .. } => {
                if *n <= BigUint::one() {
                    return Err(ArithmeticError::InvalidModulus);
                }
                let r = loop {
                    let candidate = csprng.gen_biguint_below(n);
                    if !candidate.is_zero() && arith::gcd(&candidate, n).is_one() {
                        break candidate;
                    }
                };
                Ok(BlindingFactor::Rsa { r })
            }
            BlindingScheme::DiscreteLogHash { p, .. } => {
                if *p <= BigUint::from(2u32) {
                    return Err(ArithmeticError::InvalidModulus);
                }
                let r = csprng.gen_biguint_range(&BigUint::one(), &(p - 1u32));
                Ok(BlindingFactor::DiscreteLog { r })
            }
            BlindingScheme::DiffieHellman { p, .. } => {
                if *p <= BigUint::from(2u32) {
                    return Err(ArithmeticError::InvalidModulus);
                }
                let secret = csprng.gen_biguint_range(&BigUint::one(), &(p - 1u32));
                Ok(BlindingFactor::DhShared {
                    secret,
                    shared_key: None,
                })
            }
        }
    }

    /// The voter's public exchange value `A = g^a mod p`, or `None` for
    /// schemes that need no key exchange.
    pub fn exchange_value(&self, factor: &BlindingFactor) -> Result<Option<BigUint>, Error> {
        match (self, factor) {
            (BlindingScheme::DiffieHellman { p, g }, BlindingFactor::DhShared { secret, .. }) => {
                Ok(Some(arith::mod_pow(g, secret, p)?))
            }
            (BlindingScheme::DiffieHellman { .. }, _) => Err(Error::MismatchedBlindingFactor),
            _ => Ok(None),
        }
    }

    /// Store the shared key `K = B^a mod p` derived from the authority's
    /// exchange value.
    pub fn complete_exchange(
        &self,
        factor: &mut BlindingFactor,
        authority_value: &BigUint,
    ) -> Result<(), Error> {
        match (self, factor) {
            (
                BlindingScheme::DiffieHellman { p, .. },
                BlindingFactor::DhShared { secret, shared_key },
            ) => {
                *shared_key = Some(arith::mod_pow(authority_value, secret, p)?);
                Ok(())
            }
            _ => Err(Error::MismatchedBlindingFactor),
        }
    }

    /// Transform the ballot integer so the authority can sign it without
    /// learning its value.
    pub fn blind(&self, message: &BigUint, factor: &BlindingFactor) -> Result<BigUint, Error> {
        match (self, factor) {
            (BlindingScheme::Rsa { n, e }, BlindingFactor::Rsa { r }) => {
                let r_e = arith::mod_pow(r, e, n)?;
                Ok(message * r_e % n)
            }
            (BlindingScheme::DiscreteLogHash { p, g, .. }, BlindingFactor::DiscreteLog { r }) => {
                let hashed = arith::hash_to_range(&message.to_bytes_be(), p)?;
                let g_r = arith::mod_pow(g, r, p)?;
                Ok(hashed * g_r % p)
            }
            (BlindingScheme::DiffieHellman { p, .. }, BlindingFactor::DhShared { shared_key, .. }) => {
                let shared = shared_key.as_ref().ok_or(Error::KeyExchangeIncomplete)?;
                Ok(message * shared % p)
            }
            _ => Err(Error::MismatchedBlindingFactor),
        }
    }

    /// Recover the authority's signature over the original message from its
    /// signature over the blinded one.
    ///
    /// The discrete-log variants invert via Fermat's little theorem
    /// (`x^(p-2) mod p`), which holds only for prime `p`. The
    /// Diffie-Hellman unblinding additionally assumes the authority's
    /// signature is structured so that dividing out the shared-key factor
    /// recovers a valid signature over the ballot; that is a property of
    /// the authority's (unspecified) signing construction, not an algebraic
    /// law, and must be validated against the deployed authority.
    pub fn unblind(
        &self,
        blind_signature: &BigUint,
        factor: &BlindingFactor,
    ) -> Result<BigUint, Error> {
        match (self, factor) {
            (BlindingScheme::Rsa { n, .. }, BlindingFactor::Rsa { r }) => {
                let r_inv = arith::mod_inverse(r, n).ok_or(ArithmeticError::NoInverse)?;
                Ok(blind_signature * r_inv % n)
            }
            (BlindingScheme::DiscreteLogHash { p, y, .. }, BlindingFactor::DiscreteLog { r }) => {
                // y^r is the authority's per-signature contribution.
                let y_r = arith::mod_pow(y, r, p)?;
                let y_r_inv = arith::mod_pow(&y_r, &(p - 2u32), p)?;
                Ok(blind_signature * y_r_inv % p)
            }
            (BlindingScheme::DiffieHellman { p, .. }, BlindingFactor::DhShared { shared_key, .. }) => {
                let shared = shared_key.as_ref().ok_or(Error::KeyExchangeIncomplete)?;
                let shared_inv = arith::mod_pow(shared, &(p - 2u32), p)?;
                Ok(blind_signature * shared_inv % p)
            }
            _ => Err(Error::MismatchedBlindingFactor),
        }
    }

    /// Check an unblinded signature against the original ballot integer.
    ///
    /// Only the RSA scheme is verifiable client-side (`s^e mod n` must
    /// recover `m mod n`); the discrete-log schemes would need the
    /// authority's secret, so `None` is reported for them.
    pub fn verify(
        &self,
        message: &BigUint,
        signature: &BigUint,
    ) -> Result<Option<bool>, ArithmeticError> {
        match self {
            BlindingScheme::Rsa { n, e } => {
                let recovered = arith::mod_pow(signature, e, n)?;
                Ok(Some(recovered == message % n))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Toy RSA parameters: n = 61 * 53, e = 17, d = 2753.
    fn toy_rsa() -> (BlindingScheme, BigUint) {
        let scheme = BlindingScheme::Rsa {
            n: BigUint::from(3233u32),
            e: BigUint::from(17u32),
        };
        (scheme, BigUint::from(2753u32))
    }

    #[test]
    fn rsa_round_trip_recovers_direct_signature() {
        let (scheme, d) = toy_rsa();
        let n = BigUint::from(3233u32);
        let message = BigUint::from(65u32);
        let factor = BlindingFactor::Rsa {
            r: BigUint::from(7u32),
        };

        let blinded = scheme.blind(&message, &factor).unwrap();
        let blind_signature = arith::mod_pow(&blinded, &d, &n).unwrap();
        let signature = scheme.unblind(&blind_signature, &factor).unwrap();

        let direct = arith::mod_pow(&message, &d, &n).unwrap();
        assert_eq!(signature, direct);
        assert_eq!(scheme.verify(&message, &signature).unwrap(), Some(true));
    }

    #[test]
    fn rsa_verify_rejects_tampered_signature() {
        let (scheme, d) = toy_rsa();
        let n = BigUint::from(3233u32);
        let message = BigUint::from(65u32);
        let signature = arith::mod_pow(&message, &d, &n).unwrap();
        let tampered = signature + 1u32;
        assert_eq!(scheme.verify(&message, &tampered).unwrap(), Some(false));
    }

    #[test]
    fn rsa_factor_is_coprime_to_modulus() {
        let (scheme, _) = toy_rsa();
        for _ in 0..16 {
            match scheme.generate_factor().unwrap() {
                BlindingFactor::Rsa { r } => {
                    assert!(!r.is_zero());
                    assert!(arith::gcd(&r, &BigUint::from(3233u32)).is_one());
                }
                _ => panic!("expected an RSA factor"),
            }
        }
    }

    #[test]
    fn discrete_log_hash_round_trip() {
        // p = 9973 (prime), g = 5, authority secret x, y = g^x mod p.
        let p = BigUint::from(9973u32);
        let g = BigUint::from(5u32);
        let x = BigUint::from(2026u32);
        let y = arith::mod_pow(&g, &x, &p).unwrap();
        let scheme = BlindingScheme::DiscreteLogHash {
            p: p.clone(),
            g,
            y,
        };

        let message = arith::encode_to_integer("Ada Lovelace");
        let factor = BlindingFactor::DiscreteLog {
            r: BigUint::from(123u32),
        };

        let blinded = scheme.blind(&message, &factor).unwrap();
        let blind_signature = arith::mod_pow(&blinded, &x, &p).unwrap();
        let signature = scheme.unblind(&blind_signature, &factor).unwrap();

        // Unblinding strips g^(rx), leaving the signature over the hashed
        // message.
        let hashed = arith::hash_to_range(&message.to_bytes_be(), &p).unwrap();
        assert_eq!(signature, arith::mod_pow(&hashed, &x, &p).unwrap());
        assert_eq!(scheme.verify(&message, &signature).unwrap(), None);
    }

    #[test]
    fn diffie_hellman_blind_and_unblind_are_inverse() {
        let p = BigUint::from(9973u32);
        let g = BigUint::from(5u32);
        let scheme = BlindingScheme::DiffieHellman {
            p: p.clone(),
            g: g.clone(),
        };

        let mut factor = scheme.generate_factor().unwrap();

        // Authority side of the exchange.
        let b_secret = BigUint::from(1234u32);
        let b_public = arith::mod_pow(&g, &b_secret, &p).unwrap();
        let a_public = scheme.exchange_value(&factor).unwrap().unwrap();
        scheme.complete_exchange(&mut factor, &b_public).unwrap();

        // Both sides derive the same shared key.
        let authority_key = arith::mod_pow(&a_public, &b_secret, &p).unwrap();
        match &factor {
            BlindingFactor::DhShared { shared_key, .. } => {
                assert_eq!(shared_key.as_ref(), Some(&authority_key));
            }
            _ => panic!("expected a DH factor"),
        }

        // With no signing exponent applied, unblind(blind(m)) == m mod p.
        let message = BigUint::from(65u32);
        let blinded = scheme.blind(&message, &factor).unwrap();
        let recovered = scheme.unblind(&blinded, &factor).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn diffie_hellman_blind_requires_completed_exchange() {
        let scheme = BlindingScheme::DiffieHellman {
            p: BigUint::from(9973u32),
            g: BigUint::from(5u32),
        };
        let factor = scheme.generate_factor().unwrap();
        match scheme.blind(&BigUint::from(65u32), &factor) {
            Err(Error::KeyExchangeIncomplete) => {}
            other => panic!("expected KeyExchangeIncomplete, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn factor_from_another_scheme_is_rejected() {
        let (scheme, _) = toy_rsa();
        let factor = BlindingFactor::DiscreteLog {
            r: BigUint::from(7u32),
        };
        match scheme.blind(&BigUint::from(65u32), &factor) {
            Err(Error::MismatchedBlindingFactor) => {}
            other => panic!(
                "expected MismatchedBlindingFactor, got {:?}",
                other.map(|_| ())
            ),
        }
    }

    #[test]
    fn scheme_selection_follows_published_parameters() {
        let rsa = PublicParameters::Rsa(RsaParameters {
            n: BigUint::from(3233u32),
            e: BigUint::from(17u32),
        });
        assert!(matches!(
            BlindingScheme::select(rsa),
            BlindingScheme::Rsa { .. }
        ));

        let with_y = PublicParameters::DiscreteLog(DiscreteLogParameters {
            p: BigUint::from(9973u32),
            g: BigUint::from(5u32),
            y: Some(BigUint::from(11u32)),
        });
        assert!(matches!(
            BlindingScheme::select(with_y),
            BlindingScheme::DiscreteLogHash { .. }
        ));

        let without_y = PublicParameters::DiscreteLog(DiscreteLogParameters {
            p: BigUint::from(9973u32),
            g: BigUint::from(5u32),
            y: None,
        });
        assert!(matches!(
            BlindingScheme::select(without_y),
            BlindingScheme::DiffieHellman { .. }
        ));
    }
}
