use crate::serde_hex::biguint_hex;
use crate::*;
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use rsa::PublicKeyParts;

/// A voter's verification key: modulus n and public exponent e
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VoterPublicKey {
    #[serde(with = "biguint_hex")]
    pub n: BigUint,

    #[serde(with = "biguint_hex")]
    pub e: BigUint,
}

/// Signatures over the two coordinates of one ciphertext point
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PointSignature {
    #[serde(with = "biguint_hex")]
    pub x: BigUint,

    #[serde(with = "biguint_hex")]
    pub y: BigUint,
}

/// Signatures over every coordinate of a ciphertext (A′, B′).
///
/// Only `a.x` and `b.y` are checked when a ballot is cast. The other two are carried in the
/// ledger for audit.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignaturePair {
    pub a: PointSignature,
    pub b: PointSignature,
}

impl SignaturePair {
    /// Sign all four coordinates of a ciphertext
    pub fn sign<S: Signer + ?Sized>(signer: &S, ciphertext: &Ciphertext) -> Self {
        SignaturePair {
            a: PointSignature {
                x: signer.sign(ciphertext.a.x()),
                y: signer.sign(ciphertext.a.y()),
            },
            b: PointSignature {
                x: signer.sign(ciphertext.b.x()),
                y: signer.sign(ciphertext.b.y()),
            },
        }
    }

    /// Check the signature relations enforced at cast time: A′.x and B′.y.
    pub fn verify(&self, ciphertext: &Ciphertext, public_key: &VoterPublicKey) -> bool {
        verify_signature(ciphertext.a.x(), &self.a.x, public_key)
            && verify_signature(ciphertext.b.y(), &self.b.y, public_key)
    }
}

/// The voter-side signing capability
pub trait Signer {
    fn sign(&self, message: &BigUint) -> BigUint;

    fn public_key(&self) -> VoterPublicKey;
}

/// Textbook verification: signature^e mod n == message
pub fn verify_signature(message: &BigUint, signature: &BigUint, public_key: &VoterPublicKey) -> bool {
    let n = &public_key.n;
    if *n <= BigUint::from(1u32) || message >= n || signature >= n {
        return false;
    }
    signature.modpow(&public_key.e, n) == *message
}

/// Textbook RSA signer with key material generated by the `rsa` crate.
///
/// Messages are signed as raw integers without padding, so a message must be smaller than
/// the modulus.
#[derive(Clone)]
pub struct RsaSigner {
    n: BigUint,
    e: BigUint,
    d: BigUint,
}

impl RsaSigner {
    /// Generate a new key with a modulus of `bits` bits
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R, bits: usize) -> Result<Self, Error> {
        let key = rsa::RSAPrivateKey::new(rng, bits)?;
        Ok(RsaSigner {
            n: BigUint::from_bytes_be(&key.n().to_bytes_be()),
            e: BigUint::from_bytes_be(&key.e().to_bytes_be()),
            d: BigUint::from_bytes_be(&key.d().to_bytes_be()),
        })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.n
    }
}

impl Signer for RsaSigner {
    fn sign(&self, message: &BigUint) -> BigUint {
        message.modpow(&self.d, &self.n)
    }

    fn public_key(&self) -> VoterPublicKey {
        VoterPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_sign_and_verify() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let signer = RsaSigner::generate(&mut rng, 512).unwrap();
        let public_key = signer.public_key();
        assert_eq!(public_key.n.bits(), 512);

        let message = BigUint::from(123_456_789u64);
        let signature = signer.sign(&message);
        assert!(verify_signature(&message, &signature, &public_key));
        assert!(!verify_signature(&(message + 1u32), &signature, &public_key));

        // Out-of-range inputs never verify
        assert!(!verify_signature(&public_key.n, &signature, &public_key));
    }

    #[test]
    fn test_signature_pair_checks_two_coordinates() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let signer = RsaSigner::generate(&mut rng, 512).unwrap();
        let public_key = signer.public_key();

        let point = |x: u32, y: u32| CurvePoint::new(BigUint::from(x), BigUint::from(y));
        let ciphertext = Ciphertext {
            a: point(11, 12),
            b: point(13, 14),
        };
        let signatures = SignaturePair::sign(&signer, &ciphertext);
        assert!(signatures.verify(&ciphertext, &public_key));

        // Changing a checked coordinate breaks verification
        let moved = Ciphertext {
            a: point(99, 12),
            b: point(13, 14),
        };
        assert!(!signatures.verify(&moved, &public_key));

        // A′.y and B′.x are not covered by the cast-time check
        let unchecked = Ciphertext {
            a: point(11, 99),
            b: point(99, 14),
        };
        assert!(signatures.verify(&unchecked, &public_key));

        // A different key does not verify
        let other = RsaSigner::generate(&mut rng, 512).unwrap();
        assert!(!signatures.verify(&ciphertext, &other.public_key()));
    }
}
