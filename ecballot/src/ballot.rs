use crate::*;
use num_bigint::BigUint;

/// ElGamal-style encryption (A′, B′) = (r·P, M_c + r·Q) of a candidate base point
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub a: CurvePoint,
    pub b: CurvePoint,
}

impl Ciphertext {
    /// Encrypt the base point of `candidate` with blinding scalar `r`
    pub fn encrypt(
        params: &ElectionParameters,
        candidate: usize,
        r: &BigUint,
    ) -> Result<Self, Error> {
        let base = params
            .base_points
            .get(candidate)
            .ok_or_else(|| Error::InvalidCandidate(candidate, params.candidates()))?;
        let curve = &params.curve;
        let a = curve.multiply(r, &params.generator)?;
        let b = curve.add(base, &curve.multiply(r, &params.public_point)?)?;
        Ok(Ciphertext { a, b })
    }
}

/// A complete submission: ciphertext, signatures, the voter's public key and the proof that
/// the ciphertext encodes exactly one candidate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Ballot {
    pub ciphertext: Ciphertext,
    pub signatures: SignaturePair,
    pub public_key: VoterPublicKey,
    pub proof: BallotProof,
}

impl Ballot {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        crate::serde_hex::from_bytes(bytes)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        crate::serde_hex::to_cbor(self)
    }
}
