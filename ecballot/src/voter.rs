use crate::arithmetic::random_coprime;
use crate::*;
use rand::{CryptoRng, Rng};

/// A voter identity: a signing key and nothing else.
///
/// Voters share no state with the authority. Every ballot is built from the published
/// `ElectionParameters` and locally sampled randomness.
pub struct Voter<S = RsaSigner> {
    signer: S,
}

impl Voter<RsaSigner> {
    /// Create a voter with a fresh RSA key of `bits` bits
    pub fn generate<R: Rng + CryptoRng>(rng: &mut R, bits: usize) -> Result<Self, Error> {
        Ok(Voter::new(RsaSigner::generate(rng, bits)?))
    }
}

impl<S: Signer> Voter<S> {
    pub fn new(signer: S) -> Self {
        Voter { signer }
    }

    pub fn public_key(&self) -> VoterPublicKey {
        self.signer.public_key()
    }

    /// Encrypt, sign and prove a vote for `candidate`.
    pub fn vote<R: Rng + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        candidate: usize,
        params: &ElectionParameters,
    ) -> Result<Ballot, Error> {
        let candidates = params.candidates();
        if candidate >= candidates {
            return Err(Error::InvalidCandidate(candidate, candidates));
        }

        let public_key = self.signer.public_key();
        if public_key.n <= *params.curve.p() {
            return Err(Error::Configuration(format!(
                "voter key modulus ({} bits) must exceed the curve prime ({} bits)",
                public_key.n.bits(),
                params.curve.p().bits()
            )));
        }

        let r = random_coprime(rng, &params.order);
        let ciphertext = Ciphertext::encrypt(params, candidate, &r)?;
        let signatures = SignaturePair::sign(&self.signer, &ciphertext);
        let proof = BallotProof::new(rng, params, &ciphertext, candidate, &r)?;

        Ok(Ballot {
            ciphertext,
            signatures,
            public_key,
            proof,
        })
    }
}
