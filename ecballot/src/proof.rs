//! Disjunctive (OR) proof that a ciphertext encrypts one of the candidate base points.
//!
//! For the true candidate c the prover commits with a fresh scalar s. Every other branch k
//! is simulated by picking its response w_k and challenge share u_k first and solving for
//! the commitments. The shares are tied together by a challenge derived from the
//! commitments, so exactly one branch can be real.

use crate::arithmetic::random_coprime;
use crate::serde_hex::biguint_hex_vec;
use crate::*;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, Rng};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BallotProof {
    /// Commitments against the generator P
    pub a: Vec<CurvePoint>,

    /// Commitments against the authority public point Q
    pub b: Vec<CurvePoint>,

    /// Challenge shares
    #[serde(with = "biguint_hex_vec")]
    pub u: Vec<BigUint>,

    /// Responses
    #[serde(with = "biguint_hex_vec")]
    pub w: Vec<BigUint>,
}

/// Commitments w·P + u·A′ and w·Q + u·(B′ - M_k) for branch k
fn branch_commitments(
    params: &ElectionParameters,
    ciphertext: &Ciphertext,
    k: usize,
    w: &BigUint,
    u: &BigUint,
) -> Result<(CurvePoint, CurvePoint), CurveError> {
    let curve = &params.curve;
    let a = curve.add(
        &curve.multiply(w, &params.generator)?,
        &curve.multiply(u, &ciphertext.a)?,
    )?;
    let shifted = curve.subtract(&ciphertext.b, &params.base_points[k])?;
    let b = curve.add(
        &curve.multiply(w, &params.public_point)?,
        &curve.multiply(u, &shifted)?,
    )?;
    Ok((a, b))
}

impl BallotProof {
    /// Prove that `ciphertext` was built by `Ciphertext::encrypt(params, candidate, r)`.
    pub fn new<R: Rng + CryptoRng + ?Sized>(
        rng: &mut R,
        params: &ElectionParameters,
        ciphertext: &Ciphertext,
        candidate: usize,
        r: &BigUint,
    ) -> Result<Self, Error> {
        let n = params.candidates();
        if candidate >= n {
            return Err(Error::InvalidCandidate(candidate, n));
        }
        let curve = &params.curve;
        let order = &params.order;

        let s = random_coprime(rng, order);

        let mut a = Vec::with_capacity(n);
        let mut b = Vec::with_capacity(n);
        let mut u = Vec::with_capacity(n);
        let mut w = Vec::with_capacity(n);
        for k in 0..n {
            if k == candidate {
                a.push(curve.multiply(&s, &params.generator)?);
                b.push(curve.multiply(&s, &params.public_point)?);
                u.push(BigUint::zero());
                w.push(BigUint::zero());
            } else {
                let w_k = random_coprime(rng, order);
                let u_k = random_coprime(rng, order);
                let (a_k, b_k) = branch_commitments(params, ciphertext, k, &w_k, &u_k)?;
                a.push(a_k);
                b.push(b_k);
                u.push(u_k);
                w.push(w_k);
            }
        }

        let e = params.challenge_for(&a, &b);

        // Close the real branch
        let simulated: BigUint = u.iter().sum::<BigUint>() % order;
        let u_c = (e + order - simulated) % order;
        let w_c = (s + order - (&u_c * r) % order) % order;
        u[candidate] = u_c;
        w[candidate] = w_c;

        Ok(BallotProof { a, b, u, w })
    }

    /// Verify this proof against a ciphertext and the election's public parameters.
    pub fn verify(
        &self,
        params: &ElectionParameters,
        ciphertext: &Ciphertext,
    ) -> Result<(), ProofError> {
        let n = params.candidates();
        for found in &[self.a.len(), self.b.len(), self.u.len(), self.w.len()] {
            if *found != n {
                return Err(ProofError::Dimension { expected: n, found: *found });
            }
        }

        let order = &params.order;
        for k in 0..n {
            if self.u[k] >= *order || self.w[k] >= *order {
                return Err(ProofError::ScalarOutOfRange(k));
            }
        }

        for k in 0..n {
            let (a_k, b_k) = branch_commitments(params, ciphertext, k, &self.w[k], &self.u[k])?;
            if a_k != self.a[k] || b_k != self.b[k] {
                return Err(ProofError::CommitmentMismatch(k));
            }
        }

        let e = params.challenge_for(&self.a, &self.b);
        let shares: BigUint = self.u.iter().sum::<BigUint>() % order;
        if shares != e {
            return Err(ProofError::ChallengeMismatch);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tests::small_curve_3_mod_4;
    use crate::election::tests::test_parameters;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn prove(
        params: &ElectionParameters,
        candidate: usize,
        rng: &mut ChaCha20Rng,
    ) -> (Ciphertext, BallotProof) {
        let r = random_coprime(rng, &params.order);
        let ciphertext = Ciphertext::encrypt(params, candidate, &r).unwrap();
        let proof = BallotProof::new(rng, params, &ciphertext, candidate, &r).unwrap();
        (ciphertext, proof)
    }

    #[test]
    fn test_completeness() {
        let mut rng = ChaCha20Rng::seed_from_u64(30);
        for &(candidates, max_voters) in &[(1, 5), (2, 9), (3, 5), (4, 8)] {
            let (params, _) = test_parameters(candidates, max_voters, 31);
            for candidate in 0..candidates {
                let (ciphertext, proof) = prove(&params, candidate, &mut rng);
                proof.verify(&params, &ciphertext).unwrap();
            }
        }
    }

    #[test]
    fn test_completeness_sha256() {
        let mut rng = ChaCha20Rng::seed_from_u64(32);
        let config = ElectionConfig::new(3, 4, small_curve_3_mod_4())
            .with_challenge(ChallengeFunction::Sha256);
        let (params, _) = ElectionParameters::generate(&mut rng, &config).unwrap();
        for candidate in 0..3 {
            let (ciphertext, proof) = prove(&params, candidate, &mut rng);
            proof.verify(&params, &ciphertext).unwrap();

            // The same proof does not verify under the other policy
            let mut legacy = params.clone();
            legacy.challenge = ChallengeFunction::Legacy;
            assert_eq!(
                proof.verify(&legacy, &ciphertext),
                Err(ProofError::ChallengeMismatch)
            );
        }
    }

    #[test]
    fn test_proof_for_other_candidate_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(33);
        let (params, _) = test_parameters(3, 5, 34);
        for _ in 0..10 {
            let r = random_coprime(&mut rng, &params.order);
            let ciphertext = Ciphertext::encrypt(&params, 1, &r).unwrap();
            let proof = BallotProof::new(&mut rng, &params, &ciphertext, 0, &r).unwrap();
            assert!(matches!(
                proof.verify(&params, &ciphertext),
                Err(ProofError::CommitmentMismatch(_))
            ));
        }
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(35);
        let (params, _) = test_parameters(3, 5, 36);
        let (ciphertext, proof) = prove(&params, 2, &mut rng);

        // Negating A′ keeps it on the curve
        let mut negated = ciphertext.clone();
        negated.a = params.curve.negate(&ciphertext.a);
        assert!(matches!(
            proof.verify(&params, &negated),
            Err(ProofError::CommitmentMismatch(_))
        ));

        // An off-curve coordinate is a proof failure, not a curve failure
        let mut off_curve = ciphertext.clone();
        off_curve.b = CurvePoint::new(ciphertext.b.x().clone(), ciphertext.b.y() + 1u32);
        assert_eq!(
            proof.verify(&params, &off_curve),
            Err(ProofError::Curve(CurveError::NotOnCurve))
        );
    }

    #[test]
    fn test_malformed_proof_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(37);
        let (params, _) = test_parameters(3, 5, 38);
        let (ciphertext, proof) = prove(&params, 0, &mut rng);

        let mut short = proof.clone();
        short.w.pop();
        assert_eq!(
            short.verify(&params, &ciphertext),
            Err(ProofError::Dimension { expected: 3, found: 2 })
        );

        // Unreduced scalars describe the same commitments but are not accepted
        let mut unreduced = proof.clone();
        unreduced.w[0] += &params.order << 64usize;
        assert_eq!(
            unreduced.verify(&params, &ciphertext),
            Err(ProofError::ScalarOutOfRange(0))
        );
        let mut unreduced = proof.clone();
        unreduced.u[2] += &params.order;
        assert_eq!(
            unreduced.verify(&params, &ciphertext),
            Err(ProofError::ScalarOutOfRange(2))
        );

        // Moving challenge weight between two simulated branches breaks their commitments
        let mut shifted = proof.clone();
        shifted.u[1] = (&shifted.u[1] + 1u32) % &params.order;
        shifted.u[2] = (&shifted.u[2] + &params.order - 1u32) % &params.order;
        assert_eq!(
            shifted.verify(&params, &ciphertext),
            Err(ProofError::CommitmentMismatch(1))
        );

        // Rebuilding a commitment consistently still fails the challenge sum
        let mut forged = proof;
        let w = BigUint::from(5u32);
        let u = BigUint::from(7u32);
        let (a, b) = branch_commitments(&params, &ciphertext, 1, &w, &u).unwrap();
        forged.a[1] = a;
        forged.b[1] = b;
        forged.w[1] = w;
        forged.u[1] = u;
        assert!(forged.verify(&params, &ciphertext).is_err());
    }
}
