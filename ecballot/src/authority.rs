use crate::*;
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use std::sync::{Mutex, MutexGuard};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElectionStatus {
    /// Accepting ballots
    Voting,

    /// Aggregate recorded, count recovery not yet successful
    Tallying,

    /// Results published
    Opened,
}

/// The authority's audit record of an election.
///
/// Ballot sequences are append-only while voting. `aggregate` and `decrypted` are written
/// once when opening begins and `results` once when count recovery succeeds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ElectionLedger {
    pub status: ElectionStatus,
    pub voter_count: usize,
    pub ciphertexts: Vec<Ciphertext>,
    pub signatures: Vec<SignaturePair>,
    pub public_keys: Vec<VoterPublicKey>,
    pub proofs: Vec<BallotProof>,

    /// Homomorphic sum (ΣA, ΣB) of all accepted ciphertexts
    pub aggregate: Option<Ciphertext>,

    /// ΣB - d·ΣA, the sum of the chosen candidates' base points
    pub decrypted: Option<CurvePoint>,

    /// Per-candidate counts, absent until the election is opened
    pub results: Option<Vec<u64>>,
}

impl ElectionLedger {
    fn new() -> Self {
        ElectionLedger {
            status: ElectionStatus::Voting,
            voter_count: 0,
            ciphertexts: vec![],
            signatures: vec![],
            public_keys: vec![],
            proofs: vec![],
            aggregate: None,
            decrypted: None,
            results: None,
        }
    }

    pub fn is_opened(&self) -> bool {
        self.status == ElectionStatus::Opened
    }
}

/// Holds the election's private scalar, verifies and records ballots, and opens the tally.
pub struct TallyAuthority {
    params: ElectionParameters,
    secret: BigUint,
    ledger: Mutex<ElectionLedger>,

    /// Held for the whole of `open_vote`, so only one opening runs at a time
    opening: Mutex<()>,
}

impl TallyAuthority {
    /// Validate `config`, derive the public parameters and keep the private scalar.
    pub fn setup<R: Rng + CryptoRng + ?Sized>(
        rng: &mut R,
        config: &ElectionConfig,
    ) -> Result<Self, Error> {
        let (params, secret) = ElectionParameters::generate(rng, config)?;
        info!(
            "election set up: {} candidates, {} voters, curve {}",
            config.candidates, config.max_voters, params.curve
        );
        Ok(TallyAuthority {
            params,
            secret,
            ledger: Mutex::new(ElectionLedger::new()),
            opening: Mutex::new(()),
        })
    }

    /// The public parameters voters build ballots against
    pub fn parameters(&self) -> &ElectionParameters {
        &self.params
    }

    pub fn status(&self) -> ElectionStatus {
        self.ledger().status
    }

    // Ledger updates cannot panic midway, so a poisoned ledger is still consistent
    fn ledger(&self) -> MutexGuard<'_, ElectionLedger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Verify a ballot and append it to the ledger.
    ///
    /// Verification runs without holding the ledger lock, so concurrent callers only
    /// serialize on the append.
    pub fn cast_vote(&self, ballot: Ballot) -> Result<(), Error> {
        if self.status() != ElectionStatus::Voting {
            return Err(Error::State("election is no longer accepting votes".to_string()));
        }

        if !ballot.signatures.verify(&ballot.ciphertext, &ballot.public_key) {
            warn!("rejected ballot: signature failed to verify");
            return Err(Error::Signature);
        }

        if let Err(e) = ballot.proof.verify(&self.params, &ballot.ciphertext) {
            warn!("rejected ballot: {}", e);
            return Err(e.into());
        }

        let mut ledger = self.ledger();
        if ledger.status != ElectionStatus::Voting {
            return Err(Error::State("election is no longer accepting votes".to_string()));
        }
        if ledger.voter_count >= self.params.max_voters {
            return Err(Error::State(format!(
                "election already has the maximum of {} ballots",
                self.params.max_voters
            )));
        }

        ledger.ciphertexts.push(ballot.ciphertext);
        ledger.signatures.push(ballot.signatures);
        ledger.public_keys.push(ballot.public_key);
        ledger.proofs.push(ballot.proof);
        ledger.voter_count += 1;
        debug!("accepted ballot {}", ledger.voter_count);

        Ok(())
    }

    /// Close voting, decrypt the aggregate and recover the per-candidate counts.
    ///
    /// If count recovery fails the election stays in `Tallying` with its aggregate recorded,
    /// and calling this again retries the search on that same aggregate. The search runs
    /// without the ledger lock: while it is in progress `cast_vote` fails with a
    /// `StateError` and `public_result` returns the `Tallying` record.
    pub fn open_vote(&self) -> Result<Vec<u64>, Error> {
        let _opening = self.opening.lock().unwrap_or_else(|e| e.into_inner());

        let (decrypted, ballots) = self.close_voting()?;
        let counts = recover_counts(
            &self.params.curve,
            &decrypted,
            &self.params.base_points,
            ballots,
        )?;

        let mut ledger = self.ledger();
        ledger.results = Some(counts.clone());
        ledger.status = ElectionStatus::Opened;
        info!("election opened: {:?}", counts);
        Ok(counts)
    }

    /// Move to `Tallying`, recording the aggregate on first call, and return the decrypted
    /// point with the number of ballots behind it.
    fn close_voting(&self) -> Result<(CurvePoint, u64), Error> {
        let mut ledger = self.ledger();
        match ledger.status {
            ElectionStatus::Opened => {
                return Err(Error::State("election is already opened".to_string()));
            }
            ElectionStatus::Voting => {
                let (aggregate, decrypted) = self.decrypt_aggregate(&ledger.ciphertexts)?;
                ledger.aggregate = Some(aggregate);
                ledger.decrypted = Some(decrypted);
                ledger.status = ElectionStatus::Tallying;
                info!("voting closed with {} ballots", ledger.voter_count);
            }
            ElectionStatus::Tallying => {
                info!("retrying count recovery");
            }
        }

        let decrypted = ledger
            .decrypted
            .clone()
            .ok_or_else(|| Error::State("no decrypted aggregate recorded".to_string()))?;
        Ok((decrypted, ledger.voter_count as u64))
    }

    fn decrypt_aggregate(
        &self,
        ciphertexts: &[Ciphertext],
    ) -> Result<(Ciphertext, CurvePoint), CurveError> {
        let curve = &self.params.curve;
        let mut sum_a = CurvePoint::identity();
        let mut sum_b = CurvePoint::identity();
        for ciphertext in ciphertexts {
            sum_a = curve.add(&sum_a, &ciphertext.a)?;
            sum_b = curve.add(&sum_b, &ciphertext.b)?;
        }
        let blinding = curve.multiply(&self.secret, &sum_a)?;
        let decrypted = curve.subtract(&sum_b, &blinding)?;
        Ok((
            Ciphertext {
                a: sum_a,
                b: sum_b,
            },
            decrypted,
        ))
    }

    /// A snapshot of the full ledger for audit
    pub fn public_result(&self) -> ElectionLedger {
        self.ledger().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tests::small_curve;
    use rand::SeedableRng;
    use rayon::prelude::*;
    use rand_chacha::ChaCha20Rng;

    fn authority(candidates: usize, max_voters: usize, rng: &mut ChaCha20Rng) -> TallyAuthority {
        let config = ElectionConfig::new(candidates, max_voters, small_curve());
        TallyAuthority::setup(rng, &config).unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let mut rng = ChaCha20Rng::seed_from_u64(70);
        let authority = authority(2, 3, &mut rng);
        let voter = Voter::generate(&mut rng, 512).unwrap();
        let params = authority.parameters().clone();

        assert_eq!(authority.status(), ElectionStatus::Voting);
        authority.cast_vote(voter.vote(&mut rng, 1, &params).unwrap()).unwrap();
        authority.cast_vote(voter.vote(&mut rng, 1, &params).unwrap()).unwrap();

        let ledger = authority.public_result();
        assert_eq!(ledger.voter_count, 2);
        assert_eq!(ledger.ciphertexts.len(), 2);
        assert_eq!(ledger.results, None);

        assert_eq!(authority.open_vote().unwrap(), vec![0, 2]);
        assert_eq!(authority.status(), ElectionStatus::Opened);

        // Terminal state
        assert!(matches!(authority.open_vote(), Err(Error::State(_))));
        let late = voter.vote(&mut rng, 0, &params).unwrap();
        assert!(matches!(authority.cast_vote(late), Err(Error::State(_))));
        assert_eq!(authority.public_result().voter_count, 2);
    }

    #[test]
    fn test_empty_election() {
        let mut rng = ChaCha20Rng::seed_from_u64(71);
        let authority = authority(3, 5, &mut rng);
        assert_eq!(authority.open_vote().unwrap(), vec![0, 0, 0]);

        let ledger = authority.public_result();
        assert_eq!(ledger.decrypted, Some(CurvePoint::identity()));
    }

    #[test]
    fn test_capacity() {
        let mut rng = ChaCha20Rng::seed_from_u64(72);
        let authority = authority(2, 2, &mut rng);
        let voter = Voter::generate(&mut rng, 512).unwrap();
        let params = authority.parameters().clone();

        for _ in 0..2 {
            authority.cast_vote(voter.vote(&mut rng, 0, &params).unwrap()).unwrap();
        }
        let extra = voter.vote(&mut rng, 0, &params).unwrap();
        assert!(matches!(authority.cast_vote(extra), Err(Error::State(_))));
        assert_eq!(authority.open_vote().unwrap(), vec![2, 0]);
    }

    #[test]
    fn test_failed_tally_keeps_aggregate() {
        let mut rng = ChaCha20Rng::seed_from_u64(73);
        let authority = authority(2, 4, &mut rng);
        let voter = Voter::generate(&mut rng, 512).unwrap();
        let params = authority.parameters().clone();
        authority.cast_vote(voter.vote(&mut rng, 0, &params).unwrap()).unwrap();

        // Smuggle in a ciphertext worth two votes for candidate 0
        {
            let curve = &params.curve;
            let r = BigUint::from(77u32);
            let double = curve.add(&params.base_points[0], &params.base_points[0]).unwrap();
            let forged = Ciphertext {
                a: curve.multiply(&r, &params.generator).unwrap(),
                b: curve
                    .add(&double, &curve.multiply(&r, &params.public_point).unwrap())
                    .unwrap(),
            };
            let mut ledger = authority.ledger();
            ledger.ciphertexts.push(forged);
            ledger.voter_count += 1;
        }

        assert!(matches!(authority.open_vote(), Err(Error::Tally)));
        let first = authority.public_result();
        assert_eq!(first.status, ElectionStatus::Tallying);
        assert!(first.aggregate.is_some());
        assert_eq!(first.results, None);

        // No more votes, and a retry searches the same aggregate
        let late = voter.vote(&mut rng, 1, &params).unwrap();
        assert!(matches!(authority.cast_vote(late), Err(Error::State(_))));
        assert!(matches!(authority.open_vote(), Err(Error::Tally)));
        assert_eq!(authority.public_result(), first);
    }

    #[test]
    fn test_concurrent_cast() {
        let mut rng = ChaCha20Rng::seed_from_u64(74);
        let authority = authority(3, 6, &mut rng);
        let params = authority.parameters().clone();

        let mut ballots = vec![];
        for i in 0..6 {
            let voter = Voter::generate(&mut rng, 512).unwrap();
            ballots.push(voter.vote(&mut rng, i % 3, &params).unwrap());
        }

        ballots
            .into_par_iter()
            .for_each(|ballot| authority.cast_vote(ballot).unwrap());

        assert_eq!(authority.public_result().voter_count, 6);
        assert_eq!(authority.open_vote().unwrap(), vec![2, 2, 2]);
    }

    #[test]
    fn test_ledger_readable_while_counting() {
        let mut rng = ChaCha20Rng::seed_from_u64(75);
        let authority = authority(2, 3, &mut rng);
        let voter = Voter::generate(&mut rng, 512).unwrap();
        let params = authority.parameters().clone();
        authority.cast_vote(voter.vote(&mut rng, 1, &params).unwrap()).unwrap();

        let (decrypted, ballots) = authority.close_voting().unwrap();
        assert_eq!(ballots, 1);
        assert_eq!(decrypted, params.base_points[1]);

        {
            // Count recovery holds only the opening guard
            let _opening = authority.opening.lock().unwrap();
            let ledger = authority.public_result();
            assert_eq!(ledger.status, ElectionStatus::Tallying);
            assert!(ledger.aggregate.is_some());
            assert_eq!(ledger.results, None);
            assert_eq!(authority.status(), ElectionStatus::Tallying);

            let late = voter.vote(&mut rng, 0, &params).unwrap();
            assert!(matches!(authority.cast_vote(late), Err(Error::State(_))));
        }

        assert_eq!(authority.open_vote().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_open_during_cast() {
        let mut rng = ChaCha20Rng::seed_from_u64(76);
        let authority = authority(3, 12, &mut rng);
        let params = authority.parameters().clone();

        let mut ballots = vec![];
        for i in 0..12 {
            let voter = Voter::generate(&mut rng, 512).unwrap();
            ballots.push(voter.vote(&mut rng, i % 3, &params).unwrap());
        }

        let (opened, cast) = rayon::join(
            || authority.open_vote(),
            || {
                ballots
                    .into_par_iter()
                    .map(|ballot| authority.cast_vote(ballot))
                    .collect::<Vec<_>>()
            },
        );

        // Every ballot is either counted or turned away because voting closed
        assert!(cast
            .iter()
            .all(|result| matches!(result, Ok(()) | Err(Error::State(_)))));
        let accepted = cast.iter().filter(|result| result.is_ok()).count();

        let counts = opened.unwrap();
        let ledger = authority.public_result();
        assert_eq!(ledger.voter_count, accepted);
        assert_eq!(ledger.ciphertexts.len(), accepted);
        assert_eq!(counts.iter().sum::<u64>(), accepted as u64);
        assert_eq!(ledger.results, Some(counts));
    }

    #[test]
    fn test_single_opening() {
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        let authority = authority(2, 3, &mut rng);
        let voter = Voter::generate(&mut rng, 512).unwrap();
        let params = authority.parameters().clone();
        authority.cast_vote(voter.vote(&mut rng, 0, &params).unwrap()).unwrap();

        let (first, second) = rayon::join(|| authority.open_vote(), || authority.open_vote());
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(Error::State(_)))));
        assert_eq!(authority.public_result().results, Some(vec![1, 0]));
    }
}
