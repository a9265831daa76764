use crate::*;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Lookup of live authorities and voters by identifier
pub trait Store {
    /// Get an authority of unknown existence
    fn get_authority(&self, id: Uuid) -> Option<Arc<TallyAuthority>>;

    /// Get a voter of unknown existence
    fn get_voter(&self, id: Uuid) -> Option<Arc<Voter>>;

    fn authority(&self, id: Uuid) -> Result<Arc<TallyAuthority>, Error> {
        self.get_authority(id).ok_or(Error::AuthorityNotFound(id))
    }

    fn voter(&self, id: Uuid) -> Result<Arc<Voter>, Error> {
        self.get_voter(id).ok_or(Error::VoterNotFound(id))
    }

    fn authority_exists(&self, id: Uuid) -> bool {
        self.get_authority(id).is_some()
    }

    fn voter_exists(&self, id: Uuid) -> bool {
        self.get_voter(id).is_some()
    }
}

/// An in-memory registry of authorities and voters.
///
/// Entries live as long as the store. Each operation maps onto one authority or voter
/// operation and surfaces its error unchanged.
pub struct MemStore {
    authorities: RwLock<HashMap<Uuid, Arc<TallyAuthority>>>,
    voters: RwLock<HashMap<Uuid, Arc<Voter>>>,
    key_bits: usize,
}

impl Default for MemStore {
    fn default() -> Self {
        MemStore::new(MemStore::DEFAULT_KEY_BITS)
    }
}

impl MemStore {
    pub const DEFAULT_KEY_BITS: usize = 1024;

    /// A store whose voters get RSA keys of `key_bits` bits
    pub fn new(key_bits: usize) -> Self {
        MemStore {
            authorities: RwLock::new(HashMap::new()),
            voters: RwLock::new(HashMap::new()),
            key_bits,
        }
    }

    pub fn create_authority(&self, config: &ElectionConfig) -> Result<Uuid, Error> {
        let authority = TallyAuthority::setup(&mut rand::thread_rng(), config)?;
        let id = Uuid::new_v4();
        self.authorities
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(authority));
        debug!("created authority {}", id);
        Ok(id)
    }

    pub fn create_voter(&self) -> Result<Uuid, Error> {
        let voter = Voter::generate(&mut rand::thread_rng(), self.key_bits)?;
        let id = Uuid::new_v4();
        self.voters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::new(voter));
        debug!("created voter {}", id);
        Ok(id)
    }

    pub fn election_parameters(&self, authority_id: Uuid) -> Result<ElectionParameters, Error> {
        Ok(self.authority(authority_id)?.parameters().clone())
    }

    /// Build a ballot for `candidate` as `voter_id` and cast it with `authority_id`
    pub fn submit_vote(
        &self,
        voter_id: Uuid,
        authority_id: Uuid,
        candidate: usize,
    ) -> Result<(), Error> {
        let voter = self.voter(voter_id)?;
        let authority = self.authority(authority_id)?;
        let ballot = voter.vote(&mut rand::thread_rng(), candidate, authority.parameters())?;
        authority.cast_vote(ballot)
    }

    /// Cast a ballot built elsewhere
    pub fn submit_ballot(&self, authority_id: Uuid, ballot: Ballot) -> Result<(), Error> {
        self.authority(authority_id)?.cast_vote(ballot)
    }

    pub fn open_vote(&self, authority_id: Uuid) -> Result<Vec<u64>, Error> {
        self.authority(authority_id)?.open_vote()
    }

    pub fn public_result(&self, authority_id: Uuid) -> Result<ElectionLedger, Error> {
        Ok(self.authority(authority_id)?.public_result())
    }
}

impl Store for MemStore {
    fn get_authority(&self, id: Uuid) -> Option<Arc<TallyAuthority>> {
        let authorities = self.authorities.read().unwrap_or_else(|e| e.into_inner());
        authorities.get(&id).cloned()
    }

    fn get_voter(&self, id: Uuid) -> Option<Arc<Voter>> {
        let voters = self.voters.read().unwrap_or_else(|e| e.into_inner());
        voters.get(&id).cloned()
    }
}
