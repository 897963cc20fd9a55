use sha2::{Digest, Sha256};
use uhsledger_primitives::{Attestation, Hash};

/// A sentinel's signing identity. The rangeproof/signature math a production
/// sentinel runs belongs to the external "sentinel transaction validators"
/// collaborator named out of scope in `spec.md` §1; here `sign` stands in
/// with a keyed hash (`SHA256(secret || msg)`) so the attestation boundary —
/// threshold, distinct-signer-set, id stability — can be built and tested
/// without pulling in a full asymmetric-crypto stack for a component this
/// core explicitly doesn't verify (the locking shard only counts distinct
/// signer keys, see `uhsledger_locking_shard::LockingShard::check_and_lock_tx`).
#[derive(Clone, Debug)]
pub struct SentinelKey {
    public: Hash,
    secret: [u8; 32],
}

impl SentinelKey {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let public = Hash::digest(&secret);
        SentinelKey { public, secret }
    }

    pub fn public(&self) -> Hash {
        self.public
    }

    /// Signs `ctx_id`, producing an [`Attestation`] under this key.
    pub fn attest(&self, ctx_id: Hash) -> Attestation {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(ctx_id.as_bytes());
        let sig = hasher.finalize().to_vec();
        Attestation { signer: self.public, signature: sig }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attest_is_deterministic_per_key() {
        let key = SentinelKey::from_secret([7u8; 32]);
        let ctx_id = Hash::digest(b"ctx");
        let a = key.attest(ctx_id);
        let b = key.attest(ctx_id);
        assert_eq!(a, b);
    }

    #[test]
    fn different_keys_produce_different_signatures() {
        let ctx_id = Hash::digest(b"ctx");
        let a = SentinelKey::from_secret([1u8; 32]).attest(ctx_id);
        let b = SentinelKey::from_secret([2u8; 32]).attest(ctx_id);
        assert_ne!(a.signature, b.signature);
        assert_ne!(a.signer, b.signer);
    }
}
