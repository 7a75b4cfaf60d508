use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Constant-time byte comparison for secrets, e.g. the `/metrics` bearer
/// token. Inputs are hashed to fixed-length digests first so timing leaks
/// neither content nor length.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    ha.ct_eq(&hb).into()
}
