use sha1::{Digest, Sha1};
use tracing::warn;

/// Splits the payload into fixed size slices (the last one may be shorter)
/// and returns one lowercase hex SHA-1 digest per slice. An empty payload
/// yields no slices and therefore no digests.
pub fn compute_slice_digests(payload: &[u8], slice_size: usize) -> Vec<String> {
    payload
        .chunks(slice_size)
        .map(|slice| {
            let mut hasher = Sha1::new();
            hasher.update(slice);
            hex::encode(hasher.finalize())
        })
        .collect()
}

/// Recomputes the slice digests over `payload` and compares them against the
/// stored list. A mismatch is a detection signal, not an error, so the
/// outcome is a plain bool; the diverging slice index is logged.
pub fn validate(payload: &[u8], expected_digests: &[String], slice_size: usize) -> bool {
    let computed = compute_slice_digests(payload, slice_size);
    if computed.len() != expected_digests.len() {
        warn!(
            expected = expected_digests.len(),
            computed = computed.len(),
            "slice digest count mismatch"
        );
        return false;
    }
    for (index, (computed_digest, expected_digest)) in
        computed.iter().zip(expected_digests).enumerate()
    {
        if computed_digest != expected_digest {
            warn!(slice = index, "slice digest mismatch");
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLICE_SIZE: usize = 8 * 1024;

    #[test]
    fn digests_round_trip() {
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let digests = compute_slice_digests(&payload, SLICE_SIZE);
        assert!(validate(&payload, &digests, SLICE_SIZE));
    }

    #[test]
    fn single_byte_mutation_is_detected() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 13) as u8).collect();
        let digests = compute_slice_digests(&payload, SLICE_SIZE);
        for position in [0, SLICE_SIZE - 1, SLICE_SIZE, payload.len() - 1] {
            let mut mutated = payload.clone();
            mutated[position] ^= 0x01;
            assert!(
                !validate(&mutated, &digests, SLICE_SIZE),
                "mutation at byte {position} went undetected"
            );
        }
    }

    #[test]
    fn digest_count_follows_slice_boundaries() {
        assert!(compute_slice_digests(&[], SLICE_SIZE).is_empty());
        assert_eq!(compute_slice_digests(&vec![7u8; SLICE_SIZE], SLICE_SIZE).len(), 1);
        let digests = compute_slice_digests(&vec![7u8; SLICE_SIZE + 1], SLICE_SIZE);
        assert_eq!(digests.len(), 2);
        // the trailing slice covers exactly the one overflow byte
        assert_eq!(digests[1], compute_slice_digests(&[7u8], SLICE_SIZE)[0]);
    }

    #[test]
    fn digests_are_fixed_width_lowercase_hex() {
        let digests = compute_slice_digests(b"some payload", SLICE_SIZE);
        assert_eq!(digests[0].len(), 40);
        assert!(digests[0].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn shorter_digest_list_is_rejected() {
        let payload = vec![1u8; 2 * SLICE_SIZE];
        let mut digests = compute_slice_digests(&payload, SLICE_SIZE);
        digests.pop();
        assert!(!validate(&payload, &digests, SLICE_SIZE));
    }
}
