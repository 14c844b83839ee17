use rand::Rng;
use sw_storage::MutationKind;

/// One transformation applied by [`mutate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub position: u32,
    pub original: Option<u32>,
    pub mutated: Option<u32>,
}

fn word_at(blob: &[u8], word_index: usize) -> u32 {
    let bytes = &blob[word_index * 4..word_index * 4 + 4];
    u32::from_be_bytes(bytes.try_into().unwrap())
}

fn push_word(out: &mut Vec<u8>, word: u32) {
    out.extend_from_slice(&word.to_be_bytes());
}

/// Walk `blob` one word at a time, applying one of six probabilistic
/// transformations with probability `p` per word. Returns the
/// mutated blob and the ordered list of transformations applied.
pub fn mutate(blob: &[u8], p: f64, rng: &mut impl Rng) -> (Vec<u8>, Vec<MutationRecord>) {
    debug_assert_eq!(blob.len() % 4, 0, "code blobs are always a multiple of 4 bytes");
    let word_count = blob.len() / 4;
    let mut out = Vec::with_capacity(blob.len());
    let mut records = Vec::new();

    let mut index = 0usize;
    while index < word_count {
        let word = word_at(blob, index);
        if p <= 0.0 || !rng.gen_bool(p.clamp(0.0, 1.0)) {
            push_word(&mut out, word);
            index += 1;
            continue;
        }

        match rng.gen_range(0..6) {
            0 => {
                let mutated = rng.gen::<u32>();
                push_word(&mut out, mutated);
                records.push(MutationRecord {
                    kind: MutationKind::Replace,
                    position: index as u32,
                    original: Some(word),
                    mutated: Some(mutated),
                });
                index += 1;
            }
            1 => {
                let mut bytes = word.to_be_bytes();
                let overwritten = rng.gen_range(1..=4);
                for _ in 0..overwritten {
                    let lane = rng.gen_range(0..4);
                    bytes[lane] = rng.gen();
                }
                let mutated = u32::from_be_bytes(bytes);
                push_word(&mut out, mutated);
                records.push(MutationRecord {
                    kind: MutationKind::Partial,
                    position: index as u32,
                    original: Some(word),
                    mutated: Some(mutated),
                });
                index += 1;
            }
            2 => {
                let source = word.to_be_bytes();
                let mut bytes = [0u8; 4];
                for byte in bytes.iter_mut() {
                    *byte = source[rng.gen_range(0..4)];
                }
                let mutated = u32::from_be_bytes(bytes);
                push_word(&mut out, mutated);
                records.push(MutationRecord {
                    kind: MutationKind::Permute,
                    position: index as u32,
                    original: Some(word),
                    mutated: Some(mutated),
                });
                index += 1;
            }
            3 => {
                let inserted = rng.gen::<u32>();
                push_word(&mut out, inserted);
                records.push(MutationRecord {
                    kind: MutationKind::Insert,
                    position: index as u32,
                    original: None,
                    mutated: Some(inserted),
                });
                // do not consume the current word
            }
            4 => {
                let duplicated = if index == 0 { rng.gen::<u32>() } else { word_at(blob, index - 1) };
                push_word(&mut out, duplicated);
                records.push(MutationRecord {
                    kind: MutationKind::Duplicate,
                    position: index as u32,
                    original: None,
                    mutated: Some(duplicated),
                });
                // do not consume the current word
            }
            _ => {
                records.push(MutationRecord {
                    kind: MutationKind::Delete,
                    position: index as u32,
                    original: Some(word),
                    mutated: None,
                });
                index += 1;
            }
        }
    }

    (out, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn zero_probability_leaves_the_blob_untouched() {
        let blob = [0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22];
        let mut rng = StdRng::seed_from_u64(1);
        let (mutated, records) = mutate(&blob, 0.0, &mut rng);
        assert_eq!(mutated, blob);
        assert!(records.is_empty());
    }

    #[test]
    fn probability_one_transforms_every_word() {
        let blob = [0x11, 0x11, 0x11, 0x11, 0x22, 0x22, 0x22, 0x22];
        let mut rng = StdRng::seed_from_u64(42);
        let (_mutated, records) = mutate(&blob, 1.0, &mut rng);
        assert!(records.len() >= 2);
    }

    #[test]
    fn delete_shrinks_the_blob_by_four_bytes() {
        let blob = [0x11, 0x11, 0x11, 0x11];
        // A seed chosen so the single word rolls the Delete branch deterministically
        // is brittle; instead exercise the transform function directly in spirit by
        // checking the invariant holds whenever a Delete record is produced.
        let mut rng = StdRng::seed_from_u64(7);
        let (mutated, records) = mutate(&blob, 1.0, &mut rng);
        if records.iter().any(|r| r.kind == MutationKind::Delete) {
            assert!(mutated.len() < blob.len());
        }
    }
}
