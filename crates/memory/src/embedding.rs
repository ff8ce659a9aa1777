//! Local text embedding and vector math.
//!
//! Embeds text as a hashed bag of character trigrams, L2-normalized. The
//! embedder is deterministic — identical text always produces the identical
//! vector, so a stored snippet queried with its own text comes back at
//! distance zero. It needs no model download, which keeps the vector store
//! fully local and the tests hermetic.

const EMBEDDING_DIM: usize = 256;

/// Embed text into a fixed-size L2-normalized vector.
pub fn embed(text: &str) -> Vec<f32> {
    let mut buckets = vec![0.0f32; EMBEDDING_DIM];

    let normalized = text.to_lowercase();
    for word in normalized.split_whitespace() {
        // Whole-word feature plus character trigrams.
        bump(&mut buckets, word.as_bytes());

        let bytes = word.as_bytes();
        if bytes.len() > 3 {
            for window in bytes.windows(3) {
                bump(&mut buckets, window);
            }
        }
    }

    let norm: f32 = buckets.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut buckets {
            *v /= norm;
        }
    }
    buckets
}

/// FNV-1a hash of a feature into its bucket.
fn bump(buckets: &mut [f32], feature: &[u8]) {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in feature {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let index = (hash % buckets.len() as u64) as usize;
    // Signed hashing: collisions cancel instead of accumulating.
    let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
    buckets[index] += sign;
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Cosine distance: `1 - similarity`, clamped to be non-negative.
///
/// 0 = identical direction, 1 = orthogonal, up to 2 = opposite.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

/// Rank stored records against a query text by ascending cosine distance.
///
/// Records without an embedding get one computed from their text on the
/// fly. Returns at most `n` results.
pub fn rank_records(
    records: &[localclaw_core::vector::MemoryRecord],
    query: &str,
    n: usize,
) -> Vec<localclaw_core::vector::MemoryResult> {
    let query_embedding = embed(query);

    let mut results: Vec<localclaw_core::vector::MemoryResult> = records
        .iter()
        .map(|record| {
            let distance = match &record.embedding {
                Some(e) => cosine_distance(e, &query_embedding),
                None => cosine_distance(&embed(&record.text), &query_embedding),
            };
            localclaw_core::vector::MemoryResult {
                id: record.id.clone(),
                text: record.text.clone(),
                distance,
                metadata: record.metadata.clone(),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(n);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_is_deterministic() {
        let a = embed("the user prefers dark mode");
        let b = embed("the user prefers dark mode");
        assert_eq!(a, b);
    }

    #[test]
    fn embed_is_normalized() {
        let v = embed("some text to embed");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn embed_empty_is_zero_vector() {
        let v = embed("");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn identical_text_distance_zero() {
        let a = embed("remember the milk");
        let b = embed("remember the milk");
        assert!(cosine_distance(&a, &b) < 1e-5);
    }

    #[test]
    fn overlapping_text_closer_than_unrelated() {
        let query = embed("favourite programming language rust");
        let related = embed("rust is my favourite programming language");
        let unrelated = embed("quarterly marketing budget spreadsheet");

        assert!(cosine_distance(&query, &related) < cosine_distance(&query, &unrelated));
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn distance_never_negative() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        let d = cosine_distance(&a, &b);
        assert!(d >= 0.0);
        assert!((d - 2.0).abs() < 1e-6);
    }
}
