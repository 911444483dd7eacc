use crate::error::{GameloreError, Result};

/// Split text into bounded, overlapping segments.
///
/// `size` is the maximum segment length in characters; `overlap` is the
/// number of trailing characters repeated at the start of the next segment.
/// Pure and deterministic: the same input always yields the same segments,
/// and concatenating the segments with overlaps removed reconstructs the
/// input exactly. The last segment may be shorter than `size`.
///
/// Character counts are Unicode scalar values, so multi-byte input never
/// splits inside a code point.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if size == 0 {
        return Err(GameloreError::InvalidArgument(
            "chunk size must be greater than 0".to_string(),
        ));
    }
    if overlap >= size {
        return Err(GameloreError::InvalidArgument(format!(
            "chunk overlap ({}) must be less than chunk size ({})",
            overlap, size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end >= chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Strip the leading overlap from every chunk after the first and
    /// concatenate; must reproduce the original text.
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, c) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(c);
            } else {
                out.extend(c.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_chunk_exact_multiple_no_overlap() {
        let text = "a".repeat(2500);
        let chunks = chunk(&text, 1000, 0).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1000);
        assert_eq!(chunks[1].len(), 1000);
        assert_eq!(chunks[2].len(), 500);
    }

    #[test]
    fn test_chunk_with_overlap_reconstructs() {
        let text: String = (0..997).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        for (size, overlap) in [(100, 20), (128, 1), (50, 49), (1000, 100)] {
            let chunks = chunk(&text, size, overlap).unwrap();
            assert_eq!(reconstruct(&chunks, overlap), text, "size={size} overlap={overlap}");
            for c in &chunks {
                assert!(c.chars().count() <= size);
            }
        }
    }

    #[test]
    fn test_chunk_shorter_than_size() {
        let chunks = chunk("short", 1000, 100).unwrap();
        assert_eq!(chunks, vec!["short".to_string()]);
    }

    #[test]
    fn test_chunk_empty_text() {
        let chunks = chunk("", 1000, 100).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_rejects_overlap_ge_size() {
        assert!(matches!(
            chunk("text", 10, 10),
            Err(GameloreError::InvalidArgument(_))
        ));
        assert!(matches!(
            chunk("text", 10, 11),
            Err(GameloreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_chunk_rejects_zero_size() {
        assert!(matches!(
            chunk("text", 0, 0),
            Err(GameloreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_chunk_multibyte_boundaries() {
        let text = "héllo wörld ".repeat(50);
        let chunks = chunk(&text, 64, 8).unwrap();
        assert_eq!(reconstruct(&chunks, 8), text);
        for c in &chunks {
            assert!(c.chars().count() <= 64);
        }
    }

    #[test]
    fn test_chunk_deterministic() {
        let text = "the quick brown fox ".repeat(100);
        let a = chunk(&text, 333, 33).unwrap();
        let b = chunk(&text, 333, 33).unwrap();
        assert_eq!(a, b);
    }
}
