//! Short code generation
//!
//! Codes are drawn from a 62-symbol alphabet with rejection sampling, so every
//! symbol is equally likely. Randomness comes from the thread-local CSPRNG.

/// 0-9, a-z, A-Z
pub const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Bytes at or above this value are rejected: `256 - 256 % 62`
pub const MAX_VALID_BYTE: u16 = 256 - (256 % ALPHABET.len() as u16);

const BATCH: usize = 64;

/// A code of exactly `length` symbols from [`ALPHABET`]
pub fn generate_code(length: usize) -> String {
    generate_code_with(length, |buf| {
        for byte in buf.iter_mut() {
            *byte = rand::random::<u8>();
        }
    })
}

/// Same as [`generate_code`] with an explicit byte source
///
/// `fill` is called as many times as needed; rejected bytes are discarded,
/// so more than `length` bytes may be consumed.
pub fn generate_code_with<F>(length: usize, mut fill: F) -> String
where
    F: FnMut(&mut [u8]),
{
    let mut code = String::with_capacity(length);
    let mut buf = [0u8; BATCH];

    while code.len() < length {
        let want = (length - code.len()).min(BATCH);
        fill(&mut buf[..want]);
        for &byte in &buf[..want] {
            if u16::from(byte) >= MAX_VALID_BYTE {
                continue;
            }
            code.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Feeds bytes from `bytes`, wrapping around at the end
    fn cycling(bytes: Vec<u8>) -> impl FnMut(&mut [u8]) {
        let mut pos = 0;
        move |buf: &mut [u8]| {
            for byte in buf.iter_mut() {
                *byte = bytes[pos % bytes.len()];
                pos += 1;
            }
        }
    }

    #[test]
    fn test_max_valid_byte() {
        assert_eq!(MAX_VALID_BYTE, 248);
    }

    #[test]
    fn test_length_and_alphabet() {
        for length in [1, 6, 8, 20, 100] {
            let code = generate_code(length);
            assert_eq!(code.len(), length);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "{code}");
        }
        assert_eq!(generate_code(0), "");
    }

    #[test]
    fn test_every_symbol_maps_from_exactly_four_bytes() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        let code = generate_code_with(248, cycling(all_bytes));

        let mut counts: HashMap<char, usize> = HashMap::new();
        for c in code.chars() {
            *counts.entry(c).or_default() += 1;
        }
        assert_eq!(counts.len(), 62);
        assert!(counts.values().all(|&n| n == 4));
    }

    #[test]
    fn test_high_bytes_are_rejected() {
        let code = generate_code_with(2, cycling(vec![255, 250, 248, 0, 61]));
        assert_eq!(code, "0Z");

        let code = generate_code_with(3, cycling(vec![249, 247, 10]));
        // 247 % 62 = 61 -> 'Z', 10 -> 'a'
        assert_eq!(code, "ZaZ");
    }

    #[test]
    fn test_codes_are_independent() {
        let a = generate_code(12);
        let b = generate_code(12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_symbol_distribution_is_uniform() {
        const DRAWS: usize = 100_000;
        let code = generate_code(DRAWS);

        let mut counts = [0usize; 62];
        for b in code.bytes() {
            let idx = ALPHABET.iter().position(|&a| a == b).unwrap();
            counts[idx] += 1;
        }

        let expected = DRAWS as f64 / 62.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&n| {
                let diff = n as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // df = 61; p < 1e-5 above ~115
        assert!(chi_square < 120.0, "chi-square too high: {chi_square}");
    }
}
