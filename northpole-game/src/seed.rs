//! Reversible shift-code scheme so a session seed can be shared and replayed.
//! Code format: NP-<WORD><NN>, e.g., NP-TINSEL42, NP-SLEIGH07

const CODE_PREFIX: &str = "NP";

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for shift codes
pub const WORD_LIST: [&str; 64] = [
    "TINSEL", "SLEIGH", "COOKIE", "CHIMNEY", "REINDEER", "GROTTO", "COCOA", "MITTEN", "SNOWMAN",
    "HOLLY", "IVY", "GARLAND", "STAR", "BAUBLE", "CANDLE", "CAROL", "FROST", "ICICLE", "PUDDING",
    "SPRUCE", "RIBBON", "PARCEL", "STOCKING", "WREATH", "NOEL", "JINGLE", "SLED", "BLIZZARD",
    "FLURRY", "ELF", "NUTMEG", "GINGER", "PEPPER", "MINT", "CANDYCANE", "FUDGE", "EGGNOG", "LANTERN",
    "SNOWFALL", "TOBOGGAN", "SKATE", "SCARF", "BEANIE", "FIREPLACE", "EMBER", "LOG", "PINE", "CEDAR",
    "MISTLETOE", "ANGEL", "BELL", "DRUM", "FIGGY", "YULE", "POLAR", "AURORA", "TUNDRA", "IGLOO",
    "WALRUS", "PENGUIN", "ORNAMENT", "TRUFFLE", "PRETZEL", "KERNEL",
];

const WORD_BITS: u16 = 0x003F;

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & WORD_BITS | ((u16::from(nn) & 0x7F) << 6)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & WORD_BITS, ((packed >> 6) & 0x7F) as u8)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 9];
    buf[..6].copy_from_slice(b"NPOLE-");
    buf[6] = (packed & 0xFF) as u8;
    buf[7] = (packed >> 8) as u8;
    buf[8] = 0x5A;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the shift code for `seed`.
#[must_use]
pub fn encode_shift_code(seed: u64) -> String {
    let packed = (seed & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST.get(usize::from(wi)).copied().unwrap_or("TINSEL");
    if nn > 99 {
        nn %= 100;
    }
    format!("{CODE_PREFIX}-{word}{nn:02}")
}

/// Parse a shift code back into the seed it names.
#[must_use]
pub fn decode_shift_code(code: &str) -> Option<u64> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    if !prefix.eq_ignore_ascii_case(CODE_PREFIX) || !rest.is_ascii() || rest.len() < 3 {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

/// Derive a fresh shareable code from arbitrary entropy (e.g. wall-clock nanos).
#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_shift_code(compose_seed(wi, nn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_code() {
        let seed = decode_shift_code("NP-TINSEL42").unwrap();
        assert_eq!(encode_shift_code(seed), "NP-TINSEL42");
    }

    #[test]
    fn decode_is_case_insensitive_and_rejects_foreign_prefixes() {
        assert_eq!(
            decode_shift_code("np-sleigh07"),
            decode_shift_code("NP-SLEIGH07")
        );
        assert!(decode_shift_code("CL-SLEIGH07").is_none());
        assert!(decode_shift_code("NP-NOTAWORD11").is_none());
        assert!(decode_shift_code("NP-7").is_none());
    }

    #[test]
    fn non_ascii_codes_are_rejected_without_panicking() {
        assert!(decode_shift_code("NP-Noël").is_none());
        assert!(decode_shift_code("NP-ab€").is_none());
        assert!(decode_shift_code("NP-TINSEL4€").is_none());
    }

    #[test]
    fn every_word_is_distinct_and_encodable() {
        for (i, word) in WORD_LIST.iter().enumerate() {
            assert_eq!(
                WORD_LIST.iter().filter(|w| *w == word).count(),
                1,
                "{word} repeated"
            );
            let code = format!("NP-{word}{:02}", i % 100);
            let seed = decode_shift_code(&code).unwrap();
            assert_eq!(encode_shift_code(seed), code);
        }
    }

    #[test]
    fn entropy_codes_decode() {
        let code = generate_code_from_entropy(0xDEAD_BEEF);
        assert!(decode_shift_code(&code).is_some());
    }
}
