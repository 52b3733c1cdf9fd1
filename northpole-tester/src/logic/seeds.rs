use anyhow::{Context, Result, bail};
use northpole_game::seed::WORD_LIST;
use northpole_game::{decode_shift_code, encode_shift_code, generate_code_from_entropy};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed used when no usable token was supplied.
pub const FALLBACK_SEED: u64 = 1337;

/// Seed metadata used for logic and playability analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub const fn from_shift_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    /// The code the seed was given as, or a rendered one for numeric seeds.
    #[must_use]
    pub fn shift_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_shift_code(self.seed))
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, shift codes, the keyword `random` (a fresh code
/// drawn from the wall clock) and the keywords `all` / `available` which
/// expand to every shift-code seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if token.eq_ignore_ascii_case("random") {
            pending.push(random_shift_code_seed()?);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some(seed) = decode_shift_code(token) {
            pending.push(SeedInfo::from_shift_code(seed, token.trim().to_uppercase()));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_shift_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for info in pending {
        if let Some(&existing) = index.get(&info.seed) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(info.seed, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(FALLBACK_SEED));
    }

    Ok(deduped)
}

fn random_shift_code_seed() -> Result<SeedInfo> {
    let entropy = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs().rotate_left(32) ^ u64::from(elapsed.subsec_nanos()))
        .unwrap_or_default();
    let code = generate_code_from_entropy(entropy);
    let seed = decode_shift_code(&code)
        .with_context(|| format!("generated an unparsable shift code: {code}"))?;
    log::debug!("random seed token resolved to {code}");
    Ok(SeedInfo::from_shift_code(seed, code))
}

fn generate_all_shift_code_seeds() -> Result<Vec<SeedInfo>> {
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100);

    for word in WORD_LIST {
        for suffix in 0..100 {
            let code = format!("NP-{word}{suffix:02}");
            let seed = decode_shift_code(&code)
                .with_context(|| format!("failed to parse shift code: {code}"))?;
            seeds.push(SeedInfo::from_shift_code(seed, code));
        }
    }

    Ok(seeds)
}
