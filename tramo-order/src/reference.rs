//! Per-leg reference ids sent with vendor ticket transactions.

use rand::Rng;
use std::collections::HashSet;

const PREFIX_LEN: usize = 8;
const SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// First eight characters after the first `-` of the transaction id, or of the whole id.
pub fn reference_prefix(transaction_id: &str) -> String {
    let tail = transaction_id
        .split_once('-')
        .map(|(_, rest)| rest)
        .unwrap_or(transaction_id);
    tail.chars().take(PREFIX_LEN).collect()
}

/// One distinct reference id per leg.
pub fn allocate_reference_ids<R: Rng>(transaction_id: &str, legs: usize, rng: &mut R) -> Vec<String> {
    let prefix = reference_prefix(transaction_id);
    let mut seen = HashSet::with_capacity(legs);
    let mut ids = Vec::with_capacity(legs);

    while ids.len() < legs {
        let id = format!("{}{}", prefix, random_suffix(rng));
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    ids
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}
