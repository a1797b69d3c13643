// src/data_sources/storage_key.rs

//! Substrate storage-key construction.
//!
//! A storage key is `twox128(pallet) ++ twox128(item)` followed by each map
//! key encoded and run through the hasher the runtime declares for it. Key
//! arguments arrive as JSON values extracted by the resolver: integers are
//! SCALE fixed-width little-endian, `0x`-prefixed strings are raw bytes,
//! booleans a single byte.

use std::hash::Hasher;

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use serde_json::Value;
use twox_hash::XxHash64;

pub fn twox128(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&xxhash64(data, 0));
    out[8..].copy_from_slice(&xxhash64(data, 1));
    out
}

fn xxhash64(data: &[u8], seed: u64) -> [u8; 8] {
    let mut hasher = XxHash64::with_seed(seed);
    hasher.write(data);
    hasher.finish().to_le_bytes()
}

fn blake2_128(data: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2bVar::new(16).expect("16 is a valid blake2b output size");
    hasher.update(data);
    let mut out = [0u8; 16];
    hasher
        .finalize_variable(&mut out)
        .expect("output buffer matches digest size");
    out
}

/// Applies a runtime-declared map-key hasher to an encoded key.
pub fn hash_key(encoded: &[u8], hasher: &str) -> Result<Vec<u8>, String> {
    match hasher {
        "blake2_128_concat" => {
            let mut out = blake2_128(encoded).to_vec();
            out.extend_from_slice(encoded);
            Ok(out)
        }
        "twox_64_concat" => {
            let mut out = xxhash64(encoded, 0).to_vec();
            out.extend_from_slice(encoded);
            Ok(out)
        }
        "identity" => Ok(encoded.to_vec()),
        other => Err(format!("unsupported storage hasher '{other}'")),
    }
}

/// SCALE-encodes a single key argument. The width of integer keys comes
/// from the tool definition's `key_types` hint and defaults to `u32`.
pub fn encode_key_arg(value: &Value, key_type: Option<&str>) -> Result<Vec<u8>, String> {
    match value {
        Value::Number(n) => {
            let n = n
                .as_u64()
                .ok_or_else(|| format!("cannot encode negative or fractional key {n}"))?;
            match key_type.unwrap_or("u32") {
                "u8" => u8::try_from(n)
                    .map(|v| vec![v])
                    .map_err(|_| format!("key {n} does not fit u8")),
                "u16" => u16::try_from(n)
                    .map(|v| v.to_le_bytes().to_vec())
                    .map_err(|_| format!("key {n} does not fit u16")),
                "u32" => u32::try_from(n)
                    .map(|v| v.to_le_bytes().to_vec())
                    .map_err(|_| format!("key {n} does not fit u32")),
                "u64" => Ok(n.to_le_bytes().to_vec()),
                "u128" => Ok((n as u128).to_le_bytes().to_vec()),
                other => Err(format!("unsupported integer key type '{other}'")),
            }
        }
        Value::String(s) => {
            if let Some(hex_str) = s.strip_prefix("0x") {
                hex::decode(hex_str).map_err(|e| format!("invalid hex key '{s}': {e}"))
            } else {
                Err(format!(
                    "string key '{s}' must be 0x-prefixed hex (SS58 decoding is not supported)"
                ))
            }
        }
        Value::Bool(b) => Ok(vec![u8::from(*b)]),
        other => Err(format!("cannot encode storage key from {other}")),
    }
}

/// Builds the full hex storage key for a (pallet, item, keys) query.
pub fn storage_key(
    pallet: &str,
    storage_item: &str,
    keys: &[Value],
    hashers: &[String],
    key_types: &[String],
) -> Result<String, String> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox128(pallet.as_bytes()));
    key.extend_from_slice(&twox128(storage_item.as_bytes()));

    for (i, arg) in keys.iter().enumerate() {
        let hasher = hashers.get(i).map(String::as_str).unwrap_or("blake2_128_concat");
        let key_type = key_types.get(i).map(String::as_str);
        let encoded = encode_key_arg(arg, key_type)?;
        key.extend_from_slice(&hash_key(&encoded, hasher)?);
    }

    Ok(format!("0x{}", hex::encode(key)))
}
