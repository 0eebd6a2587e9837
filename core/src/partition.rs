//! Partitioner token of a record id.
//!
//! The store places rows on its token ring by the Murmur3 hash of the
//! partition key, and `token(id)` comparisons in CQL operate on that value.
//! This is the same function, so an in-process store can order and bound
//! rows the way the real one does.

use uuid::Uuid;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Murmur3Partitioner token of a `uuid` partition key.
///
/// The key is the 16-byte big-endian serialization of the UUID.
pub fn partition_token(id: Uuid) -> i64 {
    murmur3_token(id.as_bytes())
}

/// Token of a serialized partition key: the first half of MurmurHash3
/// x64/128 with seed 0. `i64::MIN` is reserved by the partitioner and maps
/// to `i64::MAX`.
fn murmur3_token(key: &[u8]) -> i64 {
    let token = murmur3_x64_128_h1(key) as i64;
    if token == i64::MIN {
        i64::MAX
    } else {
        token
    }
}

fn murmur3_x64_128_h1(key: &[u8]) -> u64 {
    let mut h1: u64 = 0;
    let mut h2: u64 = 0;

    let mut blocks = key.chunks_exact(16);
    for block in &mut blocks {
        let mut lo = [0u8; 8];
        let mut hi = [0u8; 8];
        lo.copy_from_slice(&block[..8]);
        hi.copy_from_slice(&block[8..]);

        h1 ^= mix_k1(u64::from_le_bytes(lo));
        h1 = h1.rotate_left(27).wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        h2 ^= mix_k2(u64::from_le_bytes(hi));
        h2 = h2.rotate_left(31).wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    // Tail bytes are sign-extended, as the partitioner reads them as Java bytes.
    let tail = blocks.remainder();
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;
    for (i, byte) in tail.iter().enumerate() {
        let b = *byte as i8 as i64 as u64;
        if i < 8 {
            k1 ^= b << (i * 8);
        } else {
            k2 ^= b << ((i - 8) * 8);
        }
    }
    if tail.len() > 8 {
        h2 ^= mix_k2(k2);
    }
    if !tail.is_empty() {
        h1 ^= mix_k1(k1);
    }

    h1 ^= key.len() as u64;
    h2 ^= key.len() as u64;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1.wrapping_add(h2)
}

fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
