//! MGF1(RFC 8017 B.2.1)
//!
//! $T = H(seed || C_0) || H(seed || C_1) || ...$, $C_i$为4字节大端序计数器, 输出`T`的前`maskLen`字节.

use crypto_hash::{DigestX, HashError};

/// 返回`MGF1(seed, mask_len)`
pub fn mgf1<H: DigestX>(hf: &mut H, seed: &[u8], mask_len: usize) -> Result<Vec<u8>, HashError> {
    let mut mask = vec![0u8; mask_len];
    mgf1_xor(hf, seed, mask.as_mut_slice())?;
    Ok(mask)
}

/// `out ^= MGF1(seed, out.len())`
///
/// `out.len()`超过$hLen \cdot 2^{32}$时返回`HashError::MaskTooLong`.
pub fn mgf1_xor<H: DigestX>(hf: &mut H, seed: &[u8], out: &mut [u8]) -> Result<(), HashError> {
    let hlen = hf.digest_len_x();
    let limit = (hlen as u128) << 32;
    if out.len() as u128 > limit {
        return Err(HashError::MaskTooLong {
            mask_len: out.len(),
            limit,
        });
    } else if out.is_empty() {
        return Ok(());
    }

    for (counter, chunk) in out.chunks_mut(hlen).enumerate() {
        hf.reset_x();
        hf.write_x(seed);
        hf.write_x((counter as u32).to_be_bytes().as_slice());
        let d = hf.finish_x();
        chunk.iter_mut().zip(d).for_each(|(a, b)| *a ^= b);
    }

    Ok(())
}
