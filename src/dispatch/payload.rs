use aes::Aes128;
use anyhow::{anyhow, Context, Result};
use cbc::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};

use crate::cache::token::Region;
use crate::config::settings::PayloadConfig;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

const KEY_LEN: usize = 16;
const HEX_PREFIX: &str = "hex:";

// protobuf wire tags: field 1 varint, field 2 length-delimited
const TAG_TARGET_UID: u8 = 0x08;
const TAG_REGION: u8 = 0x12;

/// `hex:`-prefixed hex or a raw 16 byte string
pub fn decode_key_material(value: &str) -> Result<[u8; KEY_LEN]> {
    let bytes = match value.strip_prefix(HEX_PREFIX) {
        Some(encoded) => hex::decode(encoded).context("invalid hex key material")?,
        None => value.as_bytes().to_vec(),
    };
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow!("key material must be {} bytes, got {}", KEY_LEN, bytes.len()))
}

/// Builds the encrypted like request body
#[derive(Clone)]
pub struct LikePayload {
    key: [u8; KEY_LEN],
    iv: [u8; KEY_LEN],
}

impl LikePayload {
    pub fn new(cfg: &PayloadConfig) -> Result<Self> {
        Ok(Self {
            key: decode_key_material(&cfg.key).context("payload key")?,
            iv: decode_key_material(&cfg.iv).context("payload iv")?,
        })
    }

    pub fn build(&self, target_uid: &str, region: &Region) -> Result<Vec<u8>> {
        let plain = encode_like(target_uid, region)?;
        let cipher = Aes128CbcEnc::new_from_slices(&self.key, &self.iv)
            .map_err(|e| anyhow!("invalid payload cipher parameters: {}", e))?;
        Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(&plain))
    }
}

/// Protobuf-encoded like message: `{1: uid varint, 2: region string}`
pub fn encode_like(target_uid: &str, region: &Region) -> Result<Vec<u8>> {
    let uid: u64 = target_uid
        .parse()
        .with_context(|| format!("target uid '{}' is not numeric", target_uid))?;
    let region = region.as_str().as_bytes();

    let mut out = Vec::with_capacity(16 + region.len());
    out.push(TAG_TARGET_UID);
    put_varint(&mut out, uid);
    out.push(TAG_REGION);
    put_varint(&mut out, region.len() as u64);
    out.extend_from_slice(region);
    Ok(out)
}

fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
