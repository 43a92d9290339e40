// 锁定脚本 (scriptPubKey) 与解锁脚本 (scriptSig)
// 只识别 P2PK 和 P2PKH 两种标准模板，其它脚本原样保存在 `Other` 中
// 识别出的模板必须能逐字节重新编码，否则同样降级为 `Other`

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ecdsa::Signature;
use crate::error::{BtcError, Result};
use crate::serialize::{hex_bytes, ByteReader, Encodable};

pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

pub const SIGHASH_ALL: u8 = 0x01;

const PUB_KEY_HASH_LEN: usize = 20;
const COMPRESSED_KEY_LEN: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    P2pkh,
    P2pk,
    Other,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScriptType::P2pkh => write!(f, "P2PKH"),
            ScriptType::P2pk => write!(f, "P2PK"),
            ScriptType::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptPubKey {
    P2pkh {
        #[serde(with = "hex_bytes")]
        pub_key_hash: [u8; 20],
    },
    P2pk {
        #[serde(with = "hex_bytes")]
        public_key: [u8; 33],
    },
    Other(#[serde(with = "hex_bytes")] Vec<u8>),
}

impl ScriptPubKey {
    pub fn p2pkh(pub_key_hash: [u8; 20]) -> Self {
        ScriptPubKey::P2pkh { pub_key_hash }
    }

    pub fn p2pk(public_key: [u8; 33]) -> Self {
        ScriptPubKey::P2pk { public_key }
    }

    // 按操作码模式识别脚本，无法识别时返回 `Other`，从不报错
    pub fn parse(bytes: &[u8]) -> Self {
        // DUP HASH160 push(20) <hash> EQUALVERIFY CHECKSIG
        if bytes.len() == PUB_KEY_HASH_LEN + 5
            && bytes[0] == OP_DUP
            && bytes[1] == OP_HASH160
            && bytes[2] == PUB_KEY_HASH_LEN as u8
            && bytes[23] == OP_EQUALVERIFY
            && bytes[24] == OP_CHECKSIG
        {
            let mut pub_key_hash = [0u8; 20];
            pub_key_hash.copy_from_slice(&bytes[3..23]);
            return ScriptPubKey::P2pkh { pub_key_hash };
        }

        // push(33) <key> CHECKSIG
        if bytes.len() == COMPRESSED_KEY_LEN + 2
            && bytes[0] == COMPRESSED_KEY_LEN as u8
            && bytes[34] == OP_CHECKSIG
        {
            let mut public_key = [0u8; 33];
            public_key.copy_from_slice(&bytes[1..34]);
            return ScriptPubKey::P2pk { public_key };
        }

        debug!("未识别的锁定脚本，按 OTHER 保存: {} 字节", bytes.len());
        ScriptPubKey::Other(bytes.to_vec())
    }

    pub fn script_type(&self) -> ScriptType {
        match self {
            ScriptPubKey::P2pkh { .. } => ScriptType::P2pkh,
            ScriptPubKey::P2pk { .. } => ScriptType::P2pk,
            ScriptPubKey::Other(_) => ScriptType::Other,
        }
    }

    pub fn pub_key_hash(&self) -> Option<&[u8; 20]> {
        match self {
            ScriptPubKey::P2pkh { pub_key_hash } => Some(pub_key_hash),
            _ => None,
        }
    }

    pub fn public_key(&self) -> Option<&[u8; 33]> {
        match self {
            ScriptPubKey::P2pk { public_key } => Some(public_key),
            _ => None,
        }
    }
}

impl Encodable for ScriptPubKey {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            ScriptPubKey::P2pkh { pub_key_hash } => {
                out.extend_from_slice(&[OP_DUP, OP_HASH160, PUB_KEY_HASH_LEN as u8]);
                out.extend_from_slice(pub_key_hash);
                out.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
            }
            ScriptPubKey::P2pk { public_key } => {
                out.push(COMPRESSED_KEY_LEN as u8);
                out.extend_from_slice(public_key);
                out.push(OP_CHECKSIG);
            }
            ScriptPubKey::Other(raw) => out.extend_from_slice(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptSig {
    P2pk {
        signature: Signature,
        hash_type: u8,
    },
    P2pkh {
        signature: Signature,
        hash_type: u8,
        #[serde(with = "hex_bytes")]
        public_key: [u8; 33],
    },
    Other(#[serde(with = "hex_bytes")] Vec<u8>),
}

impl Default for ScriptSig {
    fn default() -> Self {
        ScriptSig::empty()
    }
}

impl ScriptSig {
    pub fn empty() -> Self {
        ScriptSig::Other(Vec::new())
    }

    pub fn p2pk(signature: Signature) -> Self {
        ScriptSig::P2pk {
            signature,
            hash_type: SIGHASH_ALL,
        }
    }

    pub fn p2pkh(signature: Signature, public_key: [u8; 33]) -> Self {
        ScriptSig::P2pkh {
            signature,
            hash_type: SIGHASH_ALL,
            public_key,
        }
    }

    // 解析解锁脚本：`push(DER签名 + hash type)` 后可选 `push(33字节公钥)`
    // 任何一步不符合都返回 `Other` 并保留原始字节
    pub fn parse(bytes: &[u8]) -> Self {
        match Self::parse_signature_script(bytes) {
            Some(script) if script.to_bytes() == bytes => script,
            _ => {
                debug!("未识别的解锁脚本，按 OTHER 保存: {} 字节", bytes.len());
                ScriptSig::Other(bytes.to_vec())
            }
        }
    }

    fn parse_signature_script(bytes: &[u8]) -> Option<Self> {
        let mut reader = ByteReader::new(bytes);
        let opcode = reader.read_u8().ok()?;
        if opcode == 0 || opcode >= OP_PUSHDATA1 {
            return None;
        }
        let der = reader.read_bytes(opcode as usize).ok()?;
        let (signature, hash_type) = parse_der_signature(der).ok()?;

        if reader.is_empty() {
            return Some(ScriptSig::P2pk {
                signature,
                hash_type,
            });
        }

        if reader.read_u8().ok()? as usize != COMPRESSED_KEY_LEN
            || reader.remaining() != COMPRESSED_KEY_LEN
        {
            return None;
        }
        let mut public_key = [0u8; 33];
        public_key.copy_from_slice(reader.rest());
        Some(ScriptSig::P2pkh {
            signature,
            hash_type,
            public_key,
        })
    }

    // 追加一个隐式 push（1..=75 字节），只能用于非签名脚本
    pub fn push_data(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() >= OP_PUSHDATA1 as usize {
            return Err(BtcError::InvalidScript(format!(
                "隐式 push 只支持 1 到 {} 字节, 实际 {} 字节",
                OP_PUSHDATA1 - 1,
                data.len()
            )));
        }
        match self {
            ScriptSig::Other(raw) => {
                raw.push(data.len() as u8);
                raw.extend_from_slice(data);
                Ok(())
            }
            _ => Err(BtcError::InvalidScriptType(format!(
                "不能向 {} 签名脚本追加数据",
                self.script_type()
            ))),
        }
    }

    pub fn script_type(&self) -> ScriptType {
        match self {
            ScriptSig::P2pkh { .. } => ScriptType::P2pkh,
            ScriptSig::P2pk { .. } => ScriptType::P2pk,
            ScriptSig::Other(_) => ScriptType::Other,
        }
    }

    pub fn is_signed(&self) -> bool {
        !matches!(self, ScriptSig::Other(_))
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            ScriptSig::P2pk { signature, .. } | ScriptSig::P2pkh { signature, .. } => Some(signature),
            ScriptSig::Other(_) => None,
        }
    }

    pub fn hash_type(&self) -> Option<u8> {
        match self {
            ScriptSig::P2pk { hash_type, .. } | ScriptSig::P2pkh { hash_type, .. } => Some(*hash_type),
            ScriptSig::Other(_) => None,
        }
    }

    pub fn public_key(&self) -> Option<&[u8; 33]> {
        match self {
            ScriptSig::P2pkh { public_key, .. } => Some(public_key),
            _ => None,
        }
    }
}

impl Encodable for ScriptSig {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            ScriptSig::P2pk {
                signature,
                hash_type,
            } => {
                push_bytes(out, &encode_der_signature(signature, *hash_type));
            }
            ScriptSig::P2pkh {
                signature,
                hash_type,
                public_key,
            } => {
                push_bytes(out, &encode_der_signature(signature, *hash_type));
                push_bytes(out, public_key);
            }
            ScriptSig::Other(raw) => out.extend_from_slice(raw),
        }
    }
}

fn push_bytes(out: &mut Vec<u8>, data: &[u8]) {
    out.push(data.len() as u8);
    out.extend_from_slice(data);
}

// DER 整数：最短大端编码，最高位为 1 时前补 0x00
fn der_integer(value: &BigUint) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes.first().map_or(false, |b| b & 0x80 != 0) {
        bytes.insert(0, 0x00);
    }
    bytes
}

// 编码为 `30 len 02 lenR R 02 lenS S hashType`，不含 push 操作码
pub fn encode_der_signature(signature: &Signature, hash_type: u8) -> Vec<u8> {
    let r = der_integer(&signature.r);
    let s = der_integer(&signature.s);

    let mut body = Vec::with_capacity(r.len() + s.len() + 4);
    body.push(0x02);
    body.push(r.len() as u8);
    body.extend_from_slice(&r);
    body.push(0x02);
    body.push(s.len() as u8);
    body.extend_from_slice(&s);

    let mut result = Vec::with_capacity(body.len() + 3);
    result.push(0x30);
    result.push(body.len() as u8);
    result.extend_from_slice(&body);
    result.push(hash_type);
    result
}

fn malformed(msg: &str) -> BtcError {
    BtcError::MalformedDer(msg.to_string())
}

fn read_der_integer(reader: &mut ByteReader<'_>) -> Result<BigUint> {
    if reader.read_u8().map_err(|_| malformed("缺少 INTEGER 标记"))? != 0x02 {
        return Err(malformed("INTEGER 标记应为 0x02"));
    }
    let len = reader.read_u8().map_err(|_| malformed("缺少 INTEGER 长度"))? as usize;
    if len == 0 {
        return Err(malformed("INTEGER 长度为0"));
    }
    let bytes = reader
        .read_bytes(len)
        .map_err(|_| malformed("INTEGER 长度超出数据"))?;
    Ok(BigUint::from_bytes_be(bytes))
}

// 解析 DER 签名及末尾的 hash type 字节
// 只检查结构，不检查编码是否最短，严格检查见 is_valid_der_signature
pub fn parse_der_signature(data: &[u8]) -> Result<(Signature, u8)> {
    let mut reader = ByteReader::new(data);
    if reader.read_u8().map_err(|_| malformed("签名为空"))? != 0x30 {
        return Err(malformed("SEQUENCE 标记应为 0x30"));
    }
    let seq_len = reader.read_u8().map_err(|_| malformed("缺少 SEQUENCE 长度"))? as usize;
    if seq_len + 1 != reader.remaining() {
        return Err(malformed("SEQUENCE 长度与数据长度不符"));
    }

    let r = read_der_integer(&mut reader)?;
    let s = read_der_integer(&mut reader)?;
    if reader.remaining() != 1 {
        return Err(malformed("SEQUENCE 后应只剩 hash type 字节"));
    }
    let hash_type = reader.read_u8()?;
    Ok((Signature::new(r, s), hash_type))
}

// 严格 DER 检查（含末尾 hash type），规则与 Bitcoin Core 的
// IsValidSignatureEncoding 相同
pub fn is_valid_der_signature(data: &[u8]) -> bool {
    let len = data.len();
    if !(9..=73).contains(&len) {
        return false;
    }
    if data[0] != 0x30 || data[1] as usize != len - 3 {
        return false;
    }

    let len_r = data[3] as usize;
    if 5 + len_r >= len {
        return false;
    }
    let len_s = data[5 + len_r] as usize;
    if len_r + len_s + 7 != len {
        return false;
    }

    if data[2] != 0x02 || len_r == 0 {
        return false;
    }
    if data[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && data[4] == 0x00 && data[5] & 0x80 == 0 {
        return false;
    }

    if data[len_r + 4] != 0x02 || len_s == 0 {
        return false;
    }
    if data[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && data[len_r + 6] == 0x00 && data[len_r + 7] & 0x80 == 0 {
        return false;
    }
    true
}
