use std::fmt;

use num_bigint::BigUint;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{All, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ecc::{decode_compressed, encode_compressed, Curve, CurveArithmetic, Point};
use crate::ecdsa::Ecdsa;
use crate::error::{BtcError, Result};
use crate::hash::{double_sha256, hash160};
use crate::serialize::hex_bytes;

const CHECKSUM_LENGTH: usize = 4;
const COMPRESSED_FLAG: u8 = 0x01;

static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn address_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    pub fn wif_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    pub fn from_address_version(version: u8) -> Option<Network> {
        match version {
            0x00 => Some(Network::Mainnet),
            0x6f => Some(Network::Testnet),
            _ => None,
        }
    }

    pub fn from_wif_version(version: u8) -> Option<Network> {
        match version {
            0x80 => Some(Network::Mainnet),
            0xef => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

// 追加 4 字节 double-SHA256 校验和后做 Base58 编码
pub fn base58check_encode(payload: &[u8]) -> String {
    let checksum = double_sha256(payload);
    let mut data = payload.to_vec();
    data.extend_from_slice(&checksum[..CHECKSUM_LENGTH]);
    bs58::encode(data).into_string()
}

// Base58 解码并校验，返回去掉校验和的数据
pub fn base58check_decode(s: &str) -> Result<Vec<u8>> {
    let mut data = bs58::decode(s).into_vec()?;
    if data.len() < CHECKSUM_LENGTH {
        return Err(BtcError::Base58(format!("数据太短: {} 字节", data.len())));
    }
    let checksum = data.split_off(data.len() - CHECKSUM_LENGTH);
    if double_sha256(&data)[..CHECKSUM_LENGTH] != checksum[..] {
        return Err(BtcError::ChecksumMismatch);
    }
    Ok(data)
}

#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: [u8; 32],
}

// 不输出私钥内容
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PrivateKey(..)")
    }
}

impl PrivateKey {
    // 私钥必须在 [1, n-1] 范围内
    pub fn from_bytes(secret: [u8; 32]) -> Result<PrivateKey> {
        SecretKey::from_slice(&secret)?;
        Ok(PrivateKey { secret })
    }

    pub fn from_biguint(value: &BigUint) -> Result<PrivateKey> {
        let bytes = value.to_bytes_be();
        if bytes.len() > 32 {
            return Err(BtcError::InvalidKey("私钥超过32字节".to_string()));
        }
        let mut secret = [0u8; 32];
        secret[32 - bytes.len()..].copy_from_slice(&bytes);
        PrivateKey::from_bytes(secret)
    }

    pub fn generate() -> PrivateKey {
        let mut rng = OsRng;
        let (secret_key, _) = SECP.generate_keypair(&mut rng);
        debug!("生成新的私钥");
        PrivateKey {
            secret: secret_key.secret_bytes(),
        }
    }

    // 解析压缩格式的 WIF：版本(1) + 私钥(32) + 0x01 + 校验和(4)
    pub fn from_wif(wif: &str) -> Result<(PrivateKey, Network)> {
        let payload = base58check_decode(wif)?;
        if payload.len() != 34 {
            return Err(BtcError::InvalidKey(format!(
                "WIF 长度应为38字节, 实际 {} 字节",
                payload.len() + CHECKSUM_LENGTH
            )));
        }
        let network = Network::from_wif_version(payload[0])
            .ok_or_else(|| BtcError::InvalidKey(format!("未知的 WIF 前缀: {:#04x}", payload[0])))?;
        if payload[33] != COMPRESSED_FLAG {
            return Err(BtcError::InvalidKey("只支持压缩公钥的 WIF".to_string()));
        }

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&payload[1..33]);
        Ok((PrivateKey::from_bytes(secret)?, network))
    }

    pub fn to_wif(&self, network: Network) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(network.wif_version());
        payload.extend_from_slice(&self.secret);
        payload.push(COMPRESSED_FLAG);
        base58check_encode(&payload)
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.secret)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        let point = Ecdsa::new(Curve::secp256k1()).public_key(&self.to_biguint())?;
        PublicKey::from_point(&point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "hex_bytes")]
    bytes: [u8; 33],
}

impl PublicKey {
    // 校验前缀并确认 x 对应曲线上的点
    pub fn from_compressed(bytes: [u8; 33]) -> Result<PublicKey> {
        decode_compressed(Curve::secp256k1(), &bytes)?;
        Ok(PublicKey { bytes })
    }

    pub fn from_point(point: &Point) -> Result<PublicKey> {
        if !Curve::secp256k1().contains(point) {
            return Err(BtcError::UnsupportedCurvePoint("点不在 secp256k1 上".to_string()));
        }
        Ok(PublicKey {
            bytes: encode_compressed(point)?,
        })
    }

    pub fn from_coordinates(x: &BigUint, y: &BigUint) -> Result<PublicKey> {
        PublicKey::from_point(&Point::new(x.clone(), y.clone()))
    }

    // 解析 `04 || X || Y` 格式的未压缩公钥
    pub fn from_uncompressed_hex(s: &str) -> Result<PublicKey> {
        let bytes = hex::decode(s.trim())?;
        if bytes.len() != 65 || bytes[0] != 0x04 {
            return Err(BtcError::InvalidKey("未压缩公钥应为 0x04 开头的65字节".to_string()));
        }
        PublicKey::from_coordinates(
            &BigUint::from_bytes_be(&bytes[1..33]),
            &BigUint::from_bytes_be(&bytes[33..]),
        )
    }

    pub fn point(&self) -> Result<Point> {
        decode_compressed(Curve::secp256k1(), &self.bytes)
    }

    pub fn coordinates(&self) -> Result<(BigUint, BigUint)> {
        match self.point()? {
            Point::Affine { x, y } => Ok((x, y)),
            Point::Infinity => Err(BtcError::UnsupportedCurvePoint("无穷远点".to_string())),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.bytes)
    }

    pub fn address(&self, network: Network) -> String {
        let mut payload = vec![network.address_version()];
        payload.extend_from_slice(&self.hash160());
        base58check_encode(&payload)
    }
}

// 从 P2PKH 地址取出公钥哈希
pub fn address_to_pub_key_hash(address: &str) -> Result<[u8; 20]> {
    let payload = base58check_decode(address)?;
    if payload.len() != 21 {
        return Err(BtcError::InvalidAddress(format!(
            "地址数据应为21字节, 实际 {} 字节",
            payload.len()
        )));
    }
    if Network::from_address_version(payload[0]).is_none() {
        return Err(BtcError::InvalidAddress(format!("未知的地址版本: {}", payload[0])));
    }
    let mut pub_key_hash = [0u8; 20];
    pub_key_hash.copy_from_slice(&payload[1..]);
    Ok(pub_key_hash)
}
