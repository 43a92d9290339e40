use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut result = [0u8; 32];
    result.copy_from_slice(&Sha256::digest(data));
    result
}

// SHA256(SHA256(data))，用于交易ID、区块哈希、Merkle树和签名哈希
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

// RIPEMD160(SHA256(data))，即公钥哈希
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256(data));
    let mut result = [0u8; 20];
    result.copy_from_slice(&hasher.finalize());
    result
}
