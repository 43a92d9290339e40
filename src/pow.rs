use num_bigint::BigUint;
use tracing::{debug, info, warn};

use crate::block::{Block, BlockHeader, ByteOrder};

// 解码紧凑格式的目标值：coefficient × 256^(exponent − 3)
pub fn bits_to_target(bits: u32) -> BigUint {
    let exponent = bits >> 24;
    let coefficient = BigUint::from(bits & 0x00FF_FFFF);
    if exponent >= 3 {
        coefficient << (8 * (exponent - 3) as usize)
    } else {
        coefficient >> (8 * (3 - exponent) as usize)
    }
}

// 难度 256^(29 − exponent) × (65535 / coefficient)，只用于显示
pub fn difficulty(bits: u32) -> f64 {
    let exponent = (bits >> 24) as i32;
    let coefficient = (bits & 0x00FF_FFFF) as f64;
    256f64.powi(29 - exponent) * (65535.0 / coefficient)
}

// 区块哈希不超过区块头中的目标，且区块头的 bits 等于当前 bits
pub fn check_pow(block: &Block, bits: u32) -> bool {
    let pow = ProofOfWork::new(block.header.bits);
    if !pow.validate(&block.header) {
        return false;
    }
    if block.header.bits != bits {
        warn!(
            "区块 bits {:#010x} 与当前 bits {:#010x} 不一致",
            block.header.bits, bits
        );
        return false;
    }
    true
}

pub struct ProofOfWork {
    bits: u32,
    target: BigUint,
}

impl ProofOfWork {
    pub fn new(bits: u32) -> Self {
        ProofOfWork {
            bits,
            target: bits_to_target(bits),
        }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn target(&self) -> &BigUint {
        &self.target
    }

    // 递增 nonce 直到区块头满足目标，超过 max_attempts 次仍未找到时返回 None
    pub fn run(&self, header: &mut BlockHeader, max_attempts: u32) -> Option<u32> {
        header.bits = self.bits;
        info!("开始挖矿，目标: {:#x}", self.target);
        for attempt in 1..=max_attempts {
            header.nonce = attempt;
            if self.validate(header) {
                info!("区块已挖出！Nonce: {}, Hash: {}", header.nonce, header.block_id());
                return Some(header.nonce);
            }
            if attempt % 100_000 == 0 {
                debug!("挖矿尝试次数: {}", attempt);
            }
        }
        warn!("{} 次尝试后仍未找到满足目标的 nonce", max_attempts);
        None
    }

    // 区块头哈希（按大端整数）是否不超过目标
    pub fn validate(&self, header: &BlockHeader) -> bool {
        let hash = BigUint::from_bytes_be(&header.block_hash(ByteOrder::Big));
        if hash > self.target {
            debug!("区块哈希 {} 超过目标", header.block_id());
            return false;
        }
        true
    }
}
