use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{BtcError, Result};
use crate::hash::double_sha256;
use crate::merkle::merkle_root;
use crate::serialize::{
    hex_bytes, reversed, write_hash, write_u32_le, write_varint, ByteReader, Decodable, Encodable,
};
use crate::transaction::Transaction;

// 区块头序列化后的固定长度
pub const HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    // 内部（线上）顺序
    Little,
    // 显示顺序
    Big,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    // 前一区块ID（显示顺序）
    #[serde(with = "hex_bytes")]
    pub prev_block_id: [u8; 32],
    // Merkle 根（显示顺序）
    #[serde(with = "hex_bytes")]
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    // 区块哈希 double-SHA256(header)，按要求的字节顺序返回
    pub fn block_hash(&self, order: ByteOrder) -> [u8; 32] {
        let hash = double_sha256(&self.to_bytes());
        match order {
            ByteOrder::Little => hash,
            ByteOrder::Big => reversed(&hash),
        }
    }

    pub fn block_id(&self) -> String {
        hex::encode(self.block_hash(ByteOrder::Big))
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_le(out, self.version);
        write_hash(out, &self.prev_block_id);
        write_hash(out, &self.merkle_root);
        write_u32_le(out, self.time);
        write_u32_le(out, self.bits);
        write_u32_le(out, self.nonce);
    }
}

impl Decodable for BlockHeader {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(BlockHeader {
            version: reader.read_u32_le()?,
            prev_block_id: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            time: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    // 没有交易的区块，Merkle 根需要在加入交易后通过 `update_merkle_root` 计算
    pub fn new(version: u32, prev_block_id: [u8; 32], time: u32, bits: u32, nonce: u32) -> Self {
        Block {
            header: BlockHeader {
                version,
                prev_block_id,
                merkle_root: [0u8; 32],
                time,
                bits,
                nonce,
            },
            transactions: Vec::new(),
        }
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn block_hash(&self, order: ByteOrder) -> [u8; 32] {
        self.header.block_hash(order)
    }

    pub fn block_id(&self) -> String {
        self.header.block_id()
    }

    // 由当前交易列表计算的 Merkle 根（显示顺序）
    pub fn merkle_root(&self) -> Result<[u8; 32]> {
        let leaves: Vec<[u8; 32]> = self.transactions.iter().map(Transaction::hash).collect();
        merkle_root(&leaves)
            .map(|root| reversed(&root))
            .ok_or(BtcError::EmptyBlock)
    }

    // 重新计算并覆盖区块头中的 Merkle 根。修改交易列表后必须调用
    pub fn update_merkle_root(&mut self) -> Result<()> {
        self.header.merkle_root = self.merkle_root()?;
        debug!("更新 Merkle 根: {}", hex::encode(self.header.merkle_root));
        Ok(())
    }

    // 区块头中的 Merkle 根是否与交易列表一致
    pub fn has_valid_merkle_root(&self) -> bool {
        match self.merkle_root() {
            Ok(root) if root == self.header.merkle_root => true,
            Ok(root) => {
                error!(
                    "Merkle 根不匹配，区块头: {}, 计算值: {}",
                    hex::encode(self.header.merkle_root),
                    hex::encode(root)
                );
                false
            }
            Err(_) => {
                error!("区块不包含任何交易");
                false
            }
        }
    }
}

impl Encodable for Block {
    fn encode(&self, out: &mut Vec<u8>) {
        self.header.encode(out);
        write_varint(out, self.transactions.len() as u64);
        for tx in &self.transactions {
            tx.encode(out);
        }
    }
}

impl Decodable for Block {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let header = BlockHeader::decode(reader)?;
        let tx_count = reader.read_varint()?;
        if tx_count == 0 {
            error!("区块 {} 不包含任何交易", header.block_id());
            return Err(BtcError::EmptyBlock);
        }

        let mut transactions = Vec::new();
        for _ in 0..tx_count {
            transactions.push(Transaction::decode(reader)?);
        }
        info!("解码区块: {} ({} 笔交易)", header.block_id(), transactions.len());
        Ok(Block {
            header,
            transactions,
        })
    }
}
