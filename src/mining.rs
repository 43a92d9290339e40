// 挖矿辅助：coinbase 交易、区块模板与区块结构检查

use tracing::{debug, error, info};

use crate::block::Block;
use crate::error::{BtcError, Result};
use crate::keys::address_to_pub_key_hash;
use crate::script::{ScriptPubKey, ScriptSig};
use crate::transaction::{Transaction, TxIn, TxOut, COINBASE_VOUT};

// 新区块头的版本号
pub const BLOCK_VERSION: u32 = 0x2000_0000;
const COINBASE_TX_VERSION: u32 = 2;
const INITIAL_NONCE: u32 = 1;

// 创建向 address 支付 value 聪的 coinbase 交易
// 解锁脚本先放入新区块高度 (BIP34)，再放入同样取值的 extra nonce，都是 4 字节小端
pub fn create_coinbase_transaction(
    address: &str,
    current_height: u32,
    value: u64,
) -> Result<Transaction> {
    let pub_key_hash = address_to_pub_key_hash(address)?;
    let height = current_height
        .checked_add(1)
        .ok_or_else(|| BtcError::InvalidInput(format!("区块高度溢出: {}", current_height)))?;

    let mut script_sig = ScriptSig::empty();
    script_sig.push_data(&height.to_le_bytes())?;
    script_sig.push_data(&height.to_le_bytes())?;

    let mut coinbase = Transaction::new(COINBASE_TX_VERSION, 0)?;
    coinbase.add_input(TxIn::new([0u8; 32], COINBASE_VOUT).with_script_sig(script_sig));
    coinbase.add_output(TxOut::new(value, ScriptPubKey::p2pkh(pub_key_hash)));
    debug!("创建 coinbase 交易: {}, 高度 {}", coinbase.txid_hex(), height);
    Ok(coinbase)
}

// 组装新区块：coinbase 在前，随后是 txs，并更新 Merkle 根
// nonce 为初始值，区块还不满足工作量证明
pub fn create_new_block(
    address: &str,
    prev_block_id: [u8; 32],
    current_height: u32,
    value: u64,
    bits: u32,
    txs: Vec<Transaction>,
    time: u32,
) -> Result<Block> {
    if let Some(index) = txs.iter().position(Transaction::is_coinbase) {
        return Err(BtcError::InvalidInput(format!(
            "第 {} 笔交易是 coinbase 交易",
            index
        )));
    }

    let mut block = Block::new(BLOCK_VERSION, prev_block_id, time, bits, INITIAL_NONCE);
    block.add_transaction(create_coinbase_transaction(address, current_height, value)?);
    for tx in txs {
        block.add_transaction(tx);
    }
    block.update_merkle_root()?;
    info!(
        "创建新区块，前置区块: {}, 交易数: {}",
        hex::encode(prev_block_id),
        block.transactions.len()
    );
    Ok(block)
}

// 检查区块结构，不检查工作量证明
pub fn check_block(block: &Block, current_last_block: &[u8; 32]) -> bool {
    if block.header.prev_block_id != *current_last_block {
        error!(
            "前置区块 {} 不是当前最新区块 {}",
            hex::encode(block.header.prev_block_id),
            hex::encode(current_last_block)
        );
        return false;
    }

    match block.transactions.first() {
        Some(tx) if tx.is_coinbase() => {}
        Some(_) => {
            error!("区块的第一笔交易不是coinbase交易");
            return false;
        }
        None => {
            error!("区块不包含任何交易");
            return false;
        }
    }

    if let Some(index) = block.transactions.iter().skip(1).position(Transaction::is_coinbase) {
        error!("第 {} 笔交易是多余的coinbase交易", index + 1);
        return false;
    }

    if !block.has_valid_merkle_root() {
        return false;
    }

    debug!("区块 {} 结构检查通过", block.block_id());
    true
}
