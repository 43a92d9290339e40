use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{BtcError, Result};
use crate::hash::double_sha256;
use crate::script::{ScriptPubKey, ScriptSig};
use crate::serialize::{
    hex_bytes, reversed, write_hash, write_u32_le, write_u64_le, write_var_bytes, write_varint,
    ByteReader, Decodable, Encodable,
};

// coinbase 输入引用的输出序号
pub const COINBASE_VOUT: u32 = 0xFFFF_FFFF;
pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    // 前一笔交易的ID（显示顺序）
    #[serde(with = "hex_bytes")]
    pub prev_txid: [u8; 32],
    pub vout: u32,
    pub script_sig: ScriptSig,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prev_txid: [u8; 32], vout: u32) -> Self {
        TxIn {
            prev_txid,
            vout,
            script_sig: ScriptSig::empty(),
            sequence: DEFAULT_SEQUENCE,
        }
    }

    pub fn with_script_sig(mut self, script_sig: ScriptSig) -> Self {
        self.script_sig = script_sig;
        self
    }

    // 前一笔交易ID全为零即为 coinbase 输入
    pub fn is_coinbase(&self) -> bool {
        self.prev_txid.iter().all(|b| *b == 0)
    }
}

impl Encodable for TxIn {
    fn encode(&self, out: &mut Vec<u8>) {
        write_hash(out, &self.prev_txid);
        write_u32_le(out, self.vout);
        write_var_bytes(out, &self.script_sig.to_bytes());
        write_u32_le(out, self.sequence);
    }
}

impl Decodable for TxIn {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let prev_txid = reader.read_hash()?;
        let vout = reader.read_u32_le()?;
        let script_sig = ScriptSig::parse(reader.read_var_bytes()?);
        let sequence = reader.read_u32_le()?;
        Ok(TxIn {
            prev_txid,
            vout,
            script_sig,
            sequence,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    // 金额，单位聪
    pub value: u64,
    pub script_pub_key: ScriptPubKey,
}

impl TxOut {
    pub fn new(value: u64, script_pub_key: ScriptPubKey) -> Self {
        TxOut {
            value,
            script_pub_key,
        }
    }
}

impl Encodable for TxOut {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u64_le(out, self.value);
        write_var_bytes(out, &self.script_pub_key.to_bytes());
    }
}

impl Decodable for TxOut {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let value = reader.read_u64_le()?;
        let script_pub_key = ScriptPubKey::parse(reader.read_var_bytes()?);
        Ok(TxOut {
            value,
            script_pub_key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
}

fn check_version(version: u32) -> Result<()> {
    if version != 1 && version != 2 {
        error!("不支持的交易版本: {}", version);
        return Err(BtcError::InvalidVersion(version));
    }
    Ok(())
}

impl Transaction {
    // 创建没有输入输出的交易，版本只能是 1 或 2
    pub fn new(version: u32, locktime: u32) -> Result<Transaction> {
        check_version(version)?;
        Ok(Transaction {
            version,
            inputs: Vec::new(),
            outputs: Vec::new(),
            locktime,
        })
    }

    pub fn add_input(&mut self, input: TxIn) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TxOut) {
        self.outputs.push(output);
    }

    // 返回替换了第 index 个输入解锁脚本的新交易，原交易不变
    pub fn with_script_sig(&self, index: usize, script_sig: ScriptSig) -> Result<Transaction> {
        if index >= self.inputs.len() {
            return Err(BtcError::IndexOutOfRange {
                index,
                len: self.inputs.len(),
            });
        }
        let mut tx = self.clone();
        tx.inputs[index].script_sig = script_sig;
        Ok(tx)
    }

    // 内部字节序的 double-SHA256，Merkle 树的叶子
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.to_bytes())
    }

    pub fn txid(&self) -> [u8; 32] {
        reversed(&self.hash())
    }

    pub fn txid_hex(&self) -> String {
        hex::encode(self.txid())
    }

    // 唯一的输入引用全零交易ID的 0xFFFFFFFF 号输出
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => input.is_coinbase() && input.vout == COINBASE_VOUT,
            _ => false,
        }
    }

    // 所有输出金额之和，溢出时返回 None
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, output| acc.checked_add(output.value))
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut Vec<u8>) {
        write_u32_le(out, self.version);
        write_varint(out, self.inputs.len() as u64);
        for input in &self.inputs {
            input.encode(out);
        }
        write_varint(out, self.outputs.len() as u64);
        for output in &self.outputs {
            output.encode(out);
        }
        write_u32_le(out, self.locktime);
    }
}

impl Decodable for Transaction {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let version = reader.read_u32_le()?;
        check_version(version)?;

        let input_count = reader.read_varint()?;
        if input_count == 0 {
            return Err(BtcError::EmptyTransaction);
        }
        let mut inputs = Vec::new();
        for _ in 0..input_count {
            inputs.push(TxIn::decode(reader)?);
        }

        let output_count = reader.read_varint()?;
        if output_count == 0 {
            return Err(BtcError::EmptyTransaction);
        }
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(TxOut::decode(reader)?);
        }

        let locktime = reader.read_u32_le()?;
        let tx = Transaction {
            version,
            inputs,
            outputs,
            locktime,
        };
        debug!(
            "解码交易: {} ({} 个输入, {} 个输出)",
            tx.txid_hex(),
            tx.inputs.len(),
            tx.outputs.len()
        );
        Ok(tx)
    }
}
