// 比特币线格式的基础编解码：VarInt、小端整数和32字节哈希
// 哈希字段在内存中以显示顺序（大端）保存，写入线格式时反转为小端，
// 读取时再反转回来

use crate::error::{BtcError, Result};

// 将 u64 编码为最短形式的 VarInt
// - 0x00-0xfc: 1 字节
// - 0xfd + 2 字节小端: 最大 0xffff
// - 0xfe + 4 字节小端: 最大 0xffffffff
// - 0xff + 8 字节小端: 其余
pub fn encode_varint(n: u64) -> Vec<u8> {
    match n {
        0..=0xfc => vec![n as u8],
        0xfd..=0xffff => {
            let mut result = vec![0xfd];
            result.extend_from_slice(&(n as u16).to_le_bytes());
            result
        }
        0x10000..=0xffff_ffff => {
            let mut result = vec![0xfe];
            result.extend_from_slice(&(n as u32).to_le_bytes());
            result
        }
        _ => {
            let mut result = vec![0xff];
            result.extend_from_slice(&n.to_le_bytes());
            result
        }
    }
}

// 解码 VarInt，返回 `(值, 消耗字节数)`
// 宽度完全由前缀字节决定，不拒绝非最短编码
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut reader = ByteReader::new(data);
    let value = reader.read_varint()?;
    Ok((value, reader.position()))
}

pub fn write_varint(out: &mut Vec<u8>, n: u64) {
    out.extend_from_slice(&encode_varint(n));
}

pub fn write_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u64_le(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

// 以线格式写入显示顺序的哈希（即反转后写入）
pub fn write_hash(out: &mut Vec<u8>, hash: &[u8; 32]) {
    out.extend_from_slice(&reversed(hash));
}

pub fn write_var_bytes(out: &mut Vec<u8>, data: &[u8]) {
    write_varint(out, data.len() as u64);
    out.extend_from_slice(data);
}

pub fn reversed(hash: &[u8; 32]) -> [u8; 32] {
    let mut result = *hash;
    result.reverse();
    result
}

// 从十六进制字符串解析显示顺序的32字节哈希
pub fn hash_from_hex(s: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(s.trim())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| BtcError::InvalidInput(format!("哈希长度应为32字节, 实际 {}", b.len())))
}

// 在字节切片上按顺序读取的游标
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(BtcError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.read_bytes(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_bytes(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        match self.read_u8()? {
            0xfd => Ok(self.read_u16_le()? as u64),
            0xfe => Ok(self.read_u32_le()? as u64),
            0xff => self.read_u64_le(),
            n => Ok(n as u64),
        }
    }

    // 读取线格式的32字节哈希，并转换为显示顺序
    pub fn read_hash(&mut self) -> Result<[u8; 32]> {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(self.read_bytes(32)?);
        hash.reverse();
        Ok(hash)
    }

    pub fn read_var_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        if len > self.remaining() as u64 {
            return Err(BtcError::Truncated {
                needed: usize::try_from(len).unwrap_or(usize::MAX),
                remaining: self.remaining(),
            });
        }
        self.read_bytes(len as usize)
    }
}

pub trait Encodable {
    fn encode(&self, out: &mut Vec<u8>);

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

// 按比特币线格式解码。结构错误立即返回错误，不产生部分对象
pub trait Decodable: Sized {
    fn decode(reader: &mut ByteReader<'_>) -> Result<Self>;

    // 解码完整的字节串，多余的尾部数据视为错误
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let value = Self::decode(&mut reader)?;
        if !reader.is_empty() {
            return Err(BtcError::TrailingData(reader.remaining()));
        }
        Ok(value)
    }

    fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s.trim())?)
    }
}

// serde 辅助：字节字段按十六进制字符串输出
pub mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<Vec<u8>>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        let len = bytes.len();
        T::try_from(bytes).map_err(|_| D::Error::custom(format!("字节长度不符: {}", len)))
    }
}

// serde 辅助：大整数按大端十六进制输出
pub mod hex_biguint {
    use num_bigint::BigUint;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.to_bytes_be()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        Ok(BigUint::from_bytes_be(&bytes))
    }
}
