use thiserror::Error;

#[derive(Error, Debug)]
pub enum BtcError {
    #[error("数据截断: 需要 {needed} 字节, 剩余 {remaining} 字节")]
    Truncated { needed: usize, remaining: usize },

    #[error("无效的交易版本: {0}")]
    InvalidVersion(u32),

    #[error("校验和不匹配")]
    ChecksumMismatch,

    #[error("DER签名格式错误: {0}")]
    MalformedDer(String),

    #[error("无法处理的脚本类型: {0}")]
    InvalidScriptType(String),

    #[error("无效脚本: {0}")]
    InvalidScript(String),

    #[error("不支持的曲线点: {0}")]
    UnsupportedCurvePoint(String),

    #[error("区块不包含任何交易")]
    EmptyBlock,

    #[error("交易不包含输入或输出")]
    EmptyTransaction,

    #[error("尾部存在 {0} 字节多余数据")]
    TrailingData(usize),

    #[error("输入序号越界: {index} (共 {len} 个)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("输入 {0} 已经签名")]
    AlreadySigned(usize),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效密钥: {0}")]
    InvalidKey(String),

    #[error("无效地址: {0}")]
    InvalidAddress(String),

    #[error("Base58解码错误: {0}")]
    Base58(String),

    #[error("十六进制解码错误: {0}")]
    Hex(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("IO错误: {0}")]
    IOError(String),

    #[error("序列化错误: {0}")]
    SerializationError(String),

    #[error("其他错误: {0}")]
    Other(String),
}

impl From<std::io::Error> for BtcError {
    fn from(err: std::io::Error) -> Self {
        BtcError::IOError(err.to_string())
    }
}

impl From<serde_json::Error> for BtcError {
    fn from(err: serde_json::Error) -> Self {
        BtcError::SerializationError(err.to_string())
    }
}

impl From<hex::FromHexError> for BtcError {
    fn from(err: hex::FromHexError) -> Self {
        BtcError::Hex(err.to_string())
    }
}

impl From<bs58::decode::Error> for BtcError {
    fn from(err: bs58::decode::Error) -> Self {
        BtcError::Base58(err.to_string())
    }
}

impl From<secp256k1::Error> for BtcError {
    fn from(err: secp256k1::Error) -> Self {
        BtcError::InvalidKey(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BtcError>;
