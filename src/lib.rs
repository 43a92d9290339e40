// 导出所有模块
pub mod block;
pub mod config;
pub mod ecc;
pub mod ecdsa;
pub mod error;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod mining;
pub mod pow;
pub mod script;
pub mod serialize;
pub mod signing;
pub mod transaction;

// 导出常用类型
pub use block::{Block, BlockHeader, ByteOrder};
pub use config::Config;
pub use ecc::{Curve, CurveArithmetic, Point};
pub use ecdsa::{Ecdsa, Signature};
pub use error::{BtcError, Result};
pub use keys::{address_to_pub_key_hash, Network, PrivateKey, PublicKey};
pub use merkle::MerkleTree;
pub use mining::{check_block, create_coinbase_transaction, create_new_block};
pub use pow::{check_pow, difficulty, ProofOfWork};
pub use script::{ScriptPubKey, ScriptSig, ScriptType};
pub use serialize::{Decodable, Encodable};
pub use signing::{sign_transaction, signature_hash, verify_signature, TransactionSigner};
pub use transaction::{Transaction, TxIn, TxOut};
