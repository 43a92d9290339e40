// 交易输入的签名与验证 (SIGHASH_ALL)
// 签名哈希的原像与交易序列化相同，只是被签名输入的解锁脚本换成所花费输出的
// 锁定脚本，其它输入的脚本置空，末尾再追加 4 字节 hash type

use num_bigint::BigUint;
use tracing::{debug, info, warn};

use crate::ecc::{decode_compressed, encode_compressed, Curve, CurveArithmetic};
use crate::ecdsa::Ecdsa;
use crate::error::{BtcError, Result};
use crate::hash::{double_sha256, hash160};
use crate::keys::PrivateKey;
use crate::script::{ScriptPubKey, ScriptSig, SIGHASH_ALL};
use crate::serialize::{write_hash, write_u32_le, write_var_bytes, write_varint, Encodable};
use crate::transaction::{Transaction, TxOut};

// 为第 index 个输入构造待哈希的原像
pub fn serialize_for_signing(
    tx: &Transaction,
    index: usize,
    script_pub_key: &ScriptPubKey,
) -> Result<Vec<u8>> {
    if index >= tx.inputs.len() {
        return Err(BtcError::IndexOutOfRange {
            index,
            len: tx.inputs.len(),
        });
    }

    let mut out = Vec::new();
    write_u32_le(&mut out, tx.version);
    write_varint(&mut out, tx.inputs.len() as u64);
    for (i, input) in tx.inputs.iter().enumerate() {
        write_hash(&mut out, &input.prev_txid);
        write_u32_le(&mut out, input.vout);
        if i == index {
            write_var_bytes(&mut out, &script_pub_key.to_bytes());
        } else {
            write_varint(&mut out, 0);
        }
        write_u32_le(&mut out, input.sequence);
    }
    write_varint(&mut out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        output.encode(&mut out);
    }
    write_u32_le(&mut out, tx.locktime);
    write_u32_le(&mut out, SIGHASH_ALL as u32);
    Ok(out)
}

// 签名哈希 = double-SHA256(原像)，按大端整数参与 ECDSA
pub fn signature_hash(tx: &Transaction, index: usize, spent_output: &TxOut) -> Result<[u8; 32]> {
    let preimage = serialize_for_signing(tx, index, &spent_output.script_pub_key)?;
    Ok(double_sha256(&preimage))
}

// 在任意曲线上签名和验证交易输入
pub struct TransactionSigner<'a, C: CurveArithmetic> {
    ecdsa: Ecdsa<'a, C>,
}

impl<'a, C: CurveArithmetic> TransactionSigner<'a, C> {
    pub fn new(curve: &'a C) -> Self {
        TransactionSigner {
            ecdsa: Ecdsa::new(curve),
        }
    }

    // 依次签名全部输入，返回新的交易
    pub fn sign(
        &self,
        tx: &Transaction,
        spent_outputs: &[TxOut],
        secrets: &[BigUint],
    ) -> Result<Transaction> {
        // 与解码规则一致，没有输入或输出的交易不能签名
        if tx.inputs.is_empty() || tx.outputs.is_empty() {
            return Err(BtcError::EmptyTransaction);
        }
        if spent_outputs.len() != tx.inputs.len() || secrets.len() != tx.inputs.len() {
            return Err(BtcError::InvalidInput(format!(
                "输入数 {}, 花费的输出数 {}, 私钥数 {} 不一致",
                tx.inputs.len(),
                spent_outputs.len(),
                secrets.len()
            )));
        }

        let mut signed = tx.clone();
        for (index, (spent_output, secret)) in spent_outputs.iter().zip(secrets).enumerate() {
            signed = self.sign_input(&signed, index, spent_output, secret)?;
        }
        info!("交易签名完成: {} 个输入", signed.inputs.len());
        Ok(signed)
    }

    // 签名单个输入。已签名的输入不能再次签名
    pub fn sign_input(
        &self,
        tx: &Transaction,
        index: usize,
        spent_output: &TxOut,
        secret: &BigUint,
    ) -> Result<Transaction> {
        let input = tx.inputs.get(index).ok_or(BtcError::IndexOutOfRange {
            index,
            len: tx.inputs.len(),
        })?;
        if input.script_sig.is_signed() {
            return Err(BtcError::AlreadySigned(index));
        }

        let public_key = encode_compressed(&self.ecdsa.public_key(secret)?)?;
        let script_pub_key = &spent_output.script_pub_key;
        match script_pub_key {
            ScriptPubKey::P2pkh { pub_key_hash } if hash160(&public_key) != *pub_key_hash => {
                return Err(BtcError::InvalidKey(format!(
                    "私钥与输入 {} 花费的公钥哈希不匹配",
                    index
                )));
            }
            ScriptPubKey::P2pk { public_key: expected } if public_key != *expected => {
                return Err(BtcError::InvalidKey(format!(
                    "私钥与输入 {} 花费的公钥不匹配",
                    index
                )));
            }
            ScriptPubKey::Other(_) => {
                return Err(BtcError::InvalidScriptType(format!(
                    "无法为 {} 类型的输出签名",
                    script_pub_key.script_type()
                )));
            }
            _ => {}
        }

        let digest = signature_hash(tx, index, spent_output)?;
        let signature = self.ecdsa.sign_digest(&digest, secret)?;
        let script_sig = match script_pub_key {
            ScriptPubKey::P2pkh { .. } => ScriptSig::p2pkh(signature, public_key),
            _ => ScriptSig::p2pk(signature),
        };
        debug!("输入 {} 签名完成 ({})", index, script_sig.script_type());
        tx.with_script_sig(index, script_sig)
    }

    // 签名不成立返回 `Ok(false)`；脚本结构不合法时返回错误
    pub fn verify(&self, tx: &Transaction, index: usize, spent_output: &TxOut) -> Result<bool> {
        let input = tx.inputs.get(index).ok_or(BtcError::IndexOutOfRange {
            index,
            len: tx.inputs.len(),
        })?;

        let (signature, hash_type, public_key) = match (&input.script_sig, &spent_output.script_pub_key) {
            (
                ScriptSig::P2pkh {
                    signature,
                    hash_type,
                    public_key,
                },
                ScriptPubKey::P2pkh { pub_key_hash },
            ) => {
                if hash160(public_key) != *pub_key_hash {
                    warn!("输入 {} 的公钥与花费的公钥哈希不匹配", index);
                    return Ok(false);
                }
                (signature, *hash_type, public_key)
            }
            (
                ScriptSig::P2pk {
                    signature,
                    hash_type,
                },
                ScriptPubKey::P2pk { public_key },
            ) => (signature, *hash_type, public_key),
            (ScriptSig::Other(_), _) => {
                return Err(BtcError::MalformedDer(format!(
                    "输入 {} 的解锁脚本中没有可解析的签名",
                    index
                )));
            }
            (script_sig, script_pub_key) => {
                return Err(BtcError::InvalidScriptType(format!(
                    "{} 解锁脚本不能花费 {} 输出",
                    script_sig.script_type(),
                    script_pub_key.script_type()
                )));
            }
        };

        if hash_type != SIGHASH_ALL {
            warn!("输入 {} 使用了不支持的 hash type: {}", index, hash_type);
            return Ok(false);
        }

        let point = decode_compressed(self.ecdsa.curve(), public_key)?;
        let digest = signature_hash(tx, index, spent_output)?;
        let valid = self.ecdsa.verify_digest(&digest, signature, &point);
        if valid {
            debug!("输入 {} 签名验证通过", index);
        } else {
            warn!("输入 {} 签名验证失败", index);
        }
        Ok(valid)
    }
}

// 用 secp256k1 签名全部输入
pub fn sign_transaction(
    tx: &Transaction,
    spent_outputs: &[TxOut],
    private_keys: &[PrivateKey],
) -> Result<Transaction> {
    let secrets: Vec<BigUint> = private_keys.iter().map(PrivateKey::to_biguint).collect();
    TransactionSigner::new(Curve::secp256k1()).sign(tx, spent_outputs, &secrets)
}

pub fn verify_signature(tx: &Transaction, index: usize, spent_output: &TxOut) -> Result<bool> {
    TransactionSigner::new(Curve::secp256k1()).verify(tx, index, spent_output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::encode_der_signature;
    use crate::serialize::{hash_from_hex, Decodable};
    use crate::transaction::TxIn;

    const SPEND_TX: &str = "0200000001a3632ee302509fd89507dbcc340132544d1607a7e4a853e35ebc995d509b6113000000006a47304402203f7d777711a7406424535d96affc8279655918698f727557ad4fcb5aef7a8913022014d213385be262a75d23b1e592f58c702bdc0bc8d8f006d031051ced14dca48b012102de7badda902f573bddeab87d357d6d70f39c058875f0e05d4b52e4a0cc281ebffeffffff0258923f71000000001976a914802da8768a071f707e3d2713568ff4e3bfe6035288ac00e1f505000000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac66000000";
    const PREV_TX: &str = "0200000001a81a805a33bc1ea8236629ab04baf30ae871bd14a78afeee191114ad80e6e0f4000000004847304402203999487a9229f09fa12a7bd1257a5fdad08ab73d5c2bd7bf75f4cf8c1021bcb3022033aae41cbbeef9c0434baad4d30167445c115f96a6a7bd7ee76476fec431efd301feffffff0200853577000000001976a914a0c2e453aa3208555215254591054296a245dbca88ac005ed0b2000000001976a914250ed017660abdd723ed28a427fda68a6eb0a3f888ac65000000";
    // 花费 PREV_TX 第 1 个输出，由 TEST_WIF 签名
    const SECOND_SPEND_TX: &str = "0200000001a3632ee302509fd89507dbcc340132544d1607a7e4a853e35ebc995d509b6113010000006b483045022100e73cf45218a3a38f358b257fbaafbfa5ce18afed0111a255fe4e1bf4389662a30220761844c239c28ee3a7f57a5bf9ef71ce169d69a2b0625e2fe0b92c760b314562012102418f38e4eb8a96a25020739c0da0bfd843cdbc311ccda4b1a688f3541c212e61feffffff02586bdaac000000001976a914cf009cfd5d3fb83e9d87238310d0400fdaca487b88ac00e1f505000000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac66000000";
    const MAINNET_TX: &str = "01000000017f328ae9b46c631d38a7efb88ec0214519341cd5c0ed250fc88d20b47aa5f9c0010000006b483045022100843d0108b411452da23ce8b9041368300f11a042716a9ae8f3aaa2e5fe39654c022079864ef33971a7cef3aef4658c1d2dec5a5e27b5e7e41c5722fc192dd84472da0121029353adf8364a7fe132ba88267b163fc1e55773a99b06d2ae0a18ee706d73db3affffffff02404b4c00000000001976a9148bdeb16c87bd9f5ffeb24879cb2d61cfc60d5b3488ac4c842a13000000001976a914ff4a0e280823418752a883e0ba7ae8cbec46606a88ac00000000";
    const MAINNET_PREV_TX: &str = "0100000001608fd51af5b2b2601e5e03a768817ea33cd2b9594eabe63be18b0c36a7ff67d3010000006b4830450221008128192e9badf85332f8b1b7364728e7a39e9d76f516d6726b4856e8099b22fc0220106ab43d6eb531ebae8817ab2b96375229da73bc2e75aa1e88065e1cdbab9fe1012103fd0f9db55d71d43fe1ef48d88724ce1f454a93ce0294826c346920e1e6563415ffffffff0220300500000000001976a914093a094888bcf19767c48af29bd625e3d809ba1388ac641d7913000000001976a9145d88b5b3eaca46287b1e960b15c6d6af40eb83cb88ac00000000";
    const REGTEST_TX: &str = "02000000022defa4cc31ae5fb6b2c52c6a1c9f34e7429c3ed37fb6227869a4bcea94e0daa70000000049483045022100f8103217d8c7ef464e4580a312973d6070efb10d54f477e7aa2d29ccd3939fef022058f3631d7143b16075c9232912257b62ca4929da068c64cc2a424ad3455a5d8301feffffff80aa1fd1acc50dc41415c6ffe179059720732a075dfa2be275d7f4a8a16fb767000000006a4730440220018d1d05cdfb481ace05a82e5e91104a1cb92efb5c765c7b2aeda17a7e2114780220514bfe8f388c485846b2d10c347a12ce8d67ec705c203ec7e0e20627e338bc63012103c138b3dc8f9039199232177c8b11459fa402472373d1843f3935566c6ca4dd42feffffff02c896496b000000001976a91429e8633b1bed191b7adbe73628baec4d4451d65f88ac00d3fb2f010000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac43000000";
    const REGTEST_COINBASE_TX: &str = "02000000010000000000000000000000000000000000000000000000000000000000000000ffffffff03520101ffffffff0200f2052a01000000232102b6f24d800b6f31e5252df9101cd99bb9fe7cf80cfedbfa45366014f0d02c8250ac0000000000000000266a24aa21a9ede2f61c3f71d1defd3fa999dfa36953755c690689799962b48bebd836974e8cf900000000";
    const TEST_WIF: &str = "cRUmzVqx15eTrbJ55opBqwG9XbKMaTvNNySWSvZ8s4tEtbQDELUg";

    fn tx(hex_str: &str) -> Transaction {
        Transaction::from_hex(hex_str).unwrap()
    }

    // 待签名的交易：一个输入花费 spent，输出到固定地址
    fn unsigned_spend(spent: &Transaction, vout: u32) -> Result<Transaction> {
        let mut unsigned = Transaction::new(2, 0)?;
        unsigned.add_input(TxIn::new(spent.txid(), vout));
        unsigned.add_output(TxOut::new(
            99_000_000,
            ScriptPubKey::p2pkh(hash_from_hex_20("625d8e5d40a1b797b47cb66eee958724a668d8d2")),
        ));
        Ok(unsigned)
    }

    fn hash_from_hex_20(s: &str) -> [u8; 20] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_serialize_for_signing() -> Result<()> {
        let spend = tx(SPEND_TX);
        let prev = tx(PREV_TX);
        let preimage = serialize_for_signing(&spend, 0, &prev.outputs[0].script_pub_key)?;
        assert_eq!(
            hex::encode(preimage),
            "0200000001a3632ee302509fd89507dbcc340132544d1607a7e4a853e35ebc995d509b6113000000001976a914a0c2e453aa3208555215254591054296a245dbca88acfeffffff0258923f71000000001976a914802da8768a071f707e3d2713568ff4e3bfe6035288ac00e1f505000000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac6600000001000000"
        );

        let digest = signature_hash(&spend, 0, &prev.outputs[0])?;
        assert_eq!(
            BigUint::from_bytes_be(&digest),
            BigUint::parse_bytes(
                b"55810787963993017959789014082265465084317085514403090755484136402704087066930",
                10
            )
            .unwrap()
        );

        assert!(matches!(
            serialize_for_signing(&spend, 1, &prev.outputs[0].script_pub_key),
            Err(BtcError::IndexOutOfRange { index: 1, len: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_serialize_for_signing_second_output() -> Result<()> {
        let spend = tx(SECOND_SPEND_TX);
        let script = ScriptPubKey::parse(&hex::decode("76a914250ed017660abdd723ed28a427fda68a6eb0a3f888ac").unwrap());
        assert_eq!(
            hex::encode(serialize_for_signing(&spend, 0, &script)?),
            "0200000001a3632ee302509fd89507dbcc340132544d1607a7e4a853e35ebc995d509b6113010000001976a914250ed017660abdd723ed28a427fda68a6eb0a3f888acfeffffff02586bdaac000000001976a914cf009cfd5d3fb83e9d87238310d0400fdaca487b88ac00e1f505000000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac6600000001000000"
        );
        Ok(())
    }

    #[test]
    fn test_verify_fixture_p2pkh() -> Result<()> {
        let spend = tx(SPEND_TX);
        let prev = tx(PREV_TX);
        assert!(verify_signature(&spend, 0, &prev.outputs[0])?);
        // 公钥哈希不符
        assert!(!verify_signature(&spend, 0, &prev.outputs[1])?);

        let second = tx(SECOND_SPEND_TX);
        assert!(verify_signature(&second, 0, &prev.outputs[1])?);
        Ok(())
    }

    #[test]
    fn test_verify_mainnet_transaction() -> Result<()> {
        let spend = tx(MAINNET_TX);
        let prev = tx(MAINNET_PREV_TX);
        assert_eq!(prev.txid(), spend.inputs[0].prev_txid);
        assert!(verify_signature(&spend, 0, &prev.outputs[1])?);
        Ok(())
    }

    #[test]
    fn test_verify_p2pk_and_chained_p2pkh() -> Result<()> {
        let spend = tx(REGTEST_TX);
        let coinbase = tx(REGTEST_COINBASE_TX);
        assert_eq!(coinbase.txid(), spend.inputs[0].prev_txid);
        assert!(verify_signature(&spend, 0, &coinbase.outputs[0])?);

        // 第二个输入花费 SPEND_TX 的第 0 个输出
        let parent = tx(SPEND_TX);
        assert_eq!(parent.txid(), spend.inputs[1].prev_txid);
        assert!(verify_signature(&spend, 1, &parent.outputs[0])?);
        Ok(())
    }

    #[test]
    fn test_verify_tampered_transaction() -> Result<()> {
        let mut spend = tx(SPEND_TX);
        let prev = tx(PREV_TX);
        spend.outputs[0].value += 1;
        assert!(!verify_signature(&spend, 0, &prev.outputs[0])?);
        Ok(())
    }

    #[test]
    fn test_verify_structural_errors() -> Result<()> {
        let spend = tx(SPEND_TX);
        let prev = tx(PREV_TX);
        let coinbase = tx(REGTEST_COINBASE_TX);

        assert!(matches!(
            verify_signature(&spend, 3, &prev.outputs[0]),
            Err(BtcError::IndexOutOfRange { index: 3, len: 1 })
        ));
        // P2PKH 签名不能花费 P2PK 输出
        assert!(matches!(
            verify_signature(&spend, 0, &coinbase.outputs[0]),
            Err(BtcError::InvalidScriptType(_))
        ));
        // 没有签名的输入
        assert!(matches!(
            verify_signature(&coinbase, 0, &prev.outputs[0]),
            Err(BtcError::MalformedDer(_))
        ));
        Ok(())
    }

    #[test]
    fn test_sign_p2pkh_and_verify() -> Result<()> {
        let prev = tx(PREV_TX);
        let (key, _) = PrivateKey::from_wif(TEST_WIF)?;
        let unsigned = unsigned_spend(&prev, 1)?;

        let signed = sign_transaction(&unsigned, &[prev.outputs[1].clone()], &[key.clone()])?;
        let script_sig = &signed.inputs[0].script_sig;
        assert_eq!(script_sig.public_key(), Some(key.public_key()?.as_bytes()));
        assert!(verify_signature(&signed, 0, &prev.outputs[1])?);
        assert!(!verify_signature(&signed, 0, &prev.outputs[0])?);

        // 经过序列化再解析仍然有效
        let decoded = Transaction::from_bytes(&signed.to_bytes())?;
        assert_eq!(decoded, signed);
        assert!(verify_signature(&decoded, 0, &prev.outputs[1])?);

        // 原交易未被修改
        assert!(!unsigned.inputs[0].script_sig.is_signed());
        Ok(())
    }

    #[test]
    fn test_signature_accepted_by_libsecp256k1() -> Result<()> {
        let prev = tx(PREV_TX);
        let (key, _) = PrivateKey::from_wif(TEST_WIF)?;
        let unsigned = unsigned_spend(&prev, 1)?;
        let signed = sign_transaction(&unsigned, &[prev.outputs[1].clone()], &[key.clone()])?;

        let signature = signed.inputs[0].script_sig.signature().unwrap();
        let mut der = encode_der_signature(signature, SIGHASH_ALL);
        der.pop();

        let digest = signature_hash(&signed, 0, &prev.outputs[1])?;
        let secp = secp256k1::Secp256k1::verification_only();
        let message = secp256k1::Message::from_slice(&digest)?;
        let sig = secp256k1::ecdsa::Signature::from_der(&der)?;
        let public_key = secp256k1::PublicKey::from_slice(key.public_key()?.as_bytes())?;
        assert!(secp.verify_ecdsa(&message, &sig, &public_key).is_ok());
        Ok(())
    }

    #[test]
    fn test_sign_p2pk_output() -> Result<()> {
        let key = PrivateKey::generate();
        let public_key = key.public_key()?;
        let mut funding = Transaction::new(2, 0)?;
        funding.add_input(TxIn::new([0u8; 32], 0xFFFF_FFFF));
        funding.add_output(TxOut::new(50_000, ScriptPubKey::p2pk(*public_key.as_bytes())));

        let unsigned = unsigned_spend(&funding, 0)?;
        let signed = sign_transaction(&unsigned, &funding.outputs, &[key])?;
        assert_eq!(
            signed.inputs[0].script_sig.script_type(),
            crate::script::ScriptType::P2pk
        );
        assert!(verify_signature(&signed, 0, &funding.outputs[0])?);
        Ok(())
    }

    #[test]
    fn test_sign_errors() -> Result<()> {
        let prev = tx(PREV_TX);
        let (key, _) = PrivateKey::from_wif(TEST_WIF)?;
        let unsigned = unsigned_spend(&prev, 1)?;
        let outputs = [prev.outputs[1].clone()];

        // 已签名
        let signed = sign_transaction(&unsigned, &outputs, &[key.clone()])?;
        assert!(matches!(
            sign_transaction(&signed, &outputs, &[key.clone()]),
            Err(BtcError::AlreadySigned(0))
        ));

        // 数量不一致
        assert!(matches!(
            sign_transaction(&unsigned, &outputs, &[]),
            Err(BtcError::InvalidInput(_))
        ));

        // 不支持的输出类型
        let other = TxOut::new(1, ScriptPubKey::Other(vec![0x6a]));
        assert!(matches!(
            sign_transaction(&unsigned, &[other], &[key.clone()]),
            Err(BtcError::InvalidScriptType(_))
        ));

        // 没有输出的交易
        let mut no_outputs = unsigned.clone();
        no_outputs.outputs.clear();
        assert!(matches!(
            sign_transaction(&no_outputs, &outputs, &[key.clone()]),
            Err(BtcError::EmptyTransaction)
        ));
        assert!(matches!(
            Transaction::from_bytes(&no_outputs.to_bytes()),
            Err(BtcError::EmptyTransaction)
        ));

        // 没有输入的交易
        let mut no_inputs = unsigned.clone();
        no_inputs.inputs.clear();
        assert!(matches!(
            sign_transaction(&no_inputs, &[], &[]),
            Err(BtcError::EmptyTransaction)
        ));

        // 私钥与公钥哈希不匹配
        assert!(matches!(
            sign_transaction(&unsigned, &[prev.outputs[0].clone()], &[key]),
            Err(BtcError::InvalidKey(_))
        ));
        Ok(())
    }

    #[test]
    fn test_sign_two_inputs() -> Result<()> {
        let first = PrivateKey::generate();
        let second = PrivateKey::generate();
        let spent = vec![
            TxOut::new(1_000, ScriptPubKey::p2pkh(first.public_key()?.hash160())),
            TxOut::new(2_000, ScriptPubKey::p2pk(*second.public_key()?.as_bytes())),
        ];

        let mut unsigned = Transaction::new(1, 0)?;
        unsigned.add_input(TxIn::new(hash_from_hex("13619b505d99bc5ee353a8e4a707164d54320134ccdb0795d89f5002e32e63a3")?, 0));
        unsigned.add_input(TxIn::new(hash_from_hex("67b76fa1a8f4d775e22bfa5d072a7320970579e1ffc61514c40dc5acd11faa80")?, 1));
        unsigned.add_output(TxOut::new(2_500, ScriptPubKey::p2pkh(first.public_key()?.hash160())));

        let signed = sign_transaction(&unsigned, &spent, &[first, second])?;
        assert!(verify_signature(&signed, 0, &spent[0])?);
        assert!(verify_signature(&signed, 1, &spent[1])?);
        // P2PKH 解锁脚本对 P2PK 输出
        assert!(verify_signature(&signed, 0, &spent[1]).is_err());
        Ok(())
    }

    #[test]
    fn test_demo_curve_signer() -> Result<()> {
        let curve = Curve::demo();
        let signer = TransactionSigner::new(curve);
        let secret = BigUint::from(123u32);
        let public_key = encode_compressed(&Ecdsa::new(curve).public_key(&secret)?)?;

        let spent = TxOut::new(5_000, ScriptPubKey::p2pk(public_key));
        let mut unsigned = Transaction::new(2, 0)?;
        unsigned.add_input(TxIn::new([0x11; 32], 0));
        unsigned.add_output(TxOut::new(4_000, ScriptPubKey::Other(vec![0x51])));

        let signed = signer.sign(&unsigned, &[spent.clone()], &[secret])?;
        assert!(signer.verify(&signed, 0, &spent)?);
        // 同一签名在 secp256k1 上解不出公钥
        assert!(!matches!(verify_signature(&signed, 0, &spent), Ok(true)));
        Ok(())
    }

    #[test]
    fn test_testnet_address_of_signer() -> Result<()> {
        let (key, network) = PrivateKey::from_wif(TEST_WIF)?;
        let prev = tx(PREV_TX);
        assert_eq!(
            Some(&key.public_key()?.hash160()),
            prev.outputs[1].script_pub_key.pub_key_hash()
        );
        assert_eq!(key.public_key()?.address(network), "mitu3NFAd83mPQnVVu6k1yd47VWLJ9JATd");
        Ok(())
    }
}
