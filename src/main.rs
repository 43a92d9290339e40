use tracing::info;

use rust_btc_codec::{
    check_pow, difficulty,
    error::Result,
    serialize::hash_from_hex,
    sign_transaction, verify_signature, Block, Config, Decodable, Encodable, PrivateKey,
    ScriptPubKey, Transaction, TxIn, TxOut,
};

const SPEND_TX: &str = "0200000001a3632ee302509fd89507dbcc340132544d1607a7e4a853e35ebc995d509b6113000000006a47304402203f7d777711a7406424535d96affc8279655918698f727557ad4fcb5aef7a8913022014d213385be262a75d23b1e592f58c702bdc0bc8d8f006d031051ced14dca48b012102de7badda902f573bddeab87d357d6d70f39c058875f0e05d4b52e4a0cc281ebffeffffff0258923f71000000001976a914802da8768a071f707e3d2713568ff4e3bfe6035288ac00e1f505000000001976a914625d8e5d40a1b797b47cb66eee958724a668d8d288ac66000000";
const PREV_TX: &str = "0200000001a81a805a33bc1ea8236629ab04baf30ae871bd14a78afeee191114ad80e6e0f4000000004847304402203999487a9229f09fa12a7bd1257a5fdad08ab73d5c2bd7bf75f4cf8c1021bcb3022033aae41cbbeef9c0434baad4d30167445c115f96a6a7bd7ee76476fec431efd301feffffff0200853577000000001976a914a0c2e453aa3208555215254591054296a245dbca88ac005ed0b2000000001976a914250ed017660abdd723ed28a427fda68a6eb0a3f888ac65000000";
const BLOCK: &str = "00000020df9e03f6f3b6089704150a0627841c9fb86adbf265fc8f31c95bb6b99e4a604c187d9b8d7dad469812834e9f4f72af649656b4179880d0102499118c7fd488d9bc69b65affff7f20030000000102000000010000000000000000000000000000000000000000000000000000000000000000ffffffff04016b0101ffffffff0200f2052a01000000232103bacc76145b9800c24b519cf659e6add26db1ea0b23806ae361f058e67d84bd04ac0000000000000000266a24aa21a9ede2f61c3f71d1defd3fa999dfa36953755c690689799962b48bebd836974e8cf900000000";

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn test_fixtures() -> Result<()> {
    info!("解码示例交易...");
    let spend = Transaction::from_hex(SPEND_TX)?;
    let prev = Transaction::from_hex(PREV_TX)?;
    info!("交易ID: {}", spend.txid_hex());
    println!("{}", to_json(&spend)?);

    let valid = verify_signature(&spend, 0, &prev.outputs[0])?;
    info!("示例交易签名验证: {}", valid);

    info!("解码示例区块...");
    let block = Block::from_hex(BLOCK)?;
    info!("区块ID: {}", block.block_id());
    info!(
        "工作量证明: {}, 难度: {:e}",
        check_pow(&block, block.header.bits),
        difficulty(block.header.bits)
    );
    println!("{}", to_json(&block.header)?);
    Ok(())
}

fn test_signing(config: &Config) -> Result<()> {
    info!("生成密钥并签名...");
    let key = PrivateKey::generate();
    let public_key = key.public_key()?;
    info!("地址: {}", public_key.address(config.network));

    let spent = TxOut::new(100_000, ScriptPubKey::p2pkh(public_key.hash160()));
    let mut tx = Transaction::new(2, 0)?;
    tx.add_input(TxIn::new(
        hash_from_hex("13619b505d99bc5ee353a8e4a707164d54320134ccdb0795d89f5002e32e63a3")?,
        0,
    ));
    tx.add_output(TxOut::new(90_000, ScriptPubKey::p2pkh(public_key.hash160())));

    let signed = sign_transaction(&tx, &[spent.clone()], &[key])?;
    info!("签名后的交易: {}", signed.to_hex());
    info!("签名验证: {}", verify_signature(&signed, 0, &spent)?);
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::load()?;

    // 初始化日志记录器
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(config.log_level()?)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true)
        .init();

    info!("网络: {}", config.network);
    test_fixtures()?;
    test_signing(&config)?;
    info!("完成!");
    Ok(())
}
