// 摘要级别的 ECDSA 签名与验证
// 摘要按大端整数解释。签名总是规范化为 low-S 形式

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ecc::{CurveArithmetic, Point};
use crate::error::{BtcError, Result};
use crate::serialize::hex_biguint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(with = "hex_biguint")]
    pub r: BigUint,
    #[serde(with = "hex_biguint")]
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Signature { r, s }
    }

    pub fn is_low_s(&self, order: &BigUint) -> bool {
        self.s <= order >> 1usize
    }
}

pub struct Ecdsa<'a, C: CurveArithmetic> {
    curve: &'a C,
}

impl<'a, C: CurveArithmetic> Ecdsa<'a, C> {
    pub fn new(curve: &'a C) -> Self {
        Ecdsa { curve }
    }

    pub fn curve(&self) -> &'a C {
        self.curve
    }

    pub fn public_key(&self, secret: &BigUint) -> Result<Point> {
        self.check_secret(secret)?;
        Ok(self.curve.scalar_mul(secret, self.curve.generator()))
    }

    // 使用 OsRng 生成的随机 nonce 签名
    pub fn sign_digest(&self, digest: &[u8; 32], secret: &BigUint) -> Result<Signature> {
        self.check_secret(secret)?;
        let n = self.curve.order();
        let mut rng = OsRng;
        loop {
            let k = rng.gen_biguint_range(&BigUint::one(), n);
            if let Some(signature) = self.sign_digest_with_nonce(digest, secret, &k) {
                return Ok(signature);
            }
            debug!("nonce 产生了 r=0 或 s=0，重新选择");
        }
    }

    // 使用给定 nonce 签名，r 或 s 为零时返回 None
    // nonce 绝不能在同一私钥下重复使用，这个接口只用于可复现的测试向量
    pub fn sign_digest_with_nonce(
        &self,
        digest: &[u8; 32],
        secret: &BigUint,
        k: &BigUint,
    ) -> Option<Signature> {
        let n = self.curve.order();
        let k = k % n;
        if k.is_zero() {
            return None;
        }

        let point = self.curve.scalar_mul(&k, self.curve.generator());
        let r = point.x()? % n;
        if r.is_zero() {
            return None;
        }

        let z = digest_to_int(digest, n);
        let k_inv = self.curve.inv_mod(&k, n)?;
        let mut s = (k_inv * ((z + &r * secret) % n)) % n;
        if s.is_zero() {
            return None;
        }

        // low-S
        if s > n >> 1usize {
            s = n - s;
        }
        Some(Signature { r, s })
    }

    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature, public_key: &Point) -> bool {
        let n = self.curve.order();
        let Signature { r, s } = signature;
        if r.is_zero() || r >= n || s.is_zero() || s >= n {
            warn!("签名分量超出范围 [1, n-1]");
            return false;
        }
        if public_key.is_infinity() || !self.curve.contains(public_key) {
            warn!("公钥不是有效的曲线点");
            return false;
        }

        let w = match self.curve.inv_mod(s, n) {
            Some(w) => w,
            None => return false,
        };
        let z = digest_to_int(digest, n);
        let u1 = (z * &w) % n;
        let u2 = (r * &w) % n;

        let point = self.curve.add(
            &self.curve.scalar_mul(&u1, self.curve.generator()),
            &self.curve.scalar_mul(&u2, public_key),
        );
        match point.x() {
            Some(x) => &(x % n) == r,
            None => false,
        }
    }

    fn check_secret(&self, secret: &BigUint) -> Result<()> {
        if secret.is_zero() || secret >= self.curve.order() {
            return Err(BtcError::InvalidKey("私钥必须在 [1, n-1] 范围内".to_string()));
        }
        Ok(())
    }
}

fn digest_to_int(digest: &[u8; 32], n: &BigUint) -> BigUint {
    BigUint::from_bytes_be(digest) % n
}
