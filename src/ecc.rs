// 短 Weierstrass 曲线 y² = x³ + ax + b (mod p) 上的点运算

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

use crate::error::{BtcError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Point::Affine { x, y }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Point::Affine { x, .. } => Some(x),
            Point::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Point::Affine { y, .. } => Some(y),
            Point::Infinity => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurveParams {
    pub name: &'static str,
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub g: Point,
    // 生成元 g 的阶
    pub n: BigUint,
}

// 签名引擎依赖的曲线运算接口
pub trait CurveArithmetic {
    fn params(&self) -> &CurveParams;

    fn add(&self, lhs: &Point, rhs: &Point) -> Point;

    fn scalar_mul(&self, k: &BigUint, point: &Point) -> Point;

    // x 在模 modulus 下的逆元，不存在时返回 None
    fn inv_mod(&self, x: &BigUint, modulus: &BigUint) -> Option<BigUint>;

    // 由 x 坐标恢复曲线点，`odd` 选择 y 的奇偶性
    fn lift_x(&self, x: &BigUint, odd: bool) -> Result<Point>;

    fn contains(&self, point: &Point) -> bool;

    fn generator(&self) -> &Point {
        &self.params().g
    }

    fn order(&self) -> &BigUint {
        &self.params().n
    }
}

fn big(hex_str: &str) -> BigUint {
    BigUint::parse_bytes(hex_str.as_bytes(), 16).unwrap_or_default()
}

static SECP256K1: Lazy<Curve> = Lazy::new(|| Curve {
    params: CurveParams {
        name: "secp256k1",
        p: big("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"),
        a: BigUint::zero(),
        b: BigUint::from(7u32),
        g: Point::new(
            big("79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"),
            big("483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"),
        ),
        n: big("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"),
    },
});

// y² = x³ + 7 over F_967，群阶 907 为素数
static DEMO: Lazy<Curve> = Lazy::new(|| Curve {
    params: CurveParams {
        name: "demo-967",
        p: BigUint::from(967u32),
        a: BigUint::zero(),
        b: BigUint::from(7u32),
        g: Point::new(BigUint::from(1u32), BigUint::from(88u32)),
        n: BigUint::from(907u32),
    },
});

#[derive(Debug, Clone)]
pub struct Curve {
    params: CurveParams,
}

impl Curve {
    // 用自定义参数构造曲线，生成元必须在曲线上
    pub fn new(params: CurveParams) -> Result<Curve> {
        if params.n <= BigUint::one() {
            return Err(BtcError::UnsupportedCurvePoint(format!(
                "曲线 {} 的阶必须大于 1",
                params.name
            )));
        }
        let curve = Curve { params };
        if curve.params.g.is_infinity() || !curve.contains(&curve.params.g) {
            return Err(BtcError::UnsupportedCurvePoint(format!(
                "生成元不在曲线 {} 上",
                curve.params.name
            )));
        }
        Ok(curve)
    }

    pub fn secp256k1() -> &'static Curve {
        &SECP256K1
    }

    // 小素数域上的演示曲线，只用于可复现的测试
    pub fn demo() -> &'static Curve {
        &DEMO
    }

    fn sub_mod(&self, lhs: &BigUint, rhs: &BigUint) -> BigUint {
        let p = &self.params.p;
        ((lhs % p) + p - (rhs % p)) % p
    }

    fn rhs(&self, x: &BigUint) -> BigUint {
        let p = &self.params.p;
        (x * x * x + &self.params.a * x + &self.params.b) % p
    }
}

impl CurveArithmetic for Curve {
    fn params(&self) -> &CurveParams {
        &self.params
    }

    fn add(&self, lhs: &Point, rhs: &Point) -> Point {
        let (x1, y1, x2, y2) = match (lhs, rhs) {
            (Point::Infinity, _) => return rhs.clone(),
            (_, Point::Infinity) => return lhs.clone(),
            (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
        };
        let p = &self.params.p;

        let (num, den) = if x1 == x2 {
            if ((y1 + y2) % p).is_zero() {
                return Point::Infinity;
            }
            // 倍点
            ((x1 * x1 * 3u32 + &self.params.a) % p, (y1 * 2u32) % p)
        } else {
            (self.sub_mod(y2, y1), self.sub_mod(x2, x1))
        };
        let inv = match self.inv_mod(&den, p) {
            Some(inv) => inv,
            None => return Point::Infinity,
        };
        let lambda = (num * inv) % p;

        let x3 = self.sub_mod(&(&lambda * &lambda), &(x1 + x2));
        let y3 = self.sub_mod(&(&lambda * self.sub_mod(x1, &x3)), y1);
        Point::new(x3, y3)
    }

    fn scalar_mul(&self, k: &BigUint, point: &Point) -> Point {
        let mut result = Point::Infinity;
        for byte in k.to_bytes_be() {
            for bit in (0..8).rev() {
                result = self.add(&result, &result);
                if (byte >> bit) & 1 == 1 {
                    result = self.add(&result, point);
                }
            }
        }
        result
    }

    fn inv_mod(&self, x: &BigUint, modulus: &BigUint) -> Option<BigUint> {
        if modulus.is_zero() {
            return None;
        }
        let m = BigInt::from_biguint(Sign::Plus, modulus.clone());
        let a = BigInt::from_biguint(Sign::Plus, x % modulus);
        if a.is_zero() {
            return None;
        }

        // 扩展欧几里得
        let (mut old_r, mut r) = (a, m.clone());
        let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
        while !r.is_zero() {
            let q = &old_r / &r;
            let next_r = &old_r - &q * &r;
            old_r = std::mem::replace(&mut r, next_r);
            let next_s = &old_s - &q * &s;
            old_s = std::mem::replace(&mut s, next_s);
        }
        if !old_r.is_one() {
            return None;
        }

        let mut inv = old_s % &m;
        if inv.sign() == Sign::Minus {
            inv += &m;
        }
        inv.to_biguint()
    }

    fn lift_x(&self, x: &BigUint, odd: bool) -> Result<Point> {
        let p = &self.params.p;
        if x >= p {
            return Err(BtcError::UnsupportedCurvePoint("x 坐标超出域范围".to_string()));
        }
        let y = sqrt_mod(&self.rhs(x), p).ok_or_else(|| {
            BtcError::UnsupportedCurvePoint("x³+ax+b 在域上没有平方根".to_string())
        })?;
        let y = if is_odd(&y) == odd {
            y
        } else if y.is_zero() {
            return Err(BtcError::UnsupportedCurvePoint("不存在奇数 y".to_string()));
        } else {
            p - y
        };

        let point = Point::new(x.clone(), y);
        if !self.contains(&point) {
            return Err(BtcError::UnsupportedCurvePoint("恢复的点不在曲线上".to_string()));
        }
        Ok(point)
    }

    fn contains(&self, point: &Point) -> bool {
        match point {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                let p = &self.params.p;
                x < p && y < p && (y * y) % p == self.rhs(x)
            }
        }
    }
}

pub(crate) fn is_odd(value: &BigUint) -> bool {
    !(value % 2u32).is_zero()
}

// 模素数 p 的平方根，不存在时返回 None
// p ≡ 3 (mod 4) 时直接取 v^((p+1)/4)，否则使用 Tonelli-Shanks
pub fn sqrt_mod(value: &BigUint, p: &BigUint) -> Option<BigUint> {
    let one = BigUint::one();
    let v = value % p;
    if v.is_zero() {
        return Some(v);
    }
    let p_minus_one = p - &one;
    // 欧拉判别法
    if v.modpow(&(&p_minus_one >> 1usize), p) != one {
        return None;
    }

    if (p % 4u32) == BigUint::from(3u32) {
        return Some(v.modpow(&((p + &one) >> 2usize), p));
    }

    let mut q = p_minus_one.clone();
    let mut s = 0u32;
    while !is_odd(&q) {
        q >>= 1usize;
        s += 1;
    }
    let mut z = BigUint::from(2u32);
    while z.modpow(&(&p_minus_one >> 1usize), p) != p_minus_one {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = v.modpow(&q, p);
    let mut r = v.modpow(&((&q + &one) >> 1usize), p);
    while t != one {
        let mut i = 0u32;
        let mut t2 = t.clone();
        while t2 != one {
            t2 = (&t2 * &t2) % p;
            i += 1;
            if i == m {
                return None;
            }
        }
        let b = c.modpow(&(BigUint::one() << (m - i - 1) as usize), p);
        m = i;
        c = (&b * &b) % p;
        t = (t * &c) % p;
        r = (r * b) % p;
    }
    Some(r)
}

// SEC1 压缩编码：前缀 0x02（y 为偶数）或 0x03（y 为奇数）加 32 字节大端 x
pub fn encode_compressed(point: &Point) -> Result<[u8; 33]> {
    let (x, y) = match point {
        Point::Affine { x, y } => (x, y),
        Point::Infinity => {
            return Err(BtcError::UnsupportedCurvePoint("无穷远点无法编码".to_string()))
        }
    };
    let x_bytes = x.to_bytes_be();
    if x_bytes.len() > 32 {
        return Err(BtcError::UnsupportedCurvePoint("x 坐标超过32字节".to_string()));
    }

    let mut result = [0u8; 33];
    result[0] = if is_odd(y) { 0x03 } else { 0x02 };
    result[33 - x_bytes.len()..].copy_from_slice(&x_bytes);
    Ok(result)
}

// 解压缩公钥：由 x 求 y，按前缀选择奇偶
pub fn decode_compressed<C: CurveArithmetic + ?Sized>(curve: &C, bytes: &[u8]) -> Result<Point> {
    if bytes.len() != 33 {
        return Err(BtcError::UnsupportedCurvePoint(format!(
            "压缩公钥应为33字节, 实际 {} 字节",
            bytes.len()
        )));
    }
    let odd = match bytes[0] {
        0x02 => false,
        0x03 => true,
        prefix => {
            return Err(BtcError::UnsupportedCurvePoint(format!(
                "未知的公钥前缀: {:#04x}",
                prefix
            )))
        }
    };
    curve.lift_x(&BigUint::from_bytes_be(&bytes[1..]), odd)
}
