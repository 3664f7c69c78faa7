use ff::PrimeField;
use num_bigint::BigUint;
use num_integer::Integer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `count` limbs of `bits` bits each, least significant limb first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbParams {
    pub count: usize,
    pub bits: usize,
}

impl Default for LimbParams {
    fn default() -> Self {
        Self {
            count: 17,
            bits: 121,
        }
    }
}

impl LimbParams {
    pub fn new(count: usize, bits: usize) -> Result<Self> {
        let params = Self { count, bits };
        params.check()?;
        Ok(params)
    }

    fn check(&self) -> Result<()> {
        if self.count == 0 || self.bits == 0 {
            return Err(Error::Configuration(format!(
                "limb count and width must be positive, got k = {}, n = {}",
                self.count, self.bits
            )));
        }
        self.capacity_bits().map(|_| ())
    }

    /// `count * bits`, rejecting params whose width overflows a usize.
    pub fn capacity_bits(&self) -> Result<usize> {
        self.count.checked_mul(self.bits).ok_or_else(|| {
            Error::Configuration(format!(
                "{} limbs of {} bits overflow the addressable bit width",
                self.count, self.bits
            ))
        })
    }

    /// Fails unless a `key_bits` wide value always fits in the limbs.
    pub fn ensure_covers(&self, key_bits: usize) -> Result<()> {
        self.check()?;
        let capacity_bits = self.capacity_bits()?;
        if capacity_bits < key_bits {
            return Err(Error::Configuration(format!(
                "{} limbs of {} bits hold {} bits, a {}-bit key needs at least {} limbs",
                self.count,
                self.bits,
                capacity_bits,
                key_bits,
                Integer::div_ceil(&key_bits, &self.bits)
            )));
        }
        Ok(())
    }

    /// `2^bits - 1`, capped at the width of `value` since no shifted limb
    /// of it can be wider.
    fn mask_for(&self, value: &BigUint) -> BigUint {
        let width = self.bits.min(value.bits() as usize);
        (BigUint::from(1u8) << width) - 1u8
    }

    /// Splits `value` into exactly `count` limbs. Values wider than the
    /// limbs are rejected instead of having their high bits dropped.
    pub fn decompose(&self, value: &BigUint) -> Result<Vec<BigUint>> {
        self.check()?;
        if value.bits() > self.capacity_bits()? as u64 {
            return Err(Error::Configuration(format!(
                "{}-bit value does not fit in {} limbs of {} bits",
                value.bits(),
                self.count,
                self.bits
            )));
        }

        // check() bounds bits * i below count * bits
        let mask = self.mask_for(value);
        Ok((0..self.count)
            .map(|i| (value >> (self.bits * i)) & &mask)
            .collect())
    }

    /// Inverse of `decompose`. At most `count` limbs.
    pub fn compose(&self, limbs: &[BigUint]) -> Result<BigUint> {
        self.check()?;
        if limbs.len() > self.count {
            return Err(Error::Configuration(format!(
                "{} limbs given, params allow {}",
                limbs.len(),
                self.count
            )));
        }

        Ok(limbs
            .iter()
            .enumerate()
            .fold(BigUint::default(), |acc, (i, limb)| {
                acc + (limb << (self.bits * i))
            }))
    }

    pub fn to_decimal(&self, value: &BigUint) -> Result<Vec<String>> {
        Ok(self
            .decompose(value)?
            .iter()
            .map(|limb| limb.to_str_radix(10))
            .collect())
    }

    /// Parses decimal limbs back into a value, checking count and width.
    pub fn from_decimal<S: AsRef<str>>(&self, limbs: &[S]) -> Result<BigUint> {
        self.check()?;
        if limbs.len() != self.count {
            return Err(Error::Configuration(format!(
                "expected {} limbs, got {}",
                self.count,
                limbs.len()
            )));
        }

        let limbs = limbs
            .iter()
            .map(|limb| {
                let limb = limb.as_ref();
                let value = BigUint::parse_bytes(limb.as_bytes(), 10).ok_or_else(|| {
                    Error::Configuration(format!("limb `{}` is not a decimal integer", limb))
                })?;
                if value.bits() > self.bits as u64 {
                    return Err(Error::Configuration(format!(
                        "limb {} is wider than {} bits",
                        limb, self.bits
                    )));
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>>>()?;

        self.compose(&limbs)
    }
}

/// Limbs as field elements for halo2 circuits; every limb has to be below
/// the field modulus.
pub fn limbs_to_field<F: PrimeField>(limbs: &[BigUint]) -> Result<Vec<F>> {
    limbs
        .iter()
        .map(|limb| {
            // from_str_vartime reduces mod p, so check the value survived
            match F::from_str_vartime(&limb.to_str_radix(10)) {
                Some(x) if &field_to_biguint(x) == limb => Ok(x),
                _ => Err(Error::Configuration(format!(
                    "limb {} does not fit in a {}-bit field",
                    limb,
                    F::NUM_BITS
                ))),
            }
        })
        .collect()
}

/// Assumes the little-endian repr used by the halo2curves fields.
pub fn field_to_biguint<F: PrimeField>(x: F) -> BigUint {
    BigUint::from_bytes_le(x.to_repr().as_ref())
}

#[test]
fn test_zero_limbs() {
    let params = LimbParams::default();
    let limbs = params.to_decimal(&BigUint::default()).unwrap();
    assert_eq!(limbs, vec!["0".to_string(); 17]);
}

#[test]
fn test_limb_layout() {
    let params = LimbParams::new(3, 8).unwrap();
    let value = BigUint::from(0x0a0b0cu32);
    let limbs = params.decompose(&value).unwrap();
    assert_eq!(
        limbs,
        vec![
            BigUint::from(0x0cu8),
            BigUint::from(0x0bu8),
            BigUint::from(0x0au8)
        ]
    );
    assert_eq!(params.compose(&limbs).unwrap(), value);
    assert_eq!(params.to_decimal(&value).unwrap(), vec!["12", "11", "10"]);
    assert_eq!(params.from_decimal(&["12", "11", "10"]).unwrap(), value);
}

#[test]
fn test_overflow_is_rejected() {
    let params = LimbParams::new(2, 8).unwrap();
    assert!(params.decompose(&BigUint::from(0xffffu32)).is_ok());
    assert!(matches!(
        params.decompose(&BigUint::from(0x10000u32)),
        Err(Error::Configuration(_))
    ));

    assert!(LimbParams::default().ensure_covers(2048).is_ok());
    assert!(LimbParams::default().ensure_covers(2057).is_ok());
    assert!(LimbParams::default().ensure_covers(2058).is_err());
    assert!(LimbParams::new(0, 121).is_err());
    assert!(LimbParams::new(17, 0).is_err());
}

#[test]
fn test_overflowing_params() {
    let params = LimbParams {
        count: usize::MAX,
        bits: 2,
    };
    assert!(matches!(params.capacity_bits(), Err(Error::Configuration(_))));
    assert!(matches!(params.ensure_covers(2048), Err(Error::Configuration(_))));
    assert!(matches!(
        params.decompose(&BigUint::from(1u8)),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        params.compose(&[BigUint::from(1u8)]),
        Err(Error::Configuration(_))
    ));
    assert!(LimbParams::new(usize::MAX, usize::MAX).is_err());

    let too_many = vec![BigUint::from(1u8); 3];
    assert!(LimbParams::new(2, 8).unwrap().compose(&too_many).is_err());
    assert_eq!(LimbParams::default().capacity_bits().unwrap(), 2057);

    // absurdly wide limbs must not allocate a mask of that width
    let wide = LimbParams::new(1, 1 << 40).unwrap();
    assert_eq!(
        wide.decompose(&BigUint::from(0xabcdu32)).unwrap(),
        vec![BigUint::from(0xabcdu32)]
    );
}

#[test]
fn test_from_decimal_errors() {
    let params = LimbParams::new(2, 8).unwrap();
    assert!(params.from_decimal(&["1"]).is_err());
    assert!(params.from_decimal(&["1", "x"]).is_err());
    assert!(params.from_decimal(&["1", "256"]).is_err());
    assert_eq!(
        params.from_decimal(&["1", "255"]).unwrap(),
        BigUint::from(0xff01u32)
    );
}

#[test]
fn test_biguint_field() {
    use halo2curves::bn256::Fr;
    use halo2curves::pasta::Fp;

    let params = LimbParams::default();
    let value = (BigUint::from(1u8) << 2048) - 1u8;
    let limbs = params.decompose(&value).unwrap();

    let field_limbs = limbs_to_field::<Fr>(&limbs).unwrap();
    let back: Vec<BigUint> = field_limbs.into_iter().map(field_to_biguint).collect();
    assert_eq!(back, limbs);

    let bigint = BigUint::from(u64::MAX);
    let field_elem = limbs_to_field::<Fp>(&[bigint.clone()]).unwrap()[0];
    assert_eq!(bigint, field_to_biguint(field_elem));

    let too_wide = BigUint::from(1u8) << 300;
    assert!(limbs_to_field::<Fr>(&[too_wide]).is_err());
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn limbs_round_trip(
            bytes in prop::collection::vec(any::<u8>(), 0..257),
        ) {
            let params = LimbParams::default();
            let value = BigUint::from_bytes_be(&bytes);
            let limbs = params.decompose(&value).unwrap();

            prop_assert_eq!(limbs.len(), params.count);
            for limb in &limbs {
                prop_assert!(limb.bits() <= params.bits as u64);
            }
            prop_assert_eq!(params.compose(&limbs).unwrap(), value.clone());

            let decimal = params.to_decimal(&value).unwrap();
            prop_assert_eq!(params.from_decimal(&decimal).unwrap(), value);
        }

        #[test]
        fn small_limb_widths(value in any::<u64>(), bits in 1usize..64) {
            let count = Integer::div_ceil(&64usize, &bits);
            let params = LimbParams::new(count, bits).unwrap();
            let value = BigUint::from(value);
            let limbs = params.decompose(&value).unwrap();
            prop_assert!(limbs.iter().all(|limb| limb < &(BigUint::from(1u8) << bits)));
            prop_assert_eq!(params.compose(&limbs).unwrap(), value);
        }
    }
}
