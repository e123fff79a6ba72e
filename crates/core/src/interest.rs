//! # Interest Module
//!
//! Các chiến lược lãi suất (interest mechanisms) cho accounts và products.
//! Mỗi mechanism là immutable và được chia sẻ qua `Arc` giữa nhiều products.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Chiến lược tính lãi suất dựa trên số dư hiện tại.
///
/// Không có side effects, luôn trả về một rate hữu hạn, không âm.
pub trait InterestMechanism: fmt::Debug + Send + Sync {
    /// Lãi suất áp dụng cho số dư `balance` (0.05 = 5%)
    fn rate(&self, balance: Decimal) -> Decimal;

    /// Tên hiển thị của mechanism
    fn name(&self) -> &str;
}

/// Mechanism được chia sẻ giữa các products
pub type SharedMechanism = Arc<dyn InterestMechanism>;

/// Lãi suất cố định, bỏ qua số dư.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRate {
    rate: Decimal,
}

impl FlatRate {
    pub fn new(rate: Decimal) -> CoreResult<Self> {
        if rate < Decimal::ZERO {
            return Err(CoreError::NegativeRate(rate));
        }
        Ok(Self { rate })
    }

    /// Tạo và bọc trong `Arc`
    pub fn shared(rate: Decimal) -> CoreResult<SharedMechanism> {
        Ok(Arc::new(Self::new(rate)?))
    }
}

impl InterestMechanism for FlatRate {
    fn rate(&self, _balance: Decimal) -> Decimal {
        self.rate
    }

    fn name(&self) -> &str {
        "flat"
    }
}

/// Không tính lãi.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroRate;

impl ZeroRate {
    pub fn shared() -> SharedMechanism {
        Arc::new(ZeroRate)
    }
}

impl InterestMechanism for ZeroRate {
    fn rate(&self, _balance: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn name(&self) -> &str {
        "zero"
    }
}

/// Một cấp lãi suất: áp dụng cho số dư trong `[min, max)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestTier {
    /// Số dư tối thiểu
    pub min: Decimal,
    /// Số dư tối đa (None = không giới hạn)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    /// Lãi suất áp dụng
    pub rate: Decimal,
}

impl InterestTier {
    pub fn new(min: Decimal, max: Option<Decimal>, rate: Decimal) -> Self {
        Self { min, max, rate }
    }

    /// Kiểm tra số dư có thuộc cấp này không
    pub fn matches(&self, magnitude: Decimal) -> bool {
        let above_min = magnitude >= self.min;
        let below_max = self.max.map_or(true, |max| magnitude < max);
        above_min && below_max
    }

    fn validate(&self) -> CoreResult<()> {
        if self.rate < Decimal::ZERO {
            return Err(CoreError::NegativeRate(self.rate));
        }
        if let Some(max) = self.max {
            if max <= self.min {
                return Err(CoreError::EmptyTier { min: self.min, max });
            }
        }
        Ok(())
    }
}

/// Lãi suất bậc thang theo độ lớn của số dư.
///
/// Tier được so khớp trên `|balance|`, nên một credit -5000 và một deposit
/// 5000 rơi vào cùng một cấp. Không có cấp phù hợp thì rate = 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredRate {
    tiers: Vec<InterestTier>,
}

impl TieredRate {
    pub fn new(tiers: Vec<InterestTier>) -> CoreResult<Self> {
        for tier in &tiers {
            tier.validate()?;
        }
        Ok(Self { tiers })
    }

    /// Builder: thêm một cấp
    pub fn tier(mut self, min: Decimal, max: Option<Decimal>, rate: Decimal) -> CoreResult<Self> {
        let tier = InterestTier::new(min, max, rate);
        tier.validate()?;
        self.tiers.push(tier);
        Ok(self)
    }

    /// Tìm cấp lãi suất phù hợp
    pub fn find_tier(&self, balance: Decimal) -> Option<&InterestTier> {
        let magnitude = balance.abs();
        self.tiers.iter().find(|tier| tier.matches(magnitude))
    }

    pub fn tiers(&self) -> &[InterestTier] {
        &self.tiers
    }
}

impl InterestMechanism for TieredRate {
    fn rate(&self, balance: Decimal) -> Decimal {
        self.find_tier(balance)
            .map(|tier| tier.rate)
            .unwrap_or(Decimal::ZERO)
    }

    fn name(&self) -> &str {
        "tiered"
    }
}

/// Mô tả mechanism dạng dữ liệu (dùng cho configuration).
///
/// ```json
/// { "type": "flat", "rate": "0.05" }
/// { "type": "tiered", "tiers": [{ "min": "0", "max": "1000", "rate": "0.02" }] }
/// { "type": "zero" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateSpec {
    Flat { rate: Decimal },
    Tiered { tiers: Vec<InterestTier> },
    Zero,
}

impl RateSpec {
    pub fn flat(rate: Decimal) -> Self {
        RateSpec::Flat { rate }
    }

    /// Dựng mechanism tương ứng
    pub fn build(&self) -> CoreResult<SharedMechanism> {
        match self {
            RateSpec::Flat { rate } => FlatRate::shared(*rate),
            RateSpec::Tiered { tiers } => Ok(Arc::new(TieredRate::new(tiers.clone())?)),
            RateSpec::Zero => Ok(ZeroRate::shared()),
        }
    }
}

impl fmt::Display for RateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSpec::Flat { rate } => write!(f, "flat {}", rate),
            RateSpec::Tiered { tiers } => write!(f, "tiered ({} tiers)", tiers.len()),
            RateSpec::Zero => write!(f, "zero"),
        }
    }
}
