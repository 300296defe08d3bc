//! # T2 Mapping
//!
//! DESS T2 relaxation maps and per-tissue statistics.
//!
//! 负责：
//! - 从双回波比值估计逐体素 T2（ms）
//! - 在组织掩膜内汇总 T2 统计量
//!
//! ## 使用示例
//!
//! ```ignore
//! use contracts::T2Mapper;
//! use t2_mapping::DessT2Mapper;
//!
//! let mapper = DessT2Mapper::new(settings.t2.clone());
//! let t2_map = mapper.calc_t2_map(&raw_volume, &reference)?;
//! let summary = mapper.tissue_t2(&t2_map, &mask, Tissue::Meniscus)?;
//! ```

mod dess;
mod stats;

pub use contracts::T2Mapper;
pub use dess::{DessParams, DessT2Mapper, GYROMAGNETIC_RATIO};
pub use stats::summarize;
