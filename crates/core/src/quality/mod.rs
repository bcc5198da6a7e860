//! Quality model: the tier ladder, quality profiles and custom formats.

mod format;
mod profile;
mod tier;

pub use format::{match_formats, Condition, CustomFormatDef, EqOp, MemberOp, TextOp};
pub use profile::{DelayProfile, FilterType, QualityProfile, ReleaseFilter};
pub use tier::{classify_tier, QualityTier};
