pub mod groups;
pub mod validator;

pub use groups::{
    leadership_cardinality, resolve_entries, validate_group_shape, Entry, GroupViolation,
    LeadershipCardinality,
};
pub use validator::{validate_enrollment, validate_enrollment_batch, QuotaViolation};
