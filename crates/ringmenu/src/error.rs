use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MenuError {
    #[error("A menu session is already active")]
    SessionActive,
    #[error("Pointer event carries no location")]
    EventWithoutLocation,
    #[error("Ring {index} is out of bounds (ring count {count})")]
    RingOutOfBounds { index: usize, count: usize },
    #[error("Slot {index} is out of bounds (slot count {count})")]
    SlotOutOfBounds { index: usize, count: usize },
    #[error("Gravity group {index} does not exist")]
    GravityGroupNotFound { index: usize },
    #[error("Gravity range {range:?} exceeds slot count {count}")]
    GravityRangeOutOfBounds { range: Range<usize>, count: usize },
    #[error("Gravity range {range:?} is empty")]
    EmptyGravityRange { range: Range<usize> },
    #[error("Gravity range {range:?} overlaps {existing:?}")]
    GravityOverlap {
        range: Range<usize>,
        existing: Range<usize>,
    },
    #[error("A gravity group is already open")]
    GravityGroupAlreadyOpen,
    #[error("No gravity group is open")]
    NoOpenGravityGroup,
    #[error("Elastic constant must be finite and positive, got {0}")]
    InvalidElasticity(f64),
    #[error("Spring rest length must be finite and non-negative, got {0}")]
    InvalidRestLength(f64),
    #[error("Gravity angle must be finite, got {0}")]
    InvalidGravityAngle(f64),
    #[error("Ring radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
    #[error("Ring spacing must be finite and positive, got {0}")]
    InvalidRingSpacing(f64),
    #[error("Ring {index} radius {radius} must lie strictly between {inner} and {outer}")]
    RadiusOutOfOrder {
        index: usize,
        radius: f64,
        inner: f64,
        outer: f64,
    },
}
