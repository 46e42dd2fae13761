use crate::error::MenuError;
use std::f64::consts::TAU;

/// Elastic angular constraint occupying a slot between two items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    rest_length: Option<f64>,
    elastic_constant: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            rest_length: None,
            elastic_constant: 1.0,
        }
    }
}

impl Spring {
    pub fn new(rest_length: f64, elastic_constant: f64) -> Result<Self, MenuError> {
        Self::with_elasticity(elastic_constant)?.with_rest_length(rest_length)
    }

    /// A spring whose rest length falls back to the ring's uniform spacing.
    pub fn with_elasticity(elastic_constant: f64) -> Result<Self, MenuError> {
        if !elastic_constant.is_finite() || elastic_constant <= 0.0 {
            return Err(MenuError::InvalidElasticity(elastic_constant));
        }
        Ok(Self {
            rest_length: None,
            elastic_constant,
        })
    }

    pub fn with_rest_length(mut self, rest_length: f64) -> Result<Self, MenuError> {
        if !rest_length.is_finite() || rest_length < 0.0 {
            return Err(MenuError::InvalidRestLength(rest_length));
        }
        self.rest_length = Some(rest_length);
        Ok(self)
    }

    pub fn rest_length(&self) -> Option<f64> {
        self.rest_length
    }

    pub fn elastic_constant(&self) -> f64 {
        self.elastic_constant
    }

    /// Rest length on a ring holding `item_count` items.
    pub fn resolved_rest_length(&self, item_count: usize) -> f64 {
        self.rest_length
            .unwrap_or_else(|| uniform_spacing(item_count))
    }
}

pub(crate) fn uniform_spacing(item_count: usize) -> f64 {
    if item_count == 0 {
        TAU
    } else {
        TAU / item_count as f64
    }
}

/// Springs in series between two neighbouring items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Gap {
    pub rest: f64,
    pub compliance: f64,
}

impl Gap {
    pub fn implicit(item_count: usize) -> Self {
        Self {
            rest: uniform_spacing(item_count),
            compliance: 1.0,
        }
    }

    pub fn from_springs<'a>(
        springs: impl IntoIterator<Item = &'a Spring>,
        item_count: usize,
    ) -> Option<Self> {
        springs.into_iter().fold(None, |acc, s| {
            let (rest, compliance) = acc.map_or((0.0, 0.0), |g: Gap| (g.rest, g.compliance));
            Some(Self {
                rest: rest + s.resolved_rest_length(item_count),
                compliance: compliance + 1.0 / s.elastic_constant,
            })
        })
    }
}
