use super::types::DataValue;

/// A chart scale mapping data values to pixel positions.
///
/// `Linear` is a continuous affine map with an exact inverse. `Ordinal` is a
/// band scale over a finite ordered domain: entry `i` owns a band starting at
/// `range0 + i * step`, and has no native inverse.
#[derive(Debug, Clone, PartialEq)]
pub enum Scale {
    Linear {
        domain: [f64; 2],
        range: [f64; 2],
    },
    Ordinal {
        domain: Vec<DataValue>,
        range: [f64; 2],
    },
}

impl Scale {
    pub fn linear(domain: [f64; 2], range: [f64; 2]) -> Self {
        Scale::Linear { domain, range }
    }

    pub fn ordinal(domain: Vec<DataValue>, range: [f64; 2]) -> Self {
        Scale::Ordinal { domain, range }
    }

    pub fn range(&self) -> [f64; 2] {
        match self {
            Scale::Linear { range, .. } | Scale::Ordinal { range, .. } => *range,
        }
    }

    /// Ordinal domain entries, in band order; empty for linear scales.
    pub fn ordinal_domain(&self) -> &[DataValue] {
        match self {
            Scale::Linear { .. } => &[],
            Scale::Ordinal { domain, .. } => domain,
        }
    }

    /// Pixel position of a data value.
    ///
    /// Contract: the value kind must match the scale kind and, for ordinal
    /// scales, be present in the domain. Callers validate at the boundary
    /// (see `Scene::validate`); a violation here maps to NaN.
    pub fn position(&self, value: &DataValue) -> f64 {
        match self {
            Scale::Linear { domain, range } => {
                let Some(v) = value.as_number() else {
                    return f64::NAN;
                };
                let span = domain[1] - domain[0];
                if span == 0.0 {
                    return range[0];
                }
                range[0] + (v - domain[0]) / span * (range[1] - range[0])
            }
            Scale::Ordinal { domain, range } => {
                let Some(index) = domain.iter().position(|d| d == value) else {
                    return f64::NAN;
                };
                range[0] + index as f64 * self.step()
            }
        }
    }

    /// Width of one ordinal band; 0 for linear scales.
    pub fn step(&self) -> f64 {
        match self {
            Scale::Linear { .. } => 0.0,
            Scale::Ordinal { domain, range } => {
                if domain.is_empty() {
                    0.0
                } else {
                    (range[1] - range[0]) / domain.len() as f64
                }
            }
        }
    }

    /// Invert a pixel position back to a data value plus a residual percent
    /// offset.
    ///
    /// Linear scales invert exactly with a zero residual. Ordinal scales are
    /// inverted by a domain scan: the first entry whose band starts past
    /// `pixel` means the position fell in the previous band, which is
    /// returned along with how far into it the pixel sits, as a percentage
    /// of the scale's pixel extent. A pixel before the first band inverts to
    /// `None` — the caller decides what that means (see `new_annotation`).
    pub fn invert(&self, pixel: f64) -> (Option<DataValue>, f64) {
        match self {
            Scale::Linear { domain, range } => {
                let extent = range[1] - range[0];
                let value = if extent == 0.0 {
                    domain[0]
                } else {
                    domain[0] + (pixel - range[0]) / extent * (domain[1] - domain[0])
                };
                (Some(DataValue::Number(value)), 0.0)
            }
            Scale::Ordinal { domain, range } => {
                let max_range = range[0].max(range[1]);
                let mut previous = None;
                let mut offset = 0.0;

                for entry in domain {
                    let position = self.position(entry);
                    if position > pixel {
                        return (previous, offset);
                    }
                    if max_range > 0.0 {
                        offset = (pixel - position) / max_range * 100.0;
                    }
                    previous = Some(entry.clone());
                }

                (previous, offset)
            }
        }
    }
}
