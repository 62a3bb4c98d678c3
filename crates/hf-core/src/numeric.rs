//! Float helpers.

use crate::HfError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, HfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HfError::NonFinite { what, value: v })
    }
}

/// Return the first non-finite entry of a named sequence, if any.
pub fn first_non_finite<'a, I>(values: I) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    values.into_iter().find(|(_, v)| !v.is_finite())
}
