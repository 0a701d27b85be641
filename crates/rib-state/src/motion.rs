//! Motion-block signature tracking (spec §4.7): every sample inside a
//! `MotionBegin`/`MotionEnd` pair must be the same request with the same
//! argument shape, and the sample count must match the time-list length.

use rib_errors::{Diagnostic, ErrorCode, Severity};
use rib_model::{BasicType, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSignature {
    pub name: String,
    pub shape: Vec<(BasicType, bool)>,
}

impl RequestSignature {
    pub fn of(name: &str, args: &[Value]) -> Self {
        Self {
            name: name.to_string(),
            shape: args.iter().map(|v| (v.basic_type(), v.is_array())).collect(),
        }
    }
}

#[derive(Debug)]
pub struct MotionBlock {
    expected_samples: usize,
    signature: Option<RequestSignature>,
    sample_count: usize,
}

impl MotionBlock {
    pub fn new(times: &[f32]) -> Self {
        Self {
            expected_samples: times.len(),
            signature: None,
            sample_count: 0,
        }
    }

    /// Record one sample's request. The first call fixes the block's
    /// signature; later calls must match it exactly.
    pub fn record(
        &mut self,
        name: &str,
        args: &[Value],
        line: u32,
        source_name: &str,
    ) -> Result<(), Diagnostic> {
        let sig = RequestSignature::of(name, args);
        match &self.signature {
            None => self.signature = Some(sig),
            Some(expected) if *expected == sig => {}
            Some(expected) => {
                return Err(Diagnostic::new(
                    ErrorCode::MotionSignatureMismatch,
                    Severity::Error,
                    line,
                    source_name,
                    format!(
                        "motion sample {} ({}) does not match the block's first sample ({})",
                        self.sample_count, name, expected.name
                    ),
                ));
            }
        }
        self.sample_count += 1;
        Ok(())
    }

    /// Validate the sample count against the `MotionBegin` time-list length
    /// on `MotionEnd`.
    pub fn finish(&self, line: u32, source_name: &str) -> Result<(), Diagnostic> {
        if self.sample_count != self.expected_samples {
            return Err(Diagnostic::new(
                ErrorCode::MotionSignatureMismatch,
                Severity::Error,
                line,
                source_name,
                format!(
                    "motion block declared {} time samples but received {}",
                    self.expected_samples, self.sample_count
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_samples_accumulate_cleanly() {
        let mut block = MotionBlock::new(&[0.0, 1.0]);
        block
            .record("Translate", &[Value::scalar_float(0.0, 1)], 1, "a.rib")
            .unwrap();
        block
            .record("Translate", &[Value::scalar_float(1.0, 2)], 2, "a.rib")
            .unwrap();
        assert!(block.finish(3, "a.rib").is_ok());
    }

    #[test]
    fn mismatched_request_name_is_rejected() {
        let mut block = MotionBlock::new(&[0.0, 1.0]);
        block
            .record("Translate", &[Value::scalar_float(0.0, 1)], 1, "a.rib")
            .unwrap();
        let err = block.record("Rotate", &[Value::scalar_float(1.0, 2)], 2, "a.rib");
        assert!(err.is_err());
    }

    #[test]
    fn short_sample_count_fails_on_finish() {
        let mut block = MotionBlock::new(&[0.0, 1.0, 2.0]);
        block
            .record("Translate", &[Value::scalar_float(0.0, 1)], 1, "a.rib")
            .unwrap();
        assert!(block.finish(2, "a.rib").is_err());
    }
}
