//! Wall-clock timing of repeated calls.

use crate::error::{BenchError, Result};
use std::hint::black_box;
use std::time::Instant;

/// Calls `f` exactly `repetitions` times, one after the other, and returns
/// the elapsed seconds of every call in call order.
///
/// There is no warm-up and no outlier removal. The first failing call stops
/// the loop and its error is returned as is.
pub fn time_repeated<T, F>(repetitions: usize, mut f: F) -> Result<Vec<f64>>
where
    F: FnMut() -> Result<T>,
{
    if repetitions < 1 {
        return Err(BenchError::InvalidRepetitionCount(repetitions));
    }

    let mut samples = Vec::with_capacity(repetitions);
    for _ in 0..repetitions {
        let start = Instant::now();
        let output = f();
        let elapsed = start.elapsed().as_secs_f64();
        black_box(output?);
        samples.push(elapsed);
    }
    Ok(samples)
}

/// Calls `f` once and returns its output with the elapsed seconds.
pub fn time_once<T, F>(f: F) -> Result<(T, f64)>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let output = f();
    let elapsed = start.elapsed().as_secs_f64();
    Ok((output?, elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;

    #[test]
    fn test_exact_number_of_calls() {
        for repetitions in [1, 2, 7] {
            let mut calls = 0;
            let samples = time_repeated(repetitions, || {
                calls += 1;
                Ok(calls)
            })
            .unwrap();
            assert_eq!(samples.len(), repetitions);
            assert_eq!(calls, repetitions);
            assert!(samples.iter().all(|&t| t >= 0.0));
        }
    }

    #[test]
    fn test_zero_repetitions_rejected() {
        let mut called = false;
        let err = time_repeated(0, || {
            called = true;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, BenchError::InvalidRepetitionCount(0)));
        assert!(!called);
    }

    #[test]
    fn test_samples_follow_call_order() {
        // Every call sleeps longer than the previous one
        let mut delay = 0;
        let samples = time_repeated(3, || {
            delay += 20;
            std::thread::sleep(std::time::Duration::from_millis(delay));
            Ok(())
        })
        .unwrap();
        assert!(samples.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_failure_stops_the_loop() {
        let mut calls = 0;
        let err = time_repeated(5, || {
            calls += 1;
            if calls == 2 {
                Err(BenchError::execution(
                    "csr",
                    "mmm",
                    MatrixError::DimensionMismatch {
                        left: (1, 2),
                        right: (3, 4),
                    },
                ))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert!(matches!(err, BenchError::OperationExecutionFailure { .. }));
        assert_eq!(calls, 2);
    }
}
