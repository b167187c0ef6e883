//! Submission intake screening
//!
//! Two optional anti-automation signals accompany a public submission:
//! a honeypot input that legitimate users never fill, and the client's
//! form-render timestamp. A non-empty honeypot, or a fill time under
//! [`MIN_FILL_TIME_MS`], marks the submission as likely automated.
//!
//! Callers must surface a rejection as a generic validation failure.
//! Returning a distinct error would tell an automated submitter which
//! check it tripped.

/// Submissions completed faster than this are treated as automated.
pub const MIN_FILL_TIME_MS: i64 = 1_500;

/// Why a submission was screened out. Internal only; never serialized
/// into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    HoneypotFilled,
    TooFast,
}

/// Screen a submission's anti-automation signals.
///
/// `started_at_ms` is the client-reported render time and
/// `received_at_ms` the server receipt time, both Unix milliseconds.
/// A negative elapsed time (client clock ahead of the server) passes:
/// only a provably short fill time is suspicious.
pub fn screen_submission(
    honeypot: Option<&str>,
    started_at_ms: Option<i64>,
    received_at_ms: i64,
) -> Result<(), RejectReason> {
    if let Some(honeypot) = honeypot {
        if !honeypot.trim().is_empty() {
            return Err(RejectReason::HoneypotFilled);
        }
    }

    if let Some(started_at) = started_at_ms {
        let elapsed = received_at_ms - started_at;
        if (0..MIN_FILL_TIME_MS).contains(&elapsed) {
            return Err(RejectReason::TooFast);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_clean_submission_passes() {
        assert!(screen_submission(None, None, NOW).is_ok());
        assert!(screen_submission(Some(""), Some(NOW - 60_000), NOW).is_ok());
    }

    #[test]
    fn test_honeypot_rejects_any_non_empty_value() {
        assert_eq!(
            screen_submission(Some("x"), None, NOW),
            Err(RejectReason::HoneypotFilled)
        );
        // Whitespace-only does not count as filled.
        assert!(screen_submission(Some("   "), None, NOW).is_ok());
    }

    #[test]
    fn test_honeypot_wins_over_timing() {
        // Both signals tripped: honeypot is checked first.
        assert_eq!(
            screen_submission(Some("bot"), Some(NOW - 100), NOW),
            Err(RejectReason::HoneypotFilled)
        );
    }

    #[test]
    fn test_fast_submission_rejected() {
        assert_eq!(
            screen_submission(None, Some(NOW - 500), NOW),
            Err(RejectReason::TooFast)
        );
    }

    #[test]
    fn test_slow_submission_accepted() {
        assert!(screen_submission(None, Some(NOW - 2_000), NOW).is_ok());
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(
            screen_submission(None, Some(NOW - (MIN_FILL_TIME_MS - 1)), NOW),
            Err(RejectReason::TooFast)
        );
        assert!(screen_submission(None, Some(NOW - MIN_FILL_TIME_MS), NOW).is_ok());
    }

    #[test]
    fn test_negative_elapsed_accepted() {
        // Client clock ahead of server: not treated as automation.
        assert!(screen_submission(None, Some(NOW + 10_000), NOW).is_ok());
    }
}
