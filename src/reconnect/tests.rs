use super::*;

fn policy(base_delay_ms: u64, max_attempts: u32) -> ReconnectState {
    ReconnectState::new(ReconnectConfig {
        base_delay_ms,
        max_attempts,
    })
}

#[test]
fn test_backoff_schedule_doubles_up_to_cap() {
    let mut state = policy(1000, 5);

    let expected_ms = [1000, 2000, 4000, 8000, 16000];
    for (i, expected) in expected_ms.iter().enumerate() {
        match state.next_attempt() {
            Backoff::Schedule { attempt, delay } => {
                assert_eq!(attempt, (i + 1) as u32);
                assert_eq!(delay, Duration::from_millis(*expected));
            }
            Backoff::Exhausted => panic!("exhausted at attempt {}", i + 1),
        }
    }

    // No sixth attempt
    assert_eq!(state.next_attempt(), Backoff::Exhausted);
}

#[test]
fn test_exhausted_stays_exhausted_without_reset() {
    let mut state = policy(1000, 2);

    assert!(matches!(state.next_attempt(), Backoff::Schedule { .. }));
    assert!(matches!(state.next_attempt(), Backoff::Schedule { .. }));
    assert_eq!(state.next_attempt(), Backoff::Exhausted);
    // Asking again does not revive the budget
    assert_eq!(state.next_attempt(), Backoff::Exhausted);
}

#[test]
fn test_reset_restarts_from_base_delay() {
    let mut state = policy(1000, 5);

    state.next_attempt();
    state.next_attempt();
    state.next_attempt();
    assert_eq!(state.attempts(), 3);

    state.reset();
    assert_eq!(state.attempts(), 0);

    match state.next_attempt() {
        Backoff::Schedule { attempt, delay } => {
            assert_eq!(attempt, 1);
            assert_eq!(delay, Duration::from_millis(1000));
        }
        Backoff::Exhausted => panic!("fresh counter reported exhaustion"),
    }
}

#[test]
fn test_large_attempt_counts_saturate() {
    let mut state = policy(u64::MAX / 2, 80);

    // Walk deep into the schedule; delays must not overflow
    let mut last = Duration::ZERO;
    for _ in 0..80 {
        match state.next_attempt() {
            Backoff::Schedule { delay, .. } => {
                assert!(delay >= last);
                last = delay;
            }
            Backoff::Exhausted => panic!("budget not yet spent"),
        }
    }
    assert_eq!(state.next_attempt(), Backoff::Exhausted);
}

#[test]
fn test_zero_max_attempts_never_schedules() {
    let mut state = policy(1000, 0);
    assert_eq!(state.next_attempt(), Backoff::Exhausted);
}
