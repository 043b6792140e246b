//! Demo workload served by the front door: sleep, then report a random value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskError};

/// Upper bound on a single wait; the worker is a short-lived invocation.
pub const MAX_WAIT_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTask {
    pub wait_ms: u64,
}

impl WaitTask {
    pub fn new(wait_ms: u64) -> Self {
        Self { wait_ms }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestValue {
    pub val: String,
}

impl Task for WaitTask {
    type Output = TestValue;

    fn call(&self) -> Result<TestValue, TaskError> {
        if self.wait_ms > MAX_WAIT_MS {
            return Err(TaskError::failed(format!(
                "wait of {}ms exceeds {}ms",
                self.wait_ms, MAX_WAIT_MS
            )));
        }
        std::thread::sleep(Duration::from_millis(self.wait_ms));

        let (bits, _) = uuid::Uuid::new_v4().as_u64_pair();
        Ok(TestValue {
            val: format!("{:b}", bits),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_task_sleeps_then_reports_binary_value() {
        let start = Instant::now();
        let value = WaitTask::new(20).call().unwrap();

        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!value.val.is_empty());
        assert!(value.val.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn wait_task_refuses_excessive_wait() {
        let err = WaitTask::new(MAX_WAIT_MS + 1).call().unwrap_err();
        assert!(matches!(err, TaskError::Failed(_)));
    }

    #[test]
    fn wait_task_wire_shape() {
        let bytes = crate::codec::encode(&WaitTask::new(1000)).unwrap();
        assert_eq!(&bytes[..], br#"{"wait_ms":1000}"#);
    }
}
