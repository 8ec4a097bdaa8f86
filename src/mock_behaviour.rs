//! This module provides ways to tweak the mocked task API, so that it can return errors on some tests

use crate::error::{Error, Result};

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    /// Failures are reported as this HTTP status, or as network errors if this is `None`
    pub failure_status: Option<u16>,

    pub list_week_behaviour: (u32, u32),
    pub get_task_behaviour: (u32, u32),
    pub create_task_behaviour: (u32, u32),
    pub update_task_behaviour: (u32, u32),
    pub delete_task_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            failure_status: None,
            list_week_behaviour: (0, n_fails),
            get_task_behaviour: (0, n_fails),
            create_task_behaviour: (0, n_fails),
            update_task_behaviour: (0, n_fails),
            delete_task_behaviour: (0, n_fails),
        }
    }

    /// Every request will be rejected `n_fails` times with this HTTP status (e.g. 403 for a CSRF rejection)
    pub fn reject_now(n_fails: u32, status: u16) -> Self {
        Self {
            failure_status: Some(status),
            ..Self::fail_now(n_fails)
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_list_week(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.list_week_behaviour, "list_week", self.failure_status)
    }
    pub fn can_get_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_task_behaviour, "get_task", self.failure_status)
    }
    pub fn can_create_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_task_behaviour, "create_task", self.failure_status)
    }
    pub fn can_update_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_task_behaviour, "update_task", self.failure_status)
    }
    pub fn can_delete_task(&mut self) -> Result<()> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_task_behaviour, "delete_task", self.failure_status)
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str, failure_status: Option<u16>) -> Result<()> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            let message = format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value);
            match failure_status {
                Some(status) => Err(Error::Server { status, message }),
                None => Err(Error::Network(message)),
            }
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mock_behaviour() {
        let mut ok = MockBehaviour::new();
        assert!(ok.can_list_week().is_ok());
        assert!(ok.can_list_week().is_ok());
        assert!(ok.can_list_week().is_ok());
        assert!(ok.can_delete_task().is_ok());

        let mut now = MockBehaviour::fail_now(2);
        assert!(now.can_list_week().is_err());
        assert!(now.can_create_task().is_err());
        assert!(now.can_create_task().is_err());
        assert!(now.can_list_week().is_err());
        assert!(now.can_list_week().is_ok());
        assert!(now.can_list_week().is_ok());
        assert!(now.can_create_task().is_ok());

        let mut custom = MockBehaviour{
            list_week_behaviour: (0,1),
            update_task_behaviour: (1,3),
            ..MockBehaviour::default()
        };
        assert!(custom.can_list_week().is_err());
        assert!(custom.can_list_week().is_ok());
        assert!(custom.can_list_week().is_ok());
        assert!(custom.can_update_task().is_ok());
        assert!(custom.can_update_task().is_err());
        assert!(custom.can_update_task().is_err());
        assert!(custom.can_update_task().is_err());
        assert!(custom.can_update_task().is_ok());

        let mut suspended = MockBehaviour::fail_now(1);
        suspended.suspend();
        assert!(suspended.can_get_task().is_ok());
        suspended.resume();
        assert!(suspended.can_get_task().is_err());
    }

    #[test]
    fn failures_can_be_http_statuses() {
        let mut csrf = MockBehaviour::reject_now(1, 403);
        assert!(matches!(csrf.can_update_task(), Err(Error::Server { status: 403, .. })));
        assert!(matches!(csrf.can_delete_task(), Err(Error::Server { status: 403, .. })));
        assert!(csrf.can_delete_task().is_ok());
        assert!(matches!(MockBehaviour::fail_now(1).can_get_task(), Err(Error::Network(_))));
    }
}
