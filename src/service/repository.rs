//! Primary store abstraction.
//!
//! The engine never talks to a database directly. Employees and punches are
//! read and written through [`PunchRepository`]; a connectivity failure is
//! reported as [`RepositoryError::Unavailable`] and routes the punch to the
//! offline queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Employee, NewPunch, PunchEvent, PunchType};

/// Errors reported by a [`PunchRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Backend-provided description.
        message: String,
    },

    /// The store was reached but the operation failed.
    #[error("Store failure: {message}")]
    Failure {
        /// Backend-provided description.
        message: String,
    },
}

impl RepositoryError {
    /// Creates an [`RepositoryError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        RepositoryError::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a [`RepositoryError::Failure`].
    pub fn failure(message: impl Into<String>) -> Self {
        RepositoryError::Failure {
            message: message.into(),
        }
    }

    /// Returns true if the error means the store could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RepositoryError::Unavailable { .. })
    }
}

/// A type alias for Results that return RepositoryError.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read/write access to employees and persisted punches.
pub trait PunchRepository: Send + Sync {
    /// Looks up an employee by stored card hash (lower-case hex).
    fn find_employee_by_card_hash(&self, card_hash: &str) -> RepositoryResult<Option<Employee>>;

    /// Looks up an employee by id.
    fn find_employee(&self, employee_id: &str) -> RepositoryResult<Option<Employee>>;

    /// Returns the punch of `punch_type` closest in time to `around`, on
    /// either side of it. Ties go to the earlier punch.
    fn nearest_punch_of_type(
        &self,
        employee_id: &str,
        punch_type: PunchType,
        around: NaiveDateTime,
    ) -> RepositoryResult<Option<PunchEvent>>;

    /// Returns the punches in `[start, end)`, oldest first.
    fn punches_between(
        &self,
        employee_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<PunchEvent>>;

    /// Persists a punch and returns it with its assigned id.
    fn insert_punch(&self, punch: NewPunch) -> RepositoryResult<PunchEvent>;
}

/// In-process [`PunchRepository`].
///
/// Can be switched into an unreachable mode, where every call fails with
/// [`RepositoryError::Unavailable`], or a failing mode, where every call fails
/// with [`RepositoryError::Failure`].
///
/// # Example
///
/// ```
/// use punch_engine::models::Employee;
/// use punch_engine::service::{InMemoryPunchRepository, PunchRepository};
///
/// let repo = InMemoryPunchRepository::new();
/// repo.add_employee(Employee {
///     id: "emp_001".to_string(),
///     name: "Hanako".to_string(),
///     card_hash: "ab12".to_string(),
///     is_active: true,
///     hourly_rate: None,
/// });
///
/// assert!(repo.find_employee("emp_001").unwrap().is_some());
///
/// repo.set_unreachable(true);
/// assert!(repo.find_employee("emp_001").unwrap_err().is_unavailable());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPunchRepository {
    employees: RwLock<HashMap<String, Employee>>,
    punches: Mutex<Vec<PunchEvent>>,
    unreachable: AtomicBool,
    failing: AtomicBool,
}

impl InMemoryPunchRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given employees.
    pub fn with_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        let repo = Self::new();
        for employee in employees {
            repo.add_employee(employee);
        }
        repo
    }

    /// Adds or replaces an employee.
    pub fn add_employee(&self, employee: Employee) {
        let mut employees = self
            .employees
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        employees.insert(employee.id.clone(), employee);
    }

    /// Simulates losing (or regaining) connectivity.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Simulates a store that answers but fails every operation.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of every stored punch, oldest first.
    pub fn punches(&self) -> Vec<PunchEvent> {
        let mut punches = self
            .punches
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        punches.sort_by_key(|p| p.timestamp);
        punches
    }

    /// Number of stored punches.
    pub fn punch_count(&self) -> usize {
        self.punches.lock().map(|p| p.len()).unwrap_or_default()
    }

    fn check_reachable(&self) -> RepositoryResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RepositoryError::unavailable("connection refused"));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::failure("store rejected the operation"));
        }
        Ok(())
    }

    fn employees(&self) -> RepositoryResult<std::sync::RwLockReadGuard<'_, HashMap<String, Employee>>> {
        self.employees
            .read()
            .map_err(|_| RepositoryError::failure("employee table lock poisoned"))
    }

    fn punch_table(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Vec<PunchEvent>>> {
        self.punches
            .lock()
            .map_err(|_| RepositoryError::failure("punch table lock poisoned"))
    }
}

impl PunchRepository for InMemoryPunchRepository {
    fn find_employee_by_card_hash(&self, card_hash: &str) -> RepositoryResult<Option<Employee>> {
        self.check_reachable()?;
        let employees = self.employees()?;
        Ok(employees
            .values()
            .find(|e| e.card_hash.eq_ignore_ascii_case(card_hash))
            .cloned())
    }

    fn find_employee(&self, employee_id: &str) -> RepositoryResult<Option<Employee>> {
        self.check_reachable()?;
        Ok(self.employees()?.get(employee_id).cloned())
    }

    fn nearest_punch_of_type(
        &self,
        employee_id: &str,
        punch_type: PunchType,
        around: NaiveDateTime,
    ) -> RepositoryResult<Option<PunchEvent>> {
        self.check_reachable()?;
        let punches = self.punch_table()?;
        Ok(punches
            .iter()
            .filter(|p| p.employee_id == employee_id && p.punch_type == punch_type)
            .min_by_key(|p| ((p.timestamp - around).abs(), p.timestamp))
            .cloned())
    }

    fn punches_between(
        &self,
        employee_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<PunchEvent>> {
        self.check_reachable()?;
        let punches = self.punch_table()?;
        let mut found: Vec<PunchEvent> = punches
            .iter()
            .filter(|p| p.employee_id == employee_id && p.timestamp >= start && p.timestamp < end)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.timestamp);
        Ok(found)
    }

    fn insert_punch(&self, punch: NewPunch) -> RepositoryResult<PunchEvent> {
        self.check_reachable()?;
        let event = punch.into_event(Uuid::new_v4());
        self.punch_table()?.push(event.clone());
        Ok(event)
    }
}
