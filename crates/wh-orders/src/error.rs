//! Order-generation and assignment error type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum OrderError {
    /// A task referenced a pallet no longer where it was expected — it was
    /// moved or delivered by the time the agent reached it. The caller
    /// drops the task and returns the agent to `Idle`.
    #[error("task infeasible: pallet {0} is not where the task expected")]
    TaskInfeasible(wh_core::PalletId),
}

pub type OrderResult<T> = Result<T, OrderError>;
