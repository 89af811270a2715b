/// Employee module
///
/// Person records referenced by projects and team assignments, plus the
/// name resolution used when teams are submitted by display name.

pub mod storage;
pub mod types;

pub use storage::{find_employee_by_name, get_employee_by_id, EmployeeStorage};
pub use types::{CreateEmployeeRequest, Employee, EmployeeOption, EmployeeRef};
