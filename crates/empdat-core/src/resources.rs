//! Built-in resource definitions for the employee-records schema.

use crate::repository::ResourceDef;
use crate::validator::ValidatorRule;

/// The `employee` table.
pub fn employee() -> ResourceDef {
    ResourceDef::new("employee")
        .with_validator("id", ValidatorRule::named("notnull"))
        .with_validator("last_name", ValidatorRule::named("alpha"))
        .with_validator("first_name", ValidatorRule::named("alpha"))
        .with_label("id", "ID")
        .with_label("social_security_number", "SSN")
        .with_label("role", "Role")
        .with_label("last_name", "Last Name")
        .with_label("first_name", "First Name")
        .with_label("start_date", "Start Date")
        .with_label("date_of_birth", "DOB")
        .with_label("salary", "Salary")
        .with_label("hourly_rate", "Hourly Rate")
        .with_label("commission_rate", "Commission Rate")
        .with_label("bank_routing", "Bank Routing #")
        .with_label("bank_account", "Bank Account #")
        .with_label("classification_id", "Classification")
        .with_label("paymethod_id", "Pay Method")
}

/// The `department` table. Keyed by `department_id`, not `id`.
pub fn department() -> ResourceDef {
    ResourceDef::new("department")
        .with_id_field("department_id")
        .with_label("department_id", "ID")
        .with_label("name", "Name")
        .with_label("head_emp_id", "Department Head")
}

/// The `timesheet` table.
pub fn timesheet() -> ResourceDef {
    ResourceDef::new("timesheet")
        .with_label("id", "ID")
        .with_label("user_id", "Owner ID")
        .with_label("datetime_begin", "Time In")
        .with_label("datetime_end", "Time Out")
        .with_label("paid", "Is Paid?")
}

/// The `receipt` table.
pub fn receipt() -> ResourceDef {
    ResourceDef::new("receipt")
        .with_label("id", "ID")
        .with_label("user_id", "Owner ID")
        .with_label("amount", "Amount")
        .with_label("paid", "Is Paid?")
}
