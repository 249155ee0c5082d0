use super::*;

mod forms_and_validation;
mod trace_logs;
