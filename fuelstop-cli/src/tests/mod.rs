//! Shared test harness modules for the fuel stop CLI.

use super::*;

mod helpers;
mod ingest_unit;
mod plan_unit;
