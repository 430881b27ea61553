// Cross-crate test harness for the timelock module.

pub mod test_utils;
