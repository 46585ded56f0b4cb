// ABOUTME: Test support utilities.
// ABOUTME: Each test binary only uses some of these modules, so allow dead_code.

#[allow(dead_code)]
pub mod fake_api;
#[allow(dead_code)]
pub mod fake_runtime;
