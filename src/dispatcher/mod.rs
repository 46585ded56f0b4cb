// ABOUTME: Fixed-interval desired-vs-observed reconciliation loop.
// ABOUTME: The only activity that calls into the Engine on a schedule rather than from events.

mod dispatcher;

pub use dispatcher::Dispatcher;
