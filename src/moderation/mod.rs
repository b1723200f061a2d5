//! Moderation core.
//!
//! Everything that decides what happens to an incoming event lives here,
//! separated from the transport so the decision logic is testable:
//!
//! - `classifier` - maps a message to at most one violation category
//! - `engine` - turns a violation plus warning state into an enforcement
//!   decision
//! - `flood` - per-(tenant, user) sliding-window flood tracker
//! - `verification` - pending join-verification map
//! - `guards` - group-only / rate-limit / admin guards for commands
//! - `scheduler` - one-shot delayed tasks (timeouts, notice cleanup)

pub mod classifier;
pub mod engine;
pub mod flood;
pub mod guards;
pub mod scheduler;
pub mod verification;

pub use flood::FloodTracker;
pub use guards::RateLimiter;
pub use scheduler::Scheduler;
pub use verification::VerificationTracker;
