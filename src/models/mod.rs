pub mod collection;
pub mod feedback;
pub mod garbage_bins;
pub mod geo;
pub mod household;
pub mod scheduling;
pub mod subscription;
pub mod user;

pub use collection::Collection;
pub use feedback::Feedback;
pub use garbage_bins::GarbageBinSelection;
pub use geo::Coordinate;
pub use household::Household;
pub use scheduling::{SchedulingEntry, SchedulingStatus};
pub use subscription::{PaymentMethod, Plan, Subscription};
pub use user::{User, UserDetails};

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
