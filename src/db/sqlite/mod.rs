mod assignments;
mod common;
mod feedback;
mod materials;
mod users;

pub use assignments::SqliteAssignmentRepo;
pub use feedback::SqliteFeedbackRepo;
pub use materials::SqliteMaterialRepo;
pub use users::SqliteUserRepo;
