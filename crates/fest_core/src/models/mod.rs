pub mod category;
pub mod grade;
pub mod item;
pub mod judge;
pub mod participant;
pub mod result;
pub mod settings;
pub mod tabulation;
pub mod team;

pub use category::Category;
pub use grade::{Grade, GradeTables};
pub use item::{Item, ItemType, PerformanceType, PrizePoints};
pub use judge::{Judge, JudgeAssignment};
pub use participant::Participant;
pub use result::{ItemResult, ResultStatus, Winner};
pub use settings::{Settings, StageCaps};
pub use tabulation::{CodeLetter, TabulationEntry};
pub use team::Team;
