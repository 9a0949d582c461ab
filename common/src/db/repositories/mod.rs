// Repository layer: one repository per aggregate, every query scoped by owner

pub mod budget;
pub mod category;
pub mod chat;
pub mod export;
pub mod notification;
pub mod profile;
pub mod transaction;
pub mod user;

pub use budget::BudgetRepository;
pub use category::CategoryRepository;
pub use chat::ChatRepository;
pub use export::ExportRepository;
pub use notification::{NotificationFilter, NotificationRepository};
pub use profile::ProfileRepository;
pub use transaction::{
    CategorySpending, DailyTotals, TransactionFilter, TransactionRepository, TransactionTotals,
};
pub use user::UserRepository;
