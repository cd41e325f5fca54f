mod database;
mod global;
mod mail;
mod weekly_report;
mod zentao;

pub use database::*;
pub use global::*;
pub use mail::*;
pub use weekly_report::*;
pub use zentao::*;
