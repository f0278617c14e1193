pub mod appsettings;
pub mod delivery;
pub mod dispatch;
pub mod models;
pub mod scheduling;
pub mod storage;
pub mod window;

#[cfg(test)]
mod test_utils;
