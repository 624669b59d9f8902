pub mod clear;
pub mod convert;
pub mod currencies;
pub mod history;
pub mod theme;
pub mod ui;
