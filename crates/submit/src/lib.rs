pub mod config;
pub mod controller;
pub mod form;
pub mod page;
pub mod report;
pub mod storage;
pub mod transport;
pub mod validation;
