#![forbid(unsafe_code)]

pub mod check;
pub mod cli;
pub mod fetch;
pub mod formats;
pub mod frameset;
pub mod inspect;
pub mod logging;
pub mod parse;
pub mod report;
pub mod smartquotes;
pub mod translation;
pub mod urls;
