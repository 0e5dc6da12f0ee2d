//! Shell-independent building blocks: parsing, word expansion, history and
//! the background job table.

pub mod expansion;
pub mod history;
pub mod job;
pub mod parser;
