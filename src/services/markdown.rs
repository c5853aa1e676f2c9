//! The markdown itinerary engine: a semi-structured, LLM-generated document
//! treated as an addressable tree of days and labeled sections, with repair,
//! structural mutation and derived-data extraction on top.

pub mod extract;
pub mod ops;
pub mod places;
pub mod sanitize;
pub mod vocab;
