//! Field extractors. Each is a pure function over the assembled corpus,
//! link set, or structured metadata.

pub mod address;
pub mod email;
pub mod hours;
pub mod lead_form;
pub mod phone;
pub mod seal;
pub mod social;
