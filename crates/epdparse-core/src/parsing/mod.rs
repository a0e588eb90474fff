//! Text primitives shared by the layout parsers.

pub mod dates;
pub mod header;
pub mod modules;
pub mod normalize;
pub mod references;
pub mod rows;
pub mod section;
pub mod values;
