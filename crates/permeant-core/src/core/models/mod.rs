pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod element;
pub mod kekule;
pub mod molecule;
pub mod rings;
