pub mod arr_meta;
pub mod range;
