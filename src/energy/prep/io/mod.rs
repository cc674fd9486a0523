pub mod excel_read;
pub mod json;
pub mod table;
