pub mod footer;
pub mod table;
pub mod text_input;
