pub mod rules;
pub mod validate;
