pub mod deal_field;
pub mod investor;
