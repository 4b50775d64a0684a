pub mod duration;
pub mod qname;
pub mod tokenize;
