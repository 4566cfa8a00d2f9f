pub mod flatlist;
